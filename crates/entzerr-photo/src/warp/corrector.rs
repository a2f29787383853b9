// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective corrector: warp a quadrilateral region of a photo onto the
// photo's full rectangular extent.

use entzerr_core::error::{EntzerrError, Result};
use entzerr_core::{BackgroundPolicy, Point, Quad};
use image::DynamicImage;
use tracing::{debug, info, instrument};

use super::homography::Homography;
use super::resample::warp_inverse;
use crate::image::loader::OrientedPhoto;

/// Unwarps a quadrilateral so that it fills an axis-aligned rectangle.
///
/// The output always has the same width and height as the input and is
/// RGBA8. The corrector holds no state besides its background policy and
/// every call is a pure function of its inputs, so one instance can be
/// shared freely across threads.
///
/// ```ignore
/// let corrector = PerspectiveCorrector::new(BackgroundPolicy::Transparent);
/// let flat = corrector.correct(&photo, &quad)?;
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerspectiveCorrector {
    background: BackgroundPolicy,
}

impl PerspectiveCorrector {
    pub fn new(background: BackgroundPolicy) -> Self {
        Self { background }
    }

    pub fn background(&self) -> BackgroundPolicy {
        self.background
    }

    /// The homography taking `quad` onto the corners of a `width` x `height`
    /// rectangle: top-left to (0, 0), top-right to (W, 0), bottom-left to
    /// (0, H), bottom-right to (W, H).
    pub fn homography_for(quad: &Quad, width: u32, height: u32) -> Result<Homography> {
        let (w, h) = (width as f64, height as f64);
        let target = Quad::full_extent(w, h);
        Homography::from_correspondences(&quad.to_array(), &target.to_array(), w.max(h))
    }

    /// Correct an already upright image. `quad` is in the image's pixel
    /// space, y down.
    ///
    /// Fails with `EmptyImage` for a zero-sized image and with
    /// `DegenerateQuadrilateral` when the corners admit no homography; no
    /// raster is produced in either case.
    #[instrument(skip(self, image), fields(width = image.width(), height = image.height(), background = ?self.background))]
    pub fn correct(&self, image: &DynamicImage, quad: &Quad) -> Result<DynamicImage> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(EntzerrError::EmptyImage { width, height });
        }

        let forward = Self::homography_for(quad, width, height)?;
        let inverse = forward.inverse().ok_or_else(|| {
            EntzerrError::DegenerateQuadrilateral("homography is not invertible".into())
        })?;
        debug!(forward = ?forward.matrix(), "Homography solved");

        let rgba = image.to_rgba8();
        let output = warp_inverse(&rgba, &inverse, width, height, self.background);

        info!(width, height, "Perspective correction applied");
        Ok(DynamicImage::ImageRgba8(output))
    }

    /// Same as [`correct`](Self::correct) with the corners passed one by one.
    pub fn correct_corners(
        &self,
        image: &DynamicImage,
        top_left: Point,
        top_right: Point,
        bottom_left: Point,
        bottom_right: Point,
    ) -> Result<DynamicImage> {
        self.correct(
            image,
            &Quad::new(top_left, top_right, bottom_left, bottom_right),
        )
    }

    /// Normalize the photo's orientation, then correct it.
    pub fn correct_photo(&self, photo: OrientedPhoto, quad: &Quad) -> Result<DynamicImage> {
        let upright = photo.into_upright();
        self.correct(&upright, quad)
    }
}
