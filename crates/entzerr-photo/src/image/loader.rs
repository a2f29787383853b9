// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Photo loader: decode encoded photo bytes and carry the orientation tag
// until the buffer is normalized.

use std::io::Cursor;

use entzerr_core::Orientation;
use entzerr_core::error::{EntzerrError, Result};
use image::{DynamicImage, ImageDecoder, ImageReader};
use tracing::{debug, info, instrument, warn};

use super::orientation::normalize;

/// A decoded raster together with the orientation its buffer is stored in.
///
/// Corner coordinates always refer to the upright picture, so a photo must
/// be normalized before corners are applied. Normalizing is idempotent.
#[derive(Debug, Clone)]
pub struct OrientedPhoto {
    image: DynamicImage,
    orientation: Orientation,
}

impl OrientedPhoto {
    // -- Construction ---------------------------------------------------------

    pub fn new(image: DynamicImage, orientation: Orientation) -> Self {
        Self { image, orientation }
    }

    /// Wrap a buffer that is already upright.
    pub fn upright(image: DynamicImage) -> Self {
        Self::new(image, Orientation::Up)
    }

    /// Wrap a buffer with a raw EXIF orientation code. Unknown codes are
    /// logged and treated as upright.
    pub fn with_exif_code(image: DynamicImage, code: u16) -> Self {
        Self::new(image, Orientation::from_exif_lossy(code))
    }

    // -- Accessors ------------------------------------------------------------

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn is_normalized(&self) -> bool {
        self.orientation == Orientation::Up
    }

    /// Borrow the stored buffer (not necessarily upright).
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// Dimensions of the picture once upright.
    pub fn upright_dimensions(&self) -> (u32, u32) {
        if self.orientation.swaps_axes() {
            (self.image.height(), self.image.width())
        } else {
            (self.image.width(), self.image.height())
        }
    }

    // -- Normalization --------------------------------------------------------

    /// Re-orient the buffer so the tag becomes `Up`.
    pub fn normalize(self) -> Self {
        if self.is_normalized() {
            return self;
        }
        let image = normalize(self.image, self.orientation);
        Self::upright(image)
    }

    /// Normalize and return the upright buffer.
    pub fn into_upright(self) -> DynamicImage {
        self.normalize().image
    }
}

/// Decode encoded photo bytes (JPEG, PNG, TIFF, ...) and read the orientation
/// tag from the container metadata.
///
/// The result is not normalized; call [`OrientedPhoto::normalize`] once
/// before using corner coordinates against it.
#[instrument(skip(data), fields(data_len = data.len()))]
pub fn decode_photo(data: &[u8]) -> Result<OrientedPhoto> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|err| EntzerrError::DecodeFailure(format!("cannot sniff format: {err}")))?;
    debug!(format = ?reader.format(), "Photo format guessed");

    let mut decoder = reader
        .into_decoder()
        .map_err(|err| EntzerrError::DecodeFailure(err.to_string()))?;

    let orientation = match decoder.orientation() {
        Ok(tag) => Orientation::from_exif_lossy(u16::from(tag.to_exif())),
        Err(err) => {
            warn!(error = %err, "Could not read orientation metadata; assuming upright");
            Orientation::Up
        }
    };

    let image = DynamicImage::from_decoder(decoder)
        .map_err(|err| EntzerrError::DecodeFailure(err.to_string()))?;

    info!(
        width = image.width(),
        height = image.height(),
        ?orientation,
        "Photo decoded"
    );
    Ok(OrientedPhoto::new(image, orientation))
}
