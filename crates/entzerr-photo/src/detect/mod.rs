// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quadrilateral detection: the detector interface, its normalized y-up
// result type, and conversion back to raster pixel space.

pub mod hough;

use entzerr_core::{Point, Quad};
use image::DynamicImage;

pub use hough::HoughQuadDetector;

/// Finds the most likely document-like quadrilateral in an upright image.
///
/// Implementations return at most one candidate. `None` is an expected
/// outcome (nothing rectangular in view) and not an error.
pub trait QuadDetector: Send + Sync {
    fn detect(&self, image: &DynamicImage) -> Option<DetectedQuad>;
}

impl<F> QuadDetector for F
where
    F: Fn(&DynamicImage) -> Option<DetectedQuad> + Send + Sync,
{
    fn detect(&self, image: &DynamicImage) -> Option<DetectedQuad> {
        self(image)
    }
}

/// A detected quadrilateral in normalized coordinates.
///
/// Both axes run 0..1 with the origin at the *bottom-left* and y increasing
/// upward, the convention used by vision detectors. Use
/// [`to_raster`](Self::to_raster) before handing the corners to the
/// corrector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectedQuad {
    pub corners: Quad,
    /// Detector confidence in 0..1.
    pub confidence: f64,
}

impl DetectedQuad {
    pub fn new(corners: Quad, confidence: f64) -> Self {
        Self {
            corners,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Build from a raster-space quad (pixels, y down).
    pub fn from_raster(quad: &Quad, width: u32, height: u32, confidence: f64) -> Self {
        let (w, h) = (width.max(1) as f64, height.max(1) as f64);
        let corners = quad.map(|p| Point::new(p.x / w, 1.0 - p.y / h));
        Self::new(corners, confidence)
    }

    /// Convert to raster pixel space of a `width` x `height` image:
    /// flip y (`1 - y`) then scale by the image extent.
    pub fn to_raster(&self, width: u32, height: u32) -> Quad {
        let (w, h) = (width as f64, height as f64);
        self.corners.map(|p| Point::new(p.x * w, (1.0 - p.y) * h))
    }
}
