// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// entzerr-photo: Photo processing for Entzerrer.
//
// Provides photo decoding with orientation normalization, automatic
// quadrilateral detection, the manual corner-editor model, and the
// homography-based perspective corrector.

pub mod detect;
pub mod editor;
pub mod image;
pub mod warp;

// Re-export the primary structs so callers can use `entzerr_photo::PerspectiveCorrector` etc.
pub use detect::{DetectedQuad, HoughQuadDetector, QuadDetector};
pub use editor::CornerEditor;
pub use self::image::loader::{OrientedPhoto, decode_photo};
pub use warp::corrector::PerspectiveCorrector;
pub use warp::homography::Homography;
