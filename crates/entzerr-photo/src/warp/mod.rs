// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Warp module: homography solve, bilinear resampling, and the perspective
// corrector built from them.

pub mod corrector;
pub mod homography;
pub mod resample;

pub use corrector::PerspectiveCorrector;
pub use homography::Homography;
