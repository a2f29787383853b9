// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module: photo decoding and orientation normalization.

pub mod loader;
pub mod orientation;

pub use loader::{OrientedPhoto, decode_photo};
pub use orientation::normalize;
