// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Orientation normalization: physically re-orient a stored buffer so its
// pixel layout matches its upright appearance.

use entzerr_core::Orientation;
use image::DynamicImage;
use tracing::{debug, instrument};

/// Re-orient `image`, stored with `orientation`, into upright form.
///
/// Rotations are exact quarter turns and flips; no pixel is resampled.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn normalize(image: DynamicImage, orientation: Orientation) -> DynamicImage {
    let upright = match orientation {
        Orientation::Up => return image,
        Orientation::UpMirrored => image.fliph(),
        Orientation::Down => image.rotate180(),
        Orientation::DownMirrored => image.flipv(),
        Orientation::LeftMirrored => image.rotate90().fliph(),
        Orientation::Right => image.rotate90(),
        Orientation::RightMirrored => image.rotate270().fliph(),
        Orientation::Left => image.rotate270(),
    };
    debug!(
        new_w = upright.width(),
        new_h = upright.height(),
        "Buffer re-oriented"
    );
    upright
}
