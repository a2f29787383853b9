// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub bridge for desktop/CI builds where native mobile APIs are unavailable.

use entzerr_core::error::{EntzerrError, Result};

use crate::traits::*;

/// No-op bridge returned on non-mobile platforms.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubBridge;

impl PlatformBridge for StubBridge {
    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }
}

impl NativePhotoPicker for StubBridge {
    fn pick_photo(&self) -> Result<Option<Vec<u8>>> {
        tracing::warn!("NativePhotoPicker::pick_photo called on stub bridge");
        Err(EntzerrError::PlatformUnavailable)
    }
}
