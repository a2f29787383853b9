// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for native capabilities.

use entzerr_core::error::Result;

/// Unified bridge that groups all native capabilities.
///
/// Platforms that lack a capability return
/// `EntzerrError::PlatformUnavailable` from it.
pub trait PlatformBridge: NativePhotoPicker + Send + Sync {
    /// Human-readable platform name (e.g. "iOS 17", "Android 14").
    fn platform_name(&self) -> &str;
}

/// Pick a single still photo from the device library.
pub trait NativePhotoPicker {
    /// Show the system photo picker and return the encoded bytes of the
    /// chosen photo. Returns Ok(None) if the user cancelled.
    fn pick_photo(&self) -> Result<Option<Vec<u8>>>;
}
