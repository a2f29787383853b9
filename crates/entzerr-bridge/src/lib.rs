// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// entzerr-bridge: Native platform bridge abstractions.
//
// Defines the photo-source traits the application layer talks to. Desktop
// and CI builds get a stub whose every capability reports
// `PlatformUnavailable`.

pub mod stub;
pub mod traits;

pub use traits::{NativePhotoPicker, PlatformBridge};

/// The bridge implementation for the current target.
pub fn platform_bridge() -> Box<dyn PlatformBridge> {
    Box::new(stub::StubBridge)
}
