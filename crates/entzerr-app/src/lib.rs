// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// entzerr-app: Headless application layer for Entzerrer.
//
// Owns the session state a UI shell binds to and runs decoding, detection,
// and correction off the interactive task.

pub mod controller;
pub mod services;
pub mod state;

pub use controller::{Controller, SessionEvent};
pub use services::app_services::AppServices;
pub use services::correction::CorrectionService;
pub use state::{AppState, CorrectionStage};

/// Install the global `tracing` subscriber.
///
/// Honours `RUST_LOG`; defaults to `info`. Calling it more than once is
/// harmless.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}
