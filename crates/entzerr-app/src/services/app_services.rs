// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer: loads configuration, picks the platform bridge, and
// hands out correction services built from the current settings.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use entzerr_bridge::{PlatformBridge, platform_bridge};
use entzerr_core::AppConfig;
use entzerr_core::config::{config_dir, load_config, save_config};
use entzerr_core::error::Result;
use tracing::info;

use super::correction::CorrectionService;

/// Shared application services.
///
/// All fields are cheaply cloneable (Arc-wrapped) so that the struct can be
/// passed into closures and async blocks without lifetime issues.
#[derive(Clone)]
pub struct AppServices {
    bridge: Arc<dyn PlatformBridge>,
    config: Arc<Mutex<AppConfig>>,
    config_dir: PathBuf,
}

impl AppServices {
    /// Initialise all services. Call once at app startup.
    pub fn init() -> Self {
        Self::with_config_dir(config_dir())
    }

    /// Initialise with settings read from (and saved to) `dir`.
    pub fn with_config_dir(dir: PathBuf) -> Self {
        info!(path = %dir.display(), "initialising app services");
        let config = load_config(&dir);
        let bridge: Arc<dyn PlatformBridge> = Arc::from(platform_bridge());
        info!(platform = bridge.platform_name(), "app services initialised");

        Self {
            bridge,
            config: Arc::new(Mutex::new(config)),
            config_dir: dir,
        }
    }

    // -- Platform ------------------------------------------------------------

    pub fn bridge(&self) -> &dyn PlatformBridge {
        self.bridge.as_ref()
    }

    // -- Correction ----------------------------------------------------------

    /// A correction service reflecting the current detector and background
    /// settings.
    pub fn correction(&self) -> CorrectionService {
        CorrectionService::from_config(&self.config())
    }

    // -- Config --------------------------------------------------------------

    /// Get a clone of the current config.
    pub fn config(&self) -> AppConfig {
        self.config
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Update and persist the config.
    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        *self.config.lock().unwrap_or_else(PoisonError::into_inner) = config.clone();
        save_config(&self.config_dir, config)?;
        info!("configuration saved");
        Ok(())
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }
}
