// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::types::{BackgroundPolicy, CorrectionMode};

/// File name of the persisted configuration inside the config directory.
pub const CONFIG_FILE: &str = "config.json";

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Mode selected when the app starts.
    pub default_mode: CorrectionMode,
    /// Fill for output pixels that map outside the source photo.
    pub background: BackgroundPolicy,
    /// Side length (in rendered pixels) of the square the corner handles
    /// start from and reset to.
    pub editor_default_side: f64,
    /// Tunables for the automatic quadrilateral detector.
    pub detector: DetectorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_mode: CorrectionMode::Auto,
            background: BackgroundPolicy::Transparent,
            editor_default_side: 100.0,
            detector: DetectorConfig::default(),
        }
    }
}

/// Edge/line detection parameters for automatic quadrilateral detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Gaussian blur sigma applied before edge detection.
    pub blur_sigma: f32,
    /// Canny low hysteresis threshold.
    pub canny_low: f32,
    /// Canny high hysteresis threshold.
    pub canny_high: f32,
    /// Hough vote threshold as a fraction of the image diagonal.
    pub vote_fraction: f64,
    /// Lower bound on the initial Hough vote threshold.
    pub min_votes: u32,
    /// When too few edges are found the threshold is lowered step by step,
    /// down to this fraction of the shorter image side.
    pub relaxed_vote_fraction: f64,
    /// Hough non-maximum suppression radius.
    pub suppression_radius: u32,
    /// Smallest accepted quad area as a fraction of the image area.
    pub min_area_fraction: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 2.0,
            canny_low: 50.0,
            canny_high: 150.0,
            vote_fraction: 0.25,
            min_votes: 80,
            relaxed_vote_fraction: 0.1,
            suppression_radius: 8,
            min_area_fraction: 0.10,
        }
    }
}

/// Resolve the configuration directory, creating it if needed.
///
/// Uses `$XDG_CONFIG_HOME/entzerrer`, then `$HOME/.config/entzerrer`, then a
/// directory under the system temp dir.
pub fn config_dir() -> PathBuf {
    let base = if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg)
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config")
    } else {
        std::env::temp_dir()
    };
    let dir = base.join("entzerrer");
    if let Err(err) = std::fs::create_dir_all(&dir) {
        warn!(path = %dir.display(), error = %err, "could not create config directory");
    }
    dir
}

/// Load the configuration from `dir`.
///
/// A missing file yields defaults. A malformed file is logged and also
/// yields defaults, so a bad edit never prevents startup.
pub fn load_config(dir: &Path) -> AppConfig {
    let path = dir.join(CONFIG_FILE);
    let data = match std::fs::read_to_string(&path) {
        Ok(data) => data,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "no config file; using defaults");
            return AppConfig::default();
        }
    };
    match serde_json::from_str(&data) {
        Ok(config) => config,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "malformed config; using defaults");
            AppConfig::default()
        }
    }
}

/// Write the configuration to `dir` as pretty-printed JSON.
pub fn save_config(dir: &Path, config: &AppConfig) -> Result<()> {
    let path = dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    Ok(())
}
