// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Session state: what a UI shell renders.

use std::sync::Arc;

use entzerr_core::human_errors::HumanError;
use entzerr_core::{AppConfig, CorrectionMode};
use entzerr_photo::CornerEditor;
use image::DynamicImage;

/// Progress stages for the UI busy indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorrectionStage {
    /// Nothing in flight; actions are enabled.
    #[default]
    Idle,
    /// Decoding a picked photo.
    Decoding,
    /// Detecting corners, then correcting.
    Detecting,
    /// Correcting with the editor's corners.
    Correcting,
}

/// State owned by the UI task and mutated only by the controller.
#[derive(Debug)]
pub struct AppState {
    /// The upright image on screen. Replaced wholesale, never edited.
    pub displayed: Option<Arc<DynamicImage>>,
    /// Where the corners for the next correction come from.
    pub mode: CorrectionMode,
    /// Manual corner handles.
    pub editor: CornerEditor,
    /// Last user-facing problem, if any.
    pub status: Option<HumanError>,
    pub stage: CorrectionStage,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            displayed: None,
            mode: config.default_mode,
            editor: CornerEditor::with_default_side(config.editor_default_side),
            status: None,
            stage: CorrectionStage::Idle,
        }
    }

    /// Whether a request is in flight.
    pub fn is_busy(&self) -> bool {
        self.stage != CorrectionStage::Idle
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&AppConfig::default())
    }
}
