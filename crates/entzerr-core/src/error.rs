// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Entzerrer.

use thiserror::Error;

/// Top-level error type for all Entzerrer operations.
#[derive(Debug, Error)]
pub enum EntzerrError {
    // -- Correction errors --
    #[error("degenerate quadrilateral: {0}")]
    DegenerateQuadrilateral(String),

    #[error("no quadrilateral detected")]
    DetectionEmpty,

    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("rendered extent {width}x{height} cannot be used for corner scaling")]
    InvalidRenderExtent { width: f64, height: f64 },

    #[error("no photo loaded")]
    NoPhotoLoaded,

    // -- Photo errors --
    #[error("failed to decode photo: {0}")]
    DecodeFailure(String),

    #[error("unknown orientation tag: {0}")]
    OrientationUnknown(u16),

    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Runtime --
    #[error("background task failed: {0}")]
    TaskFailed(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Platform bridge --
    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, EntzerrError>;
