// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The severity drives UI presentation; `Silent` outcomes never raise an error
// state.

use crate::error::EntzerrError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// An expected outcome that needs no message (e.g. nothing detected).
    Silent,
    /// User must do something (move a corner, pick another photo).
    ActionRequired,
    /// Cannot be fixed by retrying or user action.
    Permanent,
    /// Something went wrong internally; trying again may help.
    Transient,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

impl HumanError {
    /// Whether the UI should show anything at all.
    pub fn is_visible(&self) -> bool {
        self.severity != Severity::Silent
    }
}

/// Convert an `EntzerrError` into a `HumanError`.
pub fn humanize_error(err: &EntzerrError) -> HumanError {
    match err {
        EntzerrError::DegenerateQuadrilateral(_) => HumanError {
            message: "Those corners don't outline an area.".into(),
            suggestion: "Drag the corners apart so they form a four-sided shape, then try again."
                .into(),
            severity: Severity::ActionRequired,
        },

        EntzerrError::DetectionEmpty => HumanError {
            message: "No rectangle was found.".into(),
            suggestion: "Switch to manual mode to place the corners yourself.".into(),
            severity: Severity::Silent,
        },

        EntzerrError::EmptyImage { .. } => HumanError {
            message: "This photo has no pixels.".into(),
            suggestion: "Pick a different photo.".into(),
            severity: Severity::Permanent,
        },

        EntzerrError::InvalidRenderExtent { .. } => HumanError {
            message: "The photo isn't on screen yet.".into(),
            suggestion: "Wait for the photo to appear, then try again.".into(),
            severity: Severity::Transient,
        },

        EntzerrError::NoPhotoLoaded => HumanError {
            message: "No photo selected.".into(),
            suggestion: "Pick a photo first.".into(),
            severity: Severity::ActionRequired,
        },

        EntzerrError::DecodeFailure(_) => HumanError {
            message: "This photo couldn't be opened.".into(),
            suggestion: "The file may be damaged or in an unusual format. Try a JPEG or PNG."
                .into(),
            severity: Severity::Permanent,
        },

        EntzerrError::OrientationUnknown(code) => HumanError {
            message: "The photo's rotation information is unusual.".into(),
            suggestion: format!(
                "The photo is shown as stored. If it looks rotated, rotate it in another app first. (Tag: {code})"
            ),
            severity: Severity::Silent,
        },

        EntzerrError::ImageError(_) => HumanError {
            message: "There's a problem with this image.".into(),
            suggestion: "Try saving it as a JPEG or PNG first.".into(),
            severity: Severity::Permanent,
        },

        EntzerrError::TaskFailed(_) => HumanError {
            message: "Something went wrong while processing the photo.".into(),
            suggestion: "Try again.".into(),
            severity: Severity::Transient,
        },

        EntzerrError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Try choosing it again.".into(),
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, your storage may be full."
                        .into(),
                    severity: Severity::Transient,
                }
            }
        }

        EntzerrError::Serialization(_) => HumanError {
            message: "The app's settings couldn't be saved.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            severity: Severity::Transient,
        },

        EntzerrError::Bridge(_) => HumanError {
            message: "A device-specific feature didn't work.".into(),
            suggestion: "Try restarting the app.".into(),
            severity: Severity::Transient,
        },

        EntzerrError::PlatformUnavailable => HumanError {
            message: "This feature isn't available on your device.".into(),
            suggestion: "Load the photo from a file instead.".into(),
            severity: Severity::Permanent,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_empty_is_silent() {
        let human = humanize_error(&EntzerrError::DetectionEmpty);
        assert_eq!(human.severity, Severity::Silent);
        assert!(!human.is_visible());
    }

    #[test]
    fn degenerate_quad_is_surfaced() {
        let err = EntzerrError::DegenerateQuadrilateral("three corners are collinear".into());
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.is_visible());
    }

    #[test]
    fn decode_failure_is_permanent() {
        let human = humanize_error(&EntzerrError::DecodeFailure("bad magic".into()));
        assert_eq!(human.severity, Severity::Permanent);
    }

    #[test]
    fn missing_file_asks_for_action() {
        let err = EntzerrError::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(humanize_error(&err).severity, Severity::ActionRequired);
    }
}
