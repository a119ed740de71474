// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Short user-facing messages for every failure and outcome.
//
// Nothing here is fatal: each error is turned into a message the host shows
// as a toast. The severity drives the toast duration.

use crate::error::{ExportError, PhotolocError, ResolutionError};
use crate::types::{LaunchOutcome, MapTarget};

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Worked, but not the way the user asked (e.g. store fallback).
    Info,
    /// User must do something (grant permission, install an app).
    ActionRequired,
    /// Nothing the user can do with this photo or payload.
    Permanent,
}

/// A human-readable message with an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain summary (first line of the toast).
    pub message: String,
    /// What the user should try (second line).
    pub suggestion: String,
    /// Whether trying the same thing again can help.
    pub retriable: bool,
    pub severity: Severity,
}

impl HumanError {
    /// Message and suggestion joined for a toast.
    pub fn toast_text(&self) -> String {
        if self.suggestion.is_empty() {
            self.message.clone()
        } else {
            format!("{}\n{}", self.message, self.suggestion)
        }
    }

    /// Long toasts for anything the user has to act on.
    pub fn wants_long_toast(&self) -> bool {
        self.severity != Severity::Info
    }
}

pub fn humanize_resolution(err: &ResolutionError) -> HumanError {
    match err {
        ResolutionError::Unreadable { .. } => HumanError {
            message: "Couldn't read this photo's information.".into(),
            suggestion: "Make sure the photo isn't encrypted or damaged.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}

/// Shown when the photo was readable but carries no GPS fix.
pub fn no_location() -> HumanError {
    HumanError {
        message: "This photo has no location data.".into(),
        suggestion: "Use a photo taken with location (GPS) turned on.".into(),
        retriable: false,
        severity: Severity::ActionRequired,
    }
}

pub fn humanize_export(err: &ExportError) -> HumanError {
    match err {
        ExportError::PermissionDenied => HumanError {
            message: "Storage permission is needed to save images.".into(),
            suggestion: "Allow access when asked, then save again.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },
        ExportError::PermissionRequestFailed(detail) => HumanError {
            message: "Save failed: storage permission could not be requested.".into(),
            suggestion: format!("Grant storage access in the system settings, then save again. ({detail})"),
            retriable: true,
            severity: Severity::ActionRequired,
        },
        ExportError::DecodeFailed(detail) => HumanError {
            message: "Save failed: the image data is not valid.".into(),
            suggestion: format!("({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },
        ExportError::InsertFailed(detail) => HumanError {
            message: "Save failed: the gallery refused the image.".into(),
            suggestion: format!("Check free storage and try again. ({detail})"),
            retriable: true,
            severity: Severity::ActionRequired,
        },
    }
}

/// Message for a launch outcome; `None` when the map simply opened.
pub fn humanize_launch(outcome: LaunchOutcome, target: &MapTarget) -> Option<HumanError> {
    let coordinates = format!("{}, {}", target.latitude, target.longitude);
    match outcome {
        LaunchOutcome::Opened => None,
        LaunchOutcome::OpenedFallbackStore => Some(HumanError {
            message: "The map app is not installed.".into(),
            suggestion: format!("Install it from the store, or open {coordinates} in another map app."),
            retriable: true,
            severity: Severity::Info,
        }),
        LaunchOutcome::OpenedFallbackWeb => Some(HumanError {
            message: "The map app is not installed. Opened the map website instead.".into(),
            suggestion: format!("Coordinates: {coordinates}"),
            retriable: true,
            severity: Severity::Info,
        }),
        LaunchOutcome::NoHandlerAvailable => Some(HumanError {
            message: "The map app is not installed.".into(),
            suggestion: format!("Search the app store for it, or use another map app with {coordinates}."),
            retriable: false,
            severity: Severity::ActionRequired,
        }),
    }
}

pub fn humanize_error(err: &PhotolocError) -> HumanError {
    match err {
        PhotolocError::InvalidReference(_) => HumanError {
            message: "That photo link isn't usable.".into(),
            suggestion: "Try sharing the photo again from the gallery.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },
        PhotolocError::InvalidCoordinates(detail) => HumanError {
            message: "The location coordinates aren't valid.".into(),
            suggestion: format!("({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },
        PhotolocError::Exif(_) | PhotolocError::Image(_) => HumanError {
            message: "There's a problem with this image.".into(),
            suggestion: "The file may be damaged or in an unusual format.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },
        PhotolocError::Config(detail) => HumanError {
            message: "The app settings are invalid.".into(),
            suggestion: format!("Defaults will be used. ({detail})"),
            retriable: false,
            severity: Severity::Info,
        },
        PhotolocError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "The app doesn't have permission to read that file.".into(),
                    suggestion: "Grant storage access in the system settings.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. Your device's storage may be full.".into(),
                    retriable: true,
                    severity: Severity::ActionRequired,
                }
            }
        }
        PhotolocError::Serialization(_) => HumanError {
            message: "The app had an internal data problem.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Permanent,
        },
        PhotolocError::Bridge(_) => HumanError {
            message: "A device feature didn't work.".into(),
            suggestion: "Try restarting the app.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },
        PhotolocError::PlatformUnavailable => HumanError {
            message: "This feature isn't available on your device.".into(),
            suggestion: String::new(),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> MapTarget {
        MapTarget::new(39.9, 116.4, "Beijing").unwrap()
    }

    #[test]
    fn opened_has_no_message() {
        assert!(humanize_launch(LaunchOutcome::Opened, &target()).is_none());
    }

    #[test]
    fn no_handler_mentions_coordinates() {
        let human = humanize_launch(LaunchOutcome::NoHandlerAvailable, &target()).unwrap();
        assert!(human.suggestion.contains("39.9, 116.4"));
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.wants_long_toast());
    }

    #[test]
    fn permission_denied_is_retriable() {
        let human = humanize_export(&ExportError::PermissionDenied);
        assert!(human.retriable);
        assert_eq!(human.severity, Severity::ActionRequired);
    }

    #[test]
    fn unreadable_is_permanent() {
        let err = ResolutionError::Unreadable { attempts: vec![] };
        let human = humanize_resolution(&err);
        assert_eq!(human.severity, Severity::Permanent);
        assert_eq!(
            human.toast_text(),
            "Couldn't read this photo's information.\nMake sure the photo isn't encrypted or damaged."
        );
    }

    #[test]
    fn missing_file_is_action_required() {
        let err = PhotolocError::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(humanize_error(&err).severity, Severity::ActionRequired);
    }
}
