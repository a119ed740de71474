// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Photoloc.

use thiserror::Error;

/// Top-level error type for Photoloc operations.
#[derive(Debug, Error)]
pub enum PhotolocError {
    // -- References and input --
    #[error("invalid image reference: {0}")]
    InvalidReference(String),

    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(String),

    // -- Metadata / image --
    #[error("EXIF read failed: {0}")]
    Exif(String),

    #[error("image decoding failed: {0}")]
    Image(String),

    // -- Configuration / persistence --
    #[error("invalid configuration: {0}")]
    Config(String),

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
pub type Result<T> = std::result::Result<T, PhotolocError>;

/// One failed resolution strategy, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyAttempt {
    pub strategy: &'static str,
    pub reason: String,
}

/// Metadata resolution failed on every strategy.
#[derive(Debug, Clone, Error)]
pub enum ResolutionError {
    #[error("image is unreadable after {} strategies", attempts.len())]
    Unreadable { attempts: Vec<StrategyAttempt> },
}

/// Saving an image into the device gallery failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("storage permission not granted")]
    PermissionDenied,

    /// The permission dialog could not be shown at all.
    #[error("permission request failed: {0}")]
    PermissionRequestFailed(String),

    #[error("image payload could not be decoded: {0}")]
    DecodeFailed(String),

    #[error("gallery insert failed: {0}")]
    InsertFailed(String),
}
