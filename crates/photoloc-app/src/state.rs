// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application state owned by the UI event loop. Nothing else mutates it, so
// none of it is locked.

use photoloc_core::types::{ImageReference, LocationPayload};
use photoloc_intents::ShareRouter;

/// What the page is showing for the last resolved photo.
#[derive(Debug, Clone, PartialEq)]
pub enum Presentation {
    /// `showLocation` was called with this payload.
    Location(LocationPayload),
    /// Readable photo without GPS; the user was told.
    NoLocation,
    /// Every resolution strategy failed; the user was told.
    Unreadable,
}

#[derive(Debug, Default)]
pub struct AppState {
    /// Share readiness, queuing and duplicate suppression.
    pub router: ShareRouter,
    /// Reference currently being resolved.
    pub resolving: Option<ImageReference>,
    /// Last photo handled and how it was presented.
    pub current: Option<(ImageReference, Presentation)>,
    /// Resolutions started since launch.
    pub resolutions_started: usize,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}
