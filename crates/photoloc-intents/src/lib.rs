// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Photoloc Intents. Everything that crosses the app boundary: inbound
// share events, the storage permission model, saving into the gallery and
// handing a position to an external map application.

pub mod gallery;
pub mod map;
pub mod permission;
pub mod share;

pub use gallery::GalleryExporter;
pub use map::{MapDiagnosis, MapLauncher};
pub use permission::{PermissionStrategy, probe_strategy};
pub use share::{RouteDecision, ShareRouter};
