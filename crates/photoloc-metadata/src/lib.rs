// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Photoloc: photo metadata.
//
// `exif` turns an image container into `ExifMetadata`. `resolver` decides
// how to get at the container behind an `ImageReference`, trying each
// access strategy in turn.

pub mod exif;
pub mod resolver;

#[cfg(any(test, feature = "test-support"))]
pub mod fixtures;

pub use resolver::{MetadataResolver, ResolveStrategy, StrategyError};
