// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Map hand-off: open a position in the external map application.
//
// Fallback chain: provider deep link, then the provider's store listing,
// then the provider's mobile site. Each stage is only dispatched if the
// platform reports a handler for it; a dispatch that fails anyway moves on
// to the next stage. The chain never errors; it ends in a `LaunchOutcome`.

use std::fmt;
use std::sync::Arc;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use photoloc_bridge::{InstalledPackage, NativeIntents, NativePackages};
use photoloc_core::config::{KnownMapPackage, MapProviderConfig};
use photoloc_core::types::{LaunchOutcome, MapTarget};
use tracing::{debug, info, instrument, warn};

/// Characters left alone when encoding a query value (as `Uri.encode`).
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'-')
    .remove(b'!')
    .remove(b'.')
    .remove(b'~')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*');

/// Package-name fragments that identify the provider's apps.
const PROVIDER_NAME_HINTS: &[&str] = &["amap", "autonavi"];
/// Wider net for diagnostics, including the provider's pinyin brand name.
const RELATED_NAME_HINTS: &[&str] = &["amap", "autonavi", "gaode"];
/// Label fragments of map-like apps ("navigation", "map").
const MAP_LABEL_HINTS: &[&str] = &["map", "amap", "导航", "地图"];

fn encode(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    let haystack = haystack.to_lowercase();
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Hands map targets to the installed map application.
pub struct MapLauncher<B: ?Sized> {
    platform: Arc<B>,
    config: MapProviderConfig,
}

impl<B> MapLauncher<B>
where
    B: ?Sized + NativeIntents + NativePackages,
{
    pub fn new(platform: Arc<B>, config: &MapProviderConfig) -> Self {
        Self {
            platform,
            config: config.clone(),
        }
    }

    /// `<scheme>://viewMap?...&dev=0`; `dev=0` means the coordinates are
    /// already in the provider's datum.
    pub fn deep_link(&self, target: &MapTarget) -> String {
        format!(
            "{}://viewMap?sourceApplication={}&poiname={}&lat={}&lon={}&dev=0",
            self.config.scheme,
            encode(&self.config.source_application),
            encode(&target.label),
            target.latitude,
            target.longitude,
        )
    }

    pub fn store_link(&self) -> String {
        format!("market://details?id={}", self.config.store_package_id)
    }

    pub fn web_link(&self) -> &str {
        &self.config.web_url
    }

    /// Run the fallback chain for `target`.
    #[instrument(skip_all, fields(lat = target.latitude, lon = target.longitude))]
    pub fn launch(&self, target: &MapTarget) -> LaunchOutcome {
        let stages = [
            ("deep-link", self.deep_link(target), LaunchOutcome::Opened),
            ("store", self.store_link(), LaunchOutcome::OpenedFallbackStore),
            ("web", self.web_link().to_string(), LaunchOutcome::OpenedFallbackWeb),
        ];

        for (stage, uri, outcome) in stages {
            if self.try_open(stage, &uri) {
                info!(stage, ?outcome, "map launch finished");
                return outcome;
            }
        }

        warn!("no handler for any map link");
        LaunchOutcome::NoHandlerAvailable
    }

    fn try_open(&self, stage: &'static str, uri: &str) -> bool {
        match self.platform.resolves_view_intent(uri) {
            Ok(true) => {}
            Ok(false) => {
                debug!(stage, uri, "no handler");
                return false;
            }
            Err(e) => {
                warn!(stage, uri, error = %e, "handler lookup failed");
                return false;
            }
        }
        match self.platform.start_view_intent(uri) {
            Ok(()) => {
                info!(stage, uri, "view intent started");
                true
            }
            Err(e) => {
                warn!(stage, uri, error = %e, "dispatch failed, trying next stage");
                false
            }
        }
    }

    /// The installed provider app, known packages first in priority order.
    pub fn installed_provider_package(&self) -> Option<String> {
        if let Some(known) = self
            .config
            .known_packages
            .iter()
            .find(|known| self.platform.is_package_installed(&known.package_id))
        {
            return Some(known.package_id.clone());
        }

        match self.platform.installed_packages() {
            Ok(packages) => packages
                .into_iter()
                .find(|p| contains_any(&p.package_name, PROVIDER_NAME_HINTS))
                .map(|p| p.package_name),
            Err(e) => {
                debug!(error = %e, "package listing unavailable");
                None
            }
        }
    }

    /// Report what the device has installed that looks like the provider.
    pub fn diagnose(&self) -> MapDiagnosis {
        let mut diagnosis = MapDiagnosis::default();

        match self.platform.installed_packages() {
            Ok(packages) => {
                diagnosis.related = packages
                    .iter()
                    .filter(|p| contains_any(&p.package_name, RELATED_NAME_HINTS))
                    .cloned()
                    .collect();
                if diagnosis.related.is_empty() {
                    diagnosis.map_like = packages
                        .into_iter()
                        .filter(|p| contains_any(&p.label, MAP_LABEL_HINTS))
                        .collect();
                }
            }
            Err(e) => diagnosis.listing_error = Some(e.to_string()),
        }

        diagnosis.known = self
            .config
            .known_packages
            .iter()
            .map(|package| KnownPackageStatus {
                installed: self.platform.is_package_installed(&package.package_id),
                package: package.clone(),
            })
            .collect();
        diagnosis.detected = self.installed_provider_package();

        debug!(
            related = diagnosis.related.len(),
            detected = ?diagnosis.detected,
            "map provider diagnosis"
        );
        diagnosis
    }
}

/// Installation state of one known provider package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownPackageStatus {
    pub package: KnownMapPackage,
    pub installed: bool,
}

/// Result of [`MapLauncher::diagnose`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapDiagnosis {
    /// Packages whose name looks like the provider's.
    pub related: Vec<InstalledPackage>,
    /// Apps labelled like map apps; only gathered when `related` is empty.
    pub map_like: Vec<InstalledPackage>,
    pub listing_error: Option<String>,
    pub known: Vec<KnownPackageStatus>,
    pub detected: Option<String>,
}

impl fmt::Display for MapDiagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Map app diagnosis ===")?;

        writeln!(f)?;
        writeln!(f, "Apps matching 'amap', 'autonavi' or 'gaode':")?;
        if let Some(error) = &self.listing_error {
            writeln!(f, "  error: {error}")?;
        } else if self.related.is_empty() {
            writeln!(f, "  (none found)")?;
            writeln!(f)?;
            writeln!(f, "Map-like apps:")?;
            if self.map_like.is_empty() {
                writeln!(f, "  (none found)")?;
            }
            for package in &self.map_like {
                writeln!(f, "  - {}", package.package_name)?;
                writeln!(f, "    label: {}", package.label)?;
            }
        } else {
            for package in &self.related {
                writeln!(f, "  - {}", package.package_name)?;
                writeln!(f, "    label: {}", package.label)?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Supported packages:")?;
        for status in &self.known {
            let mark = if status.installed { '✓' } else { '✗' };
            writeln!(
                f,
                "  {mark} {} ({})",
                status.package.label, status.package.package_id
            )?;
        }

        writeln!(f)?;
        match &self.detected {
            Some(package) => writeln!(f, "Result: ✓ installed ({package})"),
            None => writeln!(f, "Result: ✗ not installed"),
        }
    }
}
