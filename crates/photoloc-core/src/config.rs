// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{PhotolocError, Result};

/// Persistent application settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub map: MapProviderConfig,
    pub resolver: ResolverConfig,
    pub gallery: GalleryConfig,
}

impl AppConfig {
    /// Reject settings that would produce unusable links.
    pub fn validate(&self) -> Result<()> {
        if self.map.scheme.trim().is_empty() {
            return Err(PhotolocError::Config("map scheme is empty".into()));
        }
        if self.map.store_package_id.trim().is_empty() {
            return Err(PhotolocError::Config("store package id is empty".into()));
        }
        let web = Url::parse(&self.map.web_url)
            .map_err(|e| PhotolocError::Config(format!("web url {:?}: {e}", self.map.web_url)))?;
        if web.scheme() != "https" {
            return Err(PhotolocError::Config(format!(
                "web url must be https, got {}",
                web.scheme()
            )));
        }
        if self.resolver.max_stream_bytes == 0 {
            return Err(PhotolocError::Config("max_stream_bytes must be positive".into()));
        }
        Ok(())
    }
}

/// A map application package the launcher knows about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownMapPackage {
    pub package_id: String,
    pub label: String,
}

/// External map provider the launcher hands coordinates to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapProviderConfig {
    /// Deep-link URI scheme registered by the map app.
    pub scheme: String,
    /// `sourceApplication` value sent with every deep link.
    pub source_application: String,
    /// Package opened in the store when the map app is missing.
    pub store_package_id: String,
    /// Provider's mobile site, the last fallback.
    pub web_url: String,
    /// Detection order for installed map apps.
    pub known_packages: Vec<KnownMapPackage>,
}

impl Default for MapProviderConfig {
    fn default() -> Self {
        Self {
            scheme: "androidamap".into(),
            source_application: "Photo Location Viewer".into(),
            store_package_id: "com.autonavi.minimap".into(),
            web_url: "https://mobile.amap.com/".into(),
            known_packages: vec![
                KnownMapPackage {
                    package_id: "com.autonavi.minimap".into(),
                    label: "AMap (China)".into(),
                },
                KnownMapPackage {
                    package_id: "com.amap.android.ams".into(),
                    label: "AMap (international)".into(),
                },
                KnownMapPackage {
                    package_id: "com.autonavi.amapauto".into(),
                    label: "AMap (in-car)".into(),
                },
            ],
        }
    }
}

/// Metadata resolver tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Where temporary copies go; `None` uses the platform cache dir.
    pub temp_dir: Option<PathBuf>,
    /// Upper bound for in-memory stream parsing.
    pub max_stream_bytes: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            temp_dir: None,
            max_stream_bytes: 64 * 1024 * 1024,
        }
    }
}

/// Gallery export settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Description attached to every saved image.
    pub description: String,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            description: "Photo Location Viewer".into(),
        }
    }
}
