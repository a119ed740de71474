// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer: builds the resolver, exporter and launcher over
// one platform bridge and implements the page-facing API (`save_image`,
// `open_in_map`, `diagnose_map`) plus result presentation.
//
// Everything is `Arc`-wrapped so the struct clones cheaply into the event
// loop and the blocking pool. Components are built once from the config
// loaded at startup; a saved config takes effect on the next start.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use photoloc_bridge::{PlatformBridge, ToastDuration};
use photoloc_core::AppConfig;
use photoloc_core::error::{ExportError, PhotolocError, ResolutionError, Result};
use photoloc_core::human_errors::{self, HumanError};
use photoloc_core::types::{
    ExifMetadata, GalleryHandle, ImageReference, LaunchOutcome, LocationPayload, MapTarget,
};
use photoloc_intents::gallery::SAVED_MESSAGE;
use photoloc_intents::permission::permission_result_message;
use photoloc_intents::{GalleryExporter, MapLauncher, probe_strategy};
use photoloc_metadata::MetadataResolver;
use tracing::{debug, error, info, warn};

use super::data_dir;
use crate::state::Presentation;

/// Shared application services.
#[derive(Clone)]
pub struct AppServices {
    bridge: Arc<dyn PlatformBridge>,
    resolver: Arc<MetadataResolver>,
    exporter: Arc<GalleryExporter<dyn PlatformBridge>>,
    launcher: Arc<MapLauncher<dyn PlatformBridge>>,
    data_dir: PathBuf,
    config: Arc<Mutex<AppConfig>>,
}

impl AppServices {
    /// Initialise all services for the current platform. Call once at startup.
    pub fn init() -> Result<Self> {
        let dir = data_dir::data_dir()?;
        info!(path = %dir.display(), "initialising app services");
        let config = load_config(&dir);
        Ok(Self::new(Arc::from(photoloc_bridge::platform_bridge()), dir, config))
    }

    /// Default settings in the system temp dir, for when the data dir is
    /// unusable. Nothing is persisted across runs in practice.
    pub fn fallback() -> Self {
        Self::new(
            Arc::from(photoloc_bridge::platform_bridge()),
            std::env::temp_dir(),
            AppConfig::default(),
        )
    }

    pub fn new(bridge: Arc<dyn PlatformBridge>, data_dir: PathBuf, config: AppConfig) -> Self {
        let cache_dir = bridge.cache_dir().unwrap_or_else(|e| {
            warn!(error = %e, "platform cache dir unavailable, using system temp dir");
            std::env::temp_dir()
        });
        let sdk_level = bridge.sdk_level();
        info!(
            platform = bridge.platform_name(),
            sdk_level,
            cache_dir = %cache_dir.display(),
            "platform bridge ready"
        );

        let resolver = MetadataResolver::from_config(Arc::clone(&bridge), &config.resolver, cache_dir);
        let exporter = GalleryExporter::new(
            Arc::clone(&bridge),
            probe_strategy(sdk_level),
            &config.gallery,
        );
        let launcher = MapLauncher::new(Arc::clone(&bridge), &config.map);

        Self {
            bridge,
            resolver: Arc::new(resolver),
            exporter: Arc::new(exporter),
            launcher: Arc::new(launcher),
            data_dir,
            config: Arc::new(Mutex::new(config)),
        }
    }

    pub fn resolver(&self) -> Arc<MetadataResolver> {
        Arc::clone(&self.resolver)
    }

    // -- Page API ------------------------------------------------------------

    /// Save a page-rendered image into the gallery.
    ///
    /// A missing permission is not toasted: the platform dialog is already
    /// on screen and its result is reported through `permission_result`.
    pub fn save_image(&self, base64_image: &str, file_name: &str) -> std::result::Result<GalleryHandle, ExportError> {
        let result = self.exporter.export(base64_image, file_name);
        match &result {
            Ok(_) => self.toast(SAVED_MESSAGE, ToastDuration::Short),
            Err(ExportError::PermissionDenied) => {
                debug!("save deferred until permission is granted");
            }
            Err(e) => self.show(&human_errors::humanize_export(e)),
        }
        result
    }

    /// Open a position handed over by the page in the external map app.
    pub fn open_in_map(&self, latitude: &str, longitude: &str, name: &str) -> Result<LaunchOutcome> {
        let target = match MapTarget::parse(latitude, longitude, name) {
            Ok(target) => target,
            Err(e) => {
                warn!(latitude, longitude, error = %e, "rejected map target");
                self.show(&human_errors::humanize_error(&e));
                return Err(e);
            }
        };

        debug!(diagnosis = %self.launcher.diagnose(), "map provider state before launch");
        let outcome = self.launcher.launch(&target);
        if let Some(human) = human_errors::humanize_launch(outcome, &target) {
            self.show(&human);
        }
        Ok(outcome)
    }

    /// Plain-text report on installed map apps.
    pub fn diagnose_map(&self) -> String {
        let report = self.launcher.diagnose().to_string();
        debug!(%report, "map diagnosis");
        report
    }

    // -- Host callbacks --------------------------------------------------------

    pub fn permission_result(&self, request_code: i32, granted: bool) {
        match permission_result_message(request_code, granted) {
            Some(message) => self.toast(message, ToastDuration::Short),
            None => debug!(request_code, "permission result for another request"),
        }
    }

    /// Hand a finished resolution to the page, or explain why not.
    pub fn present(
        &self,
        reference: &ImageReference,
        result: &std::result::Result<ExifMetadata, ResolutionError>,
    ) -> Presentation {
        let metadata = match result {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(%reference, error = %e, "nothing to show");
                self.show(&human_errors::humanize_resolution(e));
                return Presentation::Unreadable;
            }
        };

        let Some(payload) = LocationPayload::from_metadata(metadata) else {
            info!(%reference, "photo has no GPS fix");
            self.show(&human_errors::no_location());
            return Presentation::NoLocation;
        };

        info!(
            %reference,
            captured_at = ?metadata.captured_at(),
            device = %payload.device,
            "showing photo location"
        );
        match payload.to_script() {
            Ok(script) => {
                if let Err(e) = self.bridge.evaluate_javascript(&script) {
                    error!(error = %e, "could not deliver location to the page");
                    self.show(&human_errors::humanize_error(&e));
                }
            }
            Err(e) => error!(error = %e, "location payload serialization failed"),
        }
        Presentation::Location(payload)
    }

    fn show(&self, human: &HumanError) {
        debug!(
            message = %human.message,
            retriable = human.retriable,
            severity = ?human.severity,
            "user notified"
        );
        let duration = if human.wants_long_toast() {
            ToastDuration::Long
        } else {
            ToastDuration::Short
        };
        self.toast(&human.toast_text(), duration);
    }

    fn toast(&self, message: &str, duration: ToastDuration) {
        if let Err(e) = self.bridge.show_toast(message, duration) {
            warn!(error = %e, message, "toast failed");
        }
    }

    // -- Config Persistence --------------------------------------------------

    /// Get a clone of the current config.
    pub fn config(&self) -> AppConfig {
        self.config
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Validate, update and persist the config.
    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        config.validate()?;
        *self.config.lock().unwrap_or_else(PoisonError::into_inner) = config.clone();
        persist_config(&self.data_dir, config)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

// -- Config file persistence -------------------------------------------------

/// Persisted settings, or defaults when the file is missing or unusable.
fn load_config(data_dir: &Path) -> AppConfig {
    let path = data_dir::config_path(data_dir);
    let Ok(data) = std::fs::read_to_string(&path) else {
        debug!(path = %path.display(), "no config file, using defaults");
        return AppConfig::default();
    };
    let parsed = serde_json::from_str::<AppConfig>(&data)
        .map_err(PhotolocError::from)
        .and_then(|config| config.validate().map(|()| config));
    match parsed {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "config rejected, using defaults");
            AppConfig::default()
        }
    }
}

fn persist_config(data_dir: &Path, config: &AppConfig) -> Result<()> {
    let path = data_dir::config_path(data_dir);
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use photoloc_bridge::fake::FakeBridge;
    use photoloc_intents::permission::READ_MEDIA_IMAGES;
    use photoloc_metadata::fixtures::plain_png;

    use super::*;

    fn encode_png() -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(plain_png()))
    }

    fn services(bridge: &Arc<FakeBridge>, dir: &Path) -> AppServices {
        let bridge: Arc<dyn PlatformBridge> = bridge.clone();
        AppServices::new(bridge, dir.to_path_buf(), AppConfig::default())
    }

    #[test]
    fn save_without_permission_requests_it_silently() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = Arc::new(FakeBridge::new());
        let svc = services(&bridge, dir.path());

        assert_eq!(
            svc.save_image("data:image/png;base64,XXXX", "photo.png"),
            Err(ExportError::PermissionDenied)
        );
        assert!(bridge.gallery().is_empty());
        assert!(bridge.toasts().is_empty());
        assert_eq!(bridge.permission_requests().len(), 1);
    }

    #[test]
    fn failed_permission_request_is_toasted() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = Arc::new(FakeBridge::new().with_failing_permission_request());
        let svc = services(&bridge, dir.path());

        assert!(matches!(
            svc.save_image(&encode_png(), "map.png"),
            Err(ExportError::PermissionRequestFailed(_))
        ));
        let toasts = bridge.toasts();
        assert_eq!(toasts.len(), 1);
        assert!(toasts[0].0.starts_with("Save failed: storage permission could not be requested."));
        assert_eq!(toasts[0].1, ToastDuration::Long);
    }

    #[test]
    fn successful_save_toasts() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = Arc::new(FakeBridge::new().grant(READ_MEDIA_IMAGES));
        let svc = services(&bridge, dir.path());

        svc.save_image(&encode_png(), "map.png").unwrap();
        assert_eq!(bridge.gallery().len(), 1);
        assert_eq!(
            bridge.toasts(),
            vec![(SAVED_MESSAGE.to_string(), ToastDuration::Short)]
        );
    }

    #[test]
    fn legacy_sdk_uses_write_permission() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = Arc::new(FakeBridge::new().with_sdk_level(28));
        let svc = services(&bridge, dir.path());

        let _ = svc.save_image(&encode_png(), "map.png");
        assert_eq!(
            bridge.permission_requests()[0].0,
            vec!["android.permission.WRITE_EXTERNAL_STORAGE".to_string()]
        );
    }

    #[test]
    fn invalid_coordinates_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = Arc::new(FakeBridge::new().with_handler("androidamap://"));
        let svc = services(&bridge, dir.path());

        assert!(svc.open_in_map("north", "116.4", "x").is_err());
        assert!(bridge.started_intents().is_empty());
        assert_eq!(bridge.toasts().len(), 1);
    }

    #[test]
    fn missing_map_app_shows_coordinates() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = Arc::new(FakeBridge::new());
        let svc = services(&bridge, dir.path());

        assert_eq!(
            svc.open_in_map("39.9", "116.4", "Beijing").unwrap(),
            LaunchOutcome::NoHandlerAvailable
        );
        let toasts = bridge.toasts();
        assert_eq!(toasts.len(), 1);
        assert!(toasts[0].0.contains("39.9, 116.4"));
        assert_eq!(toasts[0].1, ToastDuration::Long);
    }

    #[test]
    fn opened_map_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = Arc::new(FakeBridge::new().with_handler("androidamap://"));
        let svc = services(&bridge, dir.path());

        assert_eq!(
            svc.open_in_map("39.9", "116.4", "Beijing").unwrap(),
            LaunchOutcome::Opened
        );
        assert!(bridge.toasts().is_empty());
    }

    #[test]
    fn permission_results_for_our_code_are_toasted() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = Arc::new(FakeBridge::new());
        let svc = services(&bridge, dir.path());

        svc.permission_result(100, true);
        svc.permission_result(42, false);
        assert_eq!(
            bridge.toasts(),
            vec![("Permission granted".to_string(), ToastDuration::Short)]
        );
    }

    #[test]
    fn config_round_trips_through_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = Arc::new(FakeBridge::new());
        let svc = services(&bridge, dir.path());

        let mut config = svc.config();
        config.gallery.description = "Trips".into();
        svc.save_config(&config).unwrap();

        assert_eq!(load_config(dir.path()).gallery.description, "Trips");
    }

    #[test]
    fn invalid_config_is_not_saved_and_bad_files_load_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = Arc::new(FakeBridge::new());
        let svc = services(&bridge, dir.path());

        let mut config = svc.config();
        config.map.web_url = "ftp://example.com/".into();
        assert!(svc.save_config(&config).is_err());

        std::fs::write(data_dir::config_path(dir.path()), "{ not json").unwrap();
        assert_eq!(load_config(dir.path()), AppConfig::default());
    }

    #[test]
    fn diagnosis_text_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = Arc::new(FakeBridge::new().with_package("com.autonavi.minimap", "AMap"));
        let svc = services(&bridge, dir.path());

        let report = svc.diagnose_map();
        assert!(report.starts_with("=== Map app diagnosis ==="));
        assert!(report.contains("installed (com.autonavi.minimap)"));
    }
}
