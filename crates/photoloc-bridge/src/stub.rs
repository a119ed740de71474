// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub bridge for desktop/CI builds where native mobile APIs are unavailable.
//
// There are no content providers, gallery or intent handlers on desktop.
// Those calls return `PlatformUnavailable` or report "no handler". Plain
// `file://` references can still be streamed, and the page callbacks go to
// the log.

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use photoloc_core::error::{PhotolocError, Result};
use photoloc_core::types::{GalleryHandle, ImageReference};

use crate::traits::*;

/// API level the stub reports; desktop behaves like a current device.
pub const DESKTOP_SDK_LEVEL: u32 = 34;

/// No-op bridge returned on non-mobile platforms.
pub struct StubBridge;

impl PlatformBridge for StubBridge {
    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }

    fn sdk_level(&self) -> u32 {
        DESKTOP_SDK_LEVEL
    }

    fn cache_dir(&self) -> Result<PathBuf> {
        Ok(std::env::temp_dir())
    }
}

impl NativeContentResolver for StubBridge {
    fn query_data_path(
        &self,
        _uri: &str,
        _selection: Option<&RowSelection>,
    ) -> Result<Option<String>> {
        tracing::warn!("NativeContentResolver::query_data_path called on stub bridge");
        Err(PhotolocError::PlatformUnavailable)
    }

    fn open_input_stream(&self, uri: &str) -> Result<Box<dyn Read + Send>> {
        let reference = ImageReference::parse(uri)?;
        match reference.to_file_path() {
            Some(path) => Ok(Box::new(File::open(path)?)),
            None => {
                tracing::warn!(uri, "stub bridge can only stream file:// references");
                Err(PhotolocError::PlatformUnavailable)
            }
        }
    }
}

impl NativeGallery for StubBridge {
    fn insert_image(&self, _image: &GalleryImage<'_>) -> Result<GalleryHandle> {
        tracing::warn!("NativeGallery::insert_image called on stub bridge");
        Err(PhotolocError::PlatformUnavailable)
    }
}

impl NativePermissions for StubBridge {
    /// Desktop has no runtime permission model.
    fn check_permission(&self, _permission: &str) -> bool {
        true
    }

    fn request_permissions(&self, _permissions: &[&str], _request_code: i32) -> Result<()> {
        Ok(())
    }
}

impl NativeIntents for StubBridge {
    fn resolves_view_intent(&self, _uri: &str) -> Result<bool> {
        Ok(false)
    }

    fn start_view_intent(&self, _uri: &str) -> Result<()> {
        tracing::warn!("NativeIntents::start_view_intent called on stub bridge");
        Err(PhotolocError::PlatformUnavailable)
    }
}

impl NativePackages for StubBridge {
    fn is_package_installed(&self, _package: &str) -> bool {
        false
    }

    fn installed_packages(&self) -> Result<Vec<InstalledPackage>> {
        Ok(Vec::new())
    }
}

impl NativeWebView for StubBridge {
    fn evaluate_javascript(&self, script: &str) -> Result<()> {
        tracing::info!(script, "page script (stub bridge)");
        Ok(())
    }
}

impl NativeToast for StubBridge {
    fn show_toast(&self, message: &str, duration: ToastDuration) -> Result<()> {
        tracing::info!(?duration, message, "toast (stub bridge)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streams_local_files() {
        let dir = std::env::temp_dir().join(format!("photoloc-stub-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bytes.bin");
        std::fs::write(&path, b"abc").unwrap();

        let uri = ImageReference::from_file_path(&path).unwrap();
        let mut out = Vec::new();
        StubBridge
            .open_input_stream(uri.as_str())
            .unwrap()
            .read_to_end(&mut out)
            .unwrap();
        assert_eq!(out, b"abc");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn content_references_are_unavailable() {
        assert!(matches!(
            StubBridge.open_input_stream("content://media/external/images/media/1"),
            Err(PhotolocError::PlatformUnavailable)
        ));
        assert!(!StubBridge.resolves_view_intent("androidamap://viewMap").unwrap());
    }
}
