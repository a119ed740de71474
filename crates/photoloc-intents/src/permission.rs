// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Storage permission models. Which permission guards gallery access depends
// on the platform version; the model is probed once at startup.

use photoloc_bridge::NativePermissions;
use photoloc_core::error::Result;
use tracing::{debug, info};

/// Correlates runtime permission requests with the host callback.
pub const PERMISSION_REQUEST_CODE: i32 = 100;

pub const READ_MEDIA_IMAGES: &str = "android.permission.READ_MEDIA_IMAGES";
pub const READ_EXTERNAL_STORAGE: &str = "android.permission.READ_EXTERNAL_STORAGE";
pub const WRITE_EXTERNAL_STORAGE: &str = "android.permission.WRITE_EXTERNAL_STORAGE";

/// Android 13 (Tiramisu).
const SDK_MEDIA_PERMISSIONS: u32 = 33;
/// Android 10 (Q).
const SDK_SCOPED_STORAGE: u32 = 29;

/// One platform version's storage permission model.
pub trait PermissionStrategy: Send + Sync + std::fmt::Debug {
    /// The runtime permission that guards gallery access.
    fn permission(&self) -> &'static str;

    fn describe(&self) -> &'static str;
}

/// API 33 and later.
#[derive(Debug, Clone, Copy)]
pub struct MediaImages;

impl PermissionStrategy for MediaImages {
    fn permission(&self) -> &'static str {
        READ_MEDIA_IMAGES
    }

    fn describe(&self) -> &'static str {
        "granular media permissions (Android 13+)"
    }
}

/// API 29 to 32.
#[derive(Debug, Clone, Copy)]
pub struct ScopedStorage;

impl PermissionStrategy for ScopedStorage {
    fn permission(&self) -> &'static str {
        READ_EXTERNAL_STORAGE
    }

    fn describe(&self) -> &'static str {
        "scoped storage (Android 10-12)"
    }
}

/// Before API 29.
#[derive(Debug, Clone, Copy)]
pub struct LegacyStorage;

impl PermissionStrategy for LegacyStorage {
    fn permission(&self) -> &'static str {
        WRITE_EXTERNAL_STORAGE
    }

    fn describe(&self) -> &'static str {
        "legacy external storage (Android 9 and earlier)"
    }
}

/// Pick the model for `sdk_level`.
pub fn probe_strategy(sdk_level: u32) -> Box<dyn PermissionStrategy> {
    let strategy: Box<dyn PermissionStrategy> = if sdk_level >= SDK_MEDIA_PERMISSIONS {
        Box::new(MediaImages)
    } else if sdk_level >= SDK_SCOPED_STORAGE {
        Box::new(ScopedStorage)
    } else {
        Box::new(LegacyStorage)
    };
    info!(
        sdk_level,
        permission = strategy.permission(),
        model = strategy.describe(),
        "storage permission model selected"
    );
    strategy
}

/// Check the strategy's permission; if missing, ask for it once.
///
/// Returns whether it is granted right now. The answer to the request shows
/// up later through the host's permission callback.
pub fn ensure_permission<P>(strategy: &dyn PermissionStrategy, platform: &P) -> Result<bool>
where
    P: ?Sized + NativePermissions,
{
    let permission = strategy.permission();
    if platform.check_permission(permission) {
        debug!(permission, "permission already granted");
        return Ok(true);
    }
    info!(permission, request_code = PERMISSION_REQUEST_CODE, "requesting permission");
    platform.request_permissions(&[permission], PERMISSION_REQUEST_CODE)?;
    Ok(false)
}

/// Toast text for the host's runtime permission callback.
///
/// Only results for [`PERMISSION_REQUEST_CODE`] are ours.
pub fn permission_result_message(request_code: i32, granted: bool) -> Option<&'static str> {
    if request_code != PERMISSION_REQUEST_CODE {
        return None;
    }
    Some(if granted {
        "Permission granted"
    } else {
        "Storage permission is needed to read photos"
    })
}

#[cfg(test)]
mod tests {
    use photoloc_bridge::fake::FakeBridge;

    use super::*;

    #[test]
    fn sdk_levels_map_to_models() {
        assert_eq!(probe_strategy(34).permission(), READ_MEDIA_IMAGES);
        assert_eq!(probe_strategy(33).permission(), READ_MEDIA_IMAGES);
        assert_eq!(probe_strategy(32).permission(), READ_EXTERNAL_STORAGE);
        assert_eq!(probe_strategy(29).permission(), READ_EXTERNAL_STORAGE);
        assert_eq!(probe_strategy(28).permission(), WRITE_EXTERNAL_STORAGE);
        assert_eq!(probe_strategy(0).permission(), WRITE_EXTERNAL_STORAGE);
    }

    #[test]
    fn granted_permission_is_not_requested() {
        let bridge = FakeBridge::new().grant(READ_MEDIA_IMAGES);
        assert!(ensure_permission(&MediaImages, &bridge).unwrap());
        assert!(bridge.permission_requests().is_empty());
    }

    #[test]
    fn missing_permission_is_requested_once() {
        let bridge = FakeBridge::new();
        assert!(!ensure_permission(&ScopedStorage, &bridge).unwrap());
        assert_eq!(
            bridge.permission_requests(),
            vec![(vec![READ_EXTERNAL_STORAGE.to_string()], 100)]
        );
    }

    #[test]
    fn only_our_request_code_gets_a_message() {
        assert_eq!(permission_result_message(100, true), Some("Permission granted"));
        assert!(permission_result_message(100, false).unwrap().contains("Storage permission"));
        assert_eq!(permission_result_message(7, true), None);
    }
}
