// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for native capabilities.
//
// Each trait covers one OS service the app needs. Implementations must not
// panic; failures come back as `PhotolocError` and the caller decides
// whether to fall through to another strategy.

use std::io::Read;
use std::path::PathBuf;

use photoloc_core::error::Result;
use photoloc_core::types::GalleryHandle;

/// Unified bridge that groups all native capabilities.
///
/// `Send + Sync` so one instance can be shared with the blocking pool that
/// runs metadata resolution.
pub trait PlatformBridge:
    NativeContentResolver
    + NativeGallery
    + NativePermissions
    + NativeIntents
    + NativePackages
    + NativeWebView
    + NativeToast
    + Send
    + Sync
{
    /// Human-readable platform name (e.g. "Android").
    fn platform_name(&self) -> &str;

    /// Platform API level, probed once at startup to pick the permission model.
    fn sdk_level(&self) -> u32;

    /// Directory for short-lived scratch files.
    fn cache_dir(&self) -> Result<PathBuf>;
}

/// `column = ?` selection for a provider query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowSelection {
    pub column: String,
    pub value: String,
}

impl RowSelection {
    /// Select a media-store row by `_id`.
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            column: "_id".into(),
            value: id.into(),
        }
    }
}

/// Access to content-provider-backed references.
pub trait NativeContentResolver {
    /// Query the `_data` column (absolute filesystem path) for `uri`.
    /// Returns Ok(None) if the provider has no row or no path.
    fn query_data_path(&self, uri: &str, selection: Option<&RowSelection>)
    -> Result<Option<String>>;

    /// Open a byte stream for `uri`.
    fn open_input_stream(&self, uri: &str) -> Result<Box<dyn Read + Send>>;
}

/// An image about to be inserted into the photo gallery.
#[derive(Debug, Clone, Copy)]
pub struct GalleryImage<'a> {
    pub bytes: &'a [u8],
    pub mime_type: &'a str,
    pub title: &'a str,
    pub description: &'a str,
}

/// The device photo gallery.
pub trait NativeGallery {
    /// Insert an image; the entry is visible to other gallery apps at once.
    fn insert_image(&self, image: &GalleryImage<'_>) -> Result<GalleryHandle>;
}

/// Runtime permissions.
pub trait NativePermissions {
    fn check_permission(&self, permission: &str) -> bool;

    /// Ask the user. The answer arrives later through the host's permission
    /// callback, correlated by `request_code`.
    fn request_permissions(&self, permissions: &[&str], request_code: i32) -> Result<()>;
}

/// `ACTION_VIEW` intent dispatch.
pub trait NativeIntents {
    /// Whether any installed activity handles a view intent for `uri`.
    fn resolves_view_intent(&self, uri: &str) -> Result<bool>;

    /// Start the view intent. Callers check `resolves_view_intent` first.
    fn start_view_intent(&self, uri: &str) -> Result<()>;
}

/// An installed application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    pub package_name: String,
    pub label: String,
}

/// The package manager.
pub trait NativePackages {
    fn is_package_installed(&self, package: &str) -> bool;

    fn installed_packages(&self) -> Result<Vec<InstalledPackage>>;
}

/// The embedded web view hosting the page.
pub trait NativeWebView {
    /// Evaluate a script in the page. The host runs it on its UI thread.
    fn evaluate_javascript(&self, script: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastDuration {
    Short,
    Long,
}

/// Transient user-visible messages.
pub trait NativeToast {
    fn show_toast(&self, message: &str, duration: ToastDuration) -> Result<()>;
}
