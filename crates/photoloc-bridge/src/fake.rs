// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory bridge for tests. Configure with the `with_*` builders, then
// inspect what the code under test asked the platform to do.

use std::collections::{HashMap, HashSet};
use std::io::{self, Cursor, Read};
use std::path::PathBuf;
use std::sync::Mutex;

use photoloc_core::error::{PhotolocError, Result};
use photoloc_core::types::GalleryHandle;

use crate::traits::*;

#[derive(Debug, Clone)]
enum FakeStream {
    Bytes(Vec<u8>),
    /// Yields `bytes` up to `fail_after`, then fails.
    Broken { bytes: Vec<u8>, fail_after: usize },
    /// Never reaches end of stream.
    Endless,
}

struct EndlessReader;

impl Read for EndlessReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        buf.fill(0xFF);
        Ok(buf.len())
    }
}

struct FailingReader {
    inner: Cursor<Vec<u8>>,
    remaining: usize,
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "stream revoked"));
        }
        let len = buf.len().min(self.remaining);
        let n = self.inner.read(&mut buf[..len])?;
        if n == 0 {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "stream revoked"));
        }
        self.remaining -= n;
        Ok(n)
    }
}

/// A gallery entry recorded by the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub title: String,
    pub description: String,
}

#[derive(Default)]
struct FakeState {
    data_paths: HashMap<(String, Option<RowSelection>), String>,
    failing_queries: HashSet<String>,
    streams: HashMap<String, FakeStream>,
    stream_opens: Vec<String>,
    granted: HashSet<String>,
    permission_requests: Vec<(Vec<String>, i32)>,
    permission_request_fails: bool,
    gallery: Vec<SavedImage>,
    gallery_fails: bool,
    handlers: Vec<String>,
    failing_dispatch: Vec<String>,
    started: Vec<String>,
    packages: Vec<InstalledPackage>,
    scripts: Vec<String>,
    toasts: Vec<(String, ToastDuration)>,
}

/// Scriptable bridge; every trait method reads or records `FakeState`.
pub struct FakeBridge {
    sdk_level: u32,
    cache_dir: PathBuf,
    state: Mutex<FakeState>,
}

impl Default for FakeBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBridge {
    pub fn new() -> Self {
        Self {
            sdk_level: 34,
            cache_dir: std::env::temp_dir(),
            state: Mutex::new(FakeState::default()),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake bridge lock poisoned")
    }

    // -- Builders --------------------------------------------------------------

    pub fn with_sdk_level(mut self, level: u32) -> Self {
        self.sdk_level = level;
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// `query_data_path(uri, selection)` returns `path`.
    pub fn with_data_path(
        self,
        uri: &str,
        selection: Option<RowSelection>,
        path: impl Into<String>,
    ) -> Self {
        self.state()
            .data_paths
            .insert((uri.to_string(), selection), path.into());
        self
    }

    /// `query_data_path(uri, _)` raises.
    pub fn with_failing_query(self, uri: &str) -> Self {
        self.state().failing_queries.insert(uri.to_string());
        self
    }

    pub fn with_stream(self, uri: &str, bytes: Vec<u8>) -> Self {
        self.state()
            .streams
            .insert(uri.to_string(), FakeStream::Bytes(bytes));
        self
    }

    /// Stream that errors after `fail_after` bytes.
    pub fn with_broken_stream(self, uri: &str, bytes: Vec<u8>, fail_after: usize) -> Self {
        self.state()
            .streams
            .insert(uri.to_string(), FakeStream::Broken { bytes, fail_after });
        self
    }

    /// Stream that never ends, for checking read limits.
    pub fn with_endless_stream(self, uri: &str) -> Self {
        self.state()
            .streams
            .insert(uri.to_string(), FakeStream::Endless);
        self
    }

    pub fn grant(self, permission: &str) -> Self {
        self.state().granted.insert(permission.to_string());
        self
    }

    /// `request_permissions` raises instead of showing a dialog.
    pub fn with_failing_permission_request(self) -> Self {
        self.state().permission_request_fails = true;
        self
    }

    pub fn with_failing_gallery(self) -> Self {
        self.state().gallery_fails = true;
        self
    }

    /// View intents for URIs starting with `prefix` resolve.
    pub fn with_handler(self, prefix: &str) -> Self {
        self.state().handlers.push(prefix.to_string());
        self
    }

    /// Resolves, but `start_view_intent` still fails.
    pub fn with_failing_dispatch(self, prefix: &str) -> Self {
        let mut state = self.state();
        state.handlers.push(prefix.to_string());
        state.failing_dispatch.push(prefix.to_string());
        drop(state);
        self
    }

    pub fn with_package(self, package_name: &str, label: &str) -> Self {
        self.state().packages.push(InstalledPackage {
            package_name: package_name.to_string(),
            label: label.to_string(),
        });
        self
    }

    // -- Inspection ------------------------------------------------------------

    pub fn stream_opens(&self) -> Vec<String> {
        self.state().stream_opens.clone()
    }

    pub fn permission_requests(&self) -> Vec<(Vec<String>, i32)> {
        self.state().permission_requests.clone()
    }

    pub fn gallery(&self) -> Vec<SavedImage> {
        self.state().gallery.clone()
    }

    pub fn started_intents(&self) -> Vec<String> {
        self.state().started.clone()
    }

    pub fn scripts(&self) -> Vec<String> {
        self.state().scripts.clone()
    }

    pub fn toasts(&self) -> Vec<(String, ToastDuration)> {
        self.state().toasts.clone()
    }
}

impl PlatformBridge for FakeBridge {
    fn platform_name(&self) -> &str {
        "Fake"
    }

    fn sdk_level(&self) -> u32 {
        self.sdk_level
    }

    fn cache_dir(&self) -> Result<PathBuf> {
        Ok(self.cache_dir.clone())
    }
}

impl NativeContentResolver for FakeBridge {
    fn query_data_path(
        &self,
        uri: &str,
        selection: Option<&RowSelection>,
    ) -> Result<Option<String>> {
        let state = self.state();
        if state.failing_queries.contains(uri) {
            return Err(PhotolocError::Bridge(format!("query failed for {uri}")));
        }
        Ok(state
            .data_paths
            .get(&(uri.to_string(), selection.cloned()))
            .cloned())
    }

    fn open_input_stream(&self, uri: &str) -> Result<Box<dyn Read + Send>> {
        let mut state = self.state();
        state.stream_opens.push(uri.to_string());
        let stream = state
            .streams
            .get(uri)
            .cloned()
            .ok_or_else(|| PhotolocError::Bridge(format!("no stream for {uri}")))?;
        Ok(match stream {
            FakeStream::Bytes(bytes) => Box::new(Cursor::new(bytes)),
            FakeStream::Broken { bytes, fail_after } => Box::new(FailingReader {
                inner: Cursor::new(bytes),
                remaining: fail_after,
            }),
            FakeStream::Endless => Box::new(EndlessReader),
        })
    }
}

impl NativeGallery for FakeBridge {
    fn insert_image(&self, image: &GalleryImage<'_>) -> Result<GalleryHandle> {
        let mut state = self.state();
        if state.gallery_fails {
            return Err(PhotolocError::Bridge("gallery insert refused".into()));
        }
        state.gallery.push(SavedImage {
            bytes: image.bytes.to_vec(),
            mime_type: image.mime_type.to_string(),
            title: image.title.to_string(),
            description: image.description.to_string(),
        });
        Ok(GalleryHandle(format!(
            "content://media/external/images/media/{}",
            state.gallery.len()
        )))
    }
}

impl NativePermissions for FakeBridge {
    fn check_permission(&self, permission: &str) -> bool {
        self.state().granted.contains(permission)
    }

    fn request_permissions(&self, permissions: &[&str], request_code: i32) -> Result<()> {
        let mut state = self.state();
        if state.permission_request_fails {
            return Err(PhotolocError::Bridge("no activity to host the permission dialog".into()));
        }
        state.permission_requests.push((
            permissions.iter().map(|p| p.to_string()).collect(),
            request_code,
        ));
        Ok(())
    }
}

impl NativeIntents for FakeBridge {
    fn resolves_view_intent(&self, uri: &str) -> Result<bool> {
        Ok(self
            .state()
            .handlers
            .iter()
            .any(|prefix| uri.starts_with(prefix.as_str())))
    }

    fn start_view_intent(&self, uri: &str) -> Result<()> {
        let mut state = self.state();
        if state
            .failing_dispatch
            .iter()
            .any(|prefix| uri.starts_with(prefix.as_str()))
        {
            return Err(PhotolocError::Bridge(format!("activity not found for {uri}")));
        }
        state.started.push(uri.to_string());
        Ok(())
    }
}

impl NativePackages for FakeBridge {
    fn is_package_installed(&self, package: &str) -> bool {
        self.state()
            .packages
            .iter()
            .any(|p| p.package_name == package)
    }

    fn installed_packages(&self) -> Result<Vec<InstalledPackage>> {
        Ok(self.state().packages.clone())
    }
}

impl NativeWebView for FakeBridge {
    fn evaluate_javascript(&self, script: &str) -> Result<()> {
        self.state().scripts.push(script.to_string());
        Ok(())
    }
}

impl NativeToast for FakeBridge {
    fn show_toast(&self, message: &str, duration: ToastDuration) -> Result<()> {
        self.state().toasts.push((message.to_string(), duration));
        Ok(())
    }
}
