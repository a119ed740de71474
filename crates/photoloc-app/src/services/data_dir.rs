// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware data directory resolution.

use std::path::{Path, PathBuf};

use photoloc_core::error::Result;

const APP_DIR: &str = "photoloc";

/// Return the application data directory, creating it if needed.
///
/// `$XDG_DATA_HOME/photoloc`, else `~/.local/share/photoloc`. On Android
/// the process runs with `HOME` pointing into the app's private storage.
pub fn data_dir() -> Result<PathBuf> {
    let dir = base_dir().join(APP_DIR);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Location of the persisted settings inside `data_dir`.
pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config.json")
}

fn base_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg);
    }
    if let Some(home) = std::env::var_os("HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(home).join(".local").join("share");
    }
    std::env::temp_dir()
}
