// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: image references, extracted metadata, map targets and
// the value objects exchanged between the share, gallery and map flows.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{PhotolocError, Result};

/// `datetime` shown when the photo carries no capture time.
pub const UNKNOWN_TIME: &str = "Unknown time";

/// `device` shown when make or model is missing.
pub const UNKNOWN_DEVICE: &str = "Unknown device";

/// EXIF `DateTime` layout ("2024:01:15 10:30:45").
const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

// ---------------------------------------------------------------------------
// ImageReference
// ---------------------------------------------------------------------------

/// Opaque locator for a photo (`file://`, `content://`, ...).
///
/// The original string is kept verbatim so the platform receives exactly
/// what it handed us; the parsed form only serves inspection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageReference {
    raw: String,
    url: Url,
}

impl ImageReference {
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let url = Url::parse(&raw)
            .map_err(|e| PhotolocError::InvalidReference(format!("{raw}: {e}")))?;
        Ok(Self { raw, url })
    }

    /// Build a `file://` reference from an absolute filesystem path.
    pub fn from_file_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let url = Url::from_file_path(path).map_err(|()| {
            PhotolocError::InvalidReference(format!(
                "{} is not an absolute path",
                path.display()
            ))
        })?;
        Ok(Self {
            raw: url.to_string(),
            url,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    pub fn authority(&self) -> Option<&str> {
        self.url.host_str()
    }

    /// Raw (still percent-encoded) path segments.
    pub fn path_segments(&self) -> Vec<&str> {
        self.url
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }

    /// Last path segment, percent-decoded.
    pub fn last_path_segment(&self) -> Option<String> {
        self.path_segments()
            .last()
            .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned())
    }

    pub fn is_file(&self) -> bool {
        self.scheme() == "file"
    }

    pub fn is_content(&self) -> bool {
        self.scheme() == "content"
    }

    /// Storage Access Framework references, e.g.
    /// `content://com.android.providers.media.documents/document/image%3A42`.
    pub fn is_document(&self) -> bool {
        self.is_content()
            && self
                .authority()
                .is_some_and(|authority| authority.contains("documents"))
    }

    /// Decode the composite `type:id` identifier of a document reference.
    pub fn document_id(&self) -> Option<DocumentId> {
        if !self.is_document() {
            return None;
        }
        DocumentId::parse(&self.last_path_segment()?)
    }

    /// Local filesystem path for `file://` references.
    pub fn to_file_path(&self) -> Option<PathBuf> {
        if !self.is_file() {
            return None;
        }
        self.url.to_file_path().ok()
    }
}

impl std::fmt::Display for ImageReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

impl std::str::FromStr for ImageReference {
    type Err = PhotolocError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// `type:id` pair carried by a document reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentId {
    pub kind: String,
    pub id: String,
}

impl DocumentId {
    pub fn parse(document_id: &str) -> Option<Self> {
        let (kind, id) = document_id.split_once(':')?;
        if kind.is_empty() || id.is_empty() {
            return None;
        }
        Some(Self {
            kind: kind.to_string(),
            id: id.to_string(),
        })
    }

    /// Media table holding rows of this document's kind.
    pub fn media_table(&self) -> Option<MediaTable> {
        match self.kind.as_str() {
            "image" => Some(MediaTable::Images),
            "video" => Some(MediaTable::Video),
            "audio" => Some(MediaTable::Audio),
            _ => None,
        }
    }
}

/// External media-store tables a document id can point into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaTable {
    Images,
    Video,
    Audio,
}

impl MediaTable {
    pub fn content_uri(&self) -> &'static str {
        match self {
            Self::Images => "content://media/external/images/media",
            Self::Video => "content://media/external/video/media",
            Self::Audio => "content://media/external/audio/media",
        }
    }
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// A GPS fix in decimal degrees (south and west negative).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Metadata extracted from a photo.
///
/// Latitude and longitude travel together in `location`, so a reader
/// never sees one without the other.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExifMetadata {
    pub location: Option<GeoPoint>,
    /// Raw EXIF `DateTime` string.
    pub datetime: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    /// EXIF orientation (1-8).
    pub orientation: Option<u32>,
}

impl ExifMetadata {
    pub fn latitude(&self) -> Option<f64> {
        self.location.map(|p| p.latitude)
    }

    pub fn longitude(&self) -> Option<f64> {
        self.location.map(|p| p.longitude)
    }

    pub fn has_location(&self) -> bool {
        self.location.is_some()
    }

    pub fn captured_at(&self) -> Option<NaiveDateTime> {
        let raw = self.datetime.as_deref()?;
        NaiveDateTime::parse_from_str(raw.trim().trim_matches('"'), EXIF_DATETIME_FORMAT).ok()
    }
}

/// JSON object handed to the page's `showLocation` function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationPayload {
    pub latitude: f64,
    pub longitude: f64,
    pub datetime: String,
    pub device: String,
}

impl LocationPayload {
    /// `None` when the metadata has no GPS fix.
    pub fn from_metadata(metadata: &ExifMetadata) -> Option<Self> {
        let location = metadata.location?;
        let make = metadata.make.as_deref().unwrap_or("");
        let model = metadata.model.as_deref().unwrap_or("");
        let device = if !make.is_empty() && !model.is_empty() {
            format!("{make} {model}")
        } else {
            UNKNOWN_DEVICE.to_string()
        };
        Some(Self {
            latitude: location.latitude,
            longitude: location.longitude,
            datetime: metadata
                .datetime
                .clone()
                .unwrap_or_else(|| UNKNOWN_TIME.to_string()),
            device,
        })
    }

    /// Script evaluated in the web view to render the location.
    ///
    /// U+2028 and U+2029 are valid in JSON strings but end a line in older
    /// JavaScript engines, so they are escaped too.
    pub fn to_script(&self) -> Result<String> {
        let json = serde_json::to_string(self)?
            .replace('\u{2028}', "\\u2028")
            .replace('\u{2029}', "\\u2029");
        Ok(format!("javascript:showLocation({json})"))
    }
}

// ---------------------------------------------------------------------------
// Map hand-off
// ---------------------------------------------------------------------------

/// Where to point the external map application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapTarget {
    pub latitude: f64,
    pub longitude: f64,
    pub label: String,
}

impl MapTarget {
    pub fn new(latitude: f64, longitude: f64, label: impl Into<String>) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(PhotolocError::InvalidCoordinates(format!(
                "latitude {latitude} out of range"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(PhotolocError::InvalidCoordinates(format!(
                "longitude {longitude} out of range"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
            label: label.into(),
        })
    }

    /// Parse the string coordinates the page passes across the bridge.
    pub fn parse(latitude: &str, longitude: &str, label: impl Into<String>) -> Result<Self> {
        let lat = latitude.trim().parse::<f64>().map_err(|e| {
            PhotolocError::InvalidCoordinates(format!("latitude {latitude:?}: {e}"))
        })?;
        let lon = longitude.trim().parse::<f64>().map_err(|e| {
            PhotolocError::InvalidCoordinates(format!("longitude {longitude:?}: {e}"))
        })?;
        Self::new(lat, lon, label)
    }
}

/// Terminal state of a map launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaunchOutcome {
    /// The map application took the deep link.
    Opened,
    /// No map app; the store listing was opened instead.
    OpenedFallbackStore,
    /// Neither map app nor store; the provider's mobile site was opened.
    OpenedFallbackWeb,
    /// Nothing on the device can handle any of the links.
    NoHandlerAvailable,
}

// ---------------------------------------------------------------------------
// Gallery export
// ---------------------------------------------------------------------------

/// A decoded image ready for insertion into the gallery. Consumed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub image_data: Vec<u8>,
    pub suggested_name: String,
    /// MIME type sniffed from the decoded bytes.
    pub mime_type: String,
}

/// Opaque handle to a gallery entry (a `content://` URI on Android).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GalleryHandle(pub String);

impl std::fmt::Display for GalleryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Inbound share
// ---------------------------------------------------------------------------

pub const ACTION_SEND: &str = "android.intent.action.SEND";
pub const ACTION_SEND_MULTIPLE: &str = "android.intent.action.SEND_MULTIPLE";

/// Action of an inbound intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareAction {
    Send,
    SendMultiple,
    Other(String),
}

impl ShareAction {
    pub fn from_action(action: &str) -> Self {
        match action {
            ACTION_SEND => Self::Send,
            ACTION_SEND_MULTIPLE => Self::SendMultiple,
            other => Self::Other(other.to_string()),
        }
    }
}

/// An inbound "share" intent as delivered by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareIntent {
    pub action: ShareAction,
    pub mime_type: Option<String>,
    pub streams: Vec<ImageReference>,
}

impl ShareIntent {
    /// Shared image references, or `None` if this is not an image share.
    pub fn image_refs(&self) -> Option<&[ImageReference]> {
        let is_image = self
            .mime_type
            .as_deref()
            .is_some_and(|mime| mime.starts_with("image/"));
        if !is_image {
            return None;
        }
        match self.action {
            ShareAction::Send => Some(&self.streams[..self.streams.len().min(1)]),
            ShareAction::SendMultiple => Some(&self.streams),
            ShareAction::Other(_) => None,
        }
    }
}
