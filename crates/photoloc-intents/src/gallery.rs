// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Gallery export: decode the page's base64 image and insert it into the
// device photo gallery, behind the storage permission gate.

use std::sync::Arc;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use photoloc_bridge::{GalleryImage, NativeGallery, NativePermissions};
use photoloc_core::config::GalleryConfig;
use photoloc_core::error::ExportError;
use photoloc_core::types::{ExportRequest, GalleryHandle};
use tracing::{debug, info, instrument, warn};

use crate::permission::{PermissionStrategy, ensure_permission};

/// Toast shown after a successful save.
pub const SAVED_MESSAGE: &str = "Image saved to gallery";

/// Standard alphabet; canvas exports are padded, hand-written payloads
/// often are not.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Saves page-rendered images into the gallery.
pub struct GalleryExporter<B: ?Sized> {
    platform: Arc<B>,
    permission: Box<dyn PermissionStrategy>,
    description: String,
}

impl<B> GalleryExporter<B>
where
    B: ?Sized + NativeGallery + NativePermissions,
{
    pub fn new(
        platform: Arc<B>,
        permission: Box<dyn PermissionStrategy>,
        config: &GalleryConfig,
    ) -> Self {
        Self {
            platform,
            permission,
            description: config.description.clone(),
        }
    }

    /// Save `payload` (raw base64 or a `data:` URL) under `name`.
    ///
    /// Without permission the platform is asked once and nothing is saved.
    #[instrument(skip_all, fields(name = %name, payload_len = payload.len()))]
    pub fn export(&self, payload: &str, name: &str) -> Result<GalleryHandle, ExportError> {
        match ensure_permission(self.permission.as_ref(), self.platform.as_ref()) {
            Ok(true) => {}
            Ok(false) => {
                info!(permission = self.permission.permission(), "save blocked on permission");
                return Err(ExportError::PermissionDenied);
            }
            Err(e) => {
                warn!(error = %e, "permission request failed");
                return Err(ExportError::PermissionRequestFailed(e.to_string()));
            }
        }

        let request = decode_payload(payload, name)?;
        let image = GalleryImage {
            bytes: &request.image_data,
            mime_type: &request.mime_type,
            title: &request.suggested_name,
            description: &self.description,
        };

        let handle = self.platform.insert_image(&image).map_err(|e| {
            warn!(error = %e, "gallery insert failed");
            ExportError::InsertFailed(e.to_string())
        })?;
        info!(%handle, mime = %request.mime_type, "image saved to gallery");
        Ok(handle)
    }
}

/// Decode a page payload into an [`ExportRequest`].
///
/// Everything up to the first comma is treated as a `data:` URL header.
/// The bytes must decode as a raster image.
pub fn decode_payload(payload: &str, name: &str) -> Result<ExportRequest, ExportError> {
    let body = payload.split_once(',').map_or(payload, |(_, body)| body);
    let body: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    let image_data = PAYLOAD_ENGINE
        .decode(body.as_bytes())
        .map_err(|e| ExportError::DecodeFailed(format!("invalid base64: {e}")))?;
    if image_data.is_empty() {
        return Err(ExportError::DecodeFailed("empty image data".into()));
    }

    let format = image::guess_format(&image_data)
        .map_err(|e| ExportError::DecodeFailed(format!("not an image: {e}")))?;
    let decoded = image::load_from_memory_with_format(&image_data, format)
        .map_err(|e| ExportError::DecodeFailed(format!("corrupt {format:?}: {e}")))?;
    debug!(
        ?format,
        width = decoded.width(),
        height = decoded.height(),
        bytes = image_data.len(),
        "payload decoded"
    );

    Ok(ExportRequest {
        image_data,
        suggested_name: name.to_string(),
        mime_type: format.to_mime_type().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::STANDARD;
    use photoloc_bridge::fake::FakeBridge;
    use photoloc_metadata::fixtures::{plain_jpeg, plain_png};

    use super::*;
    use crate::permission::{MediaImages, READ_MEDIA_IMAGES};

    fn exporter(bridge: &Arc<FakeBridge>) -> GalleryExporter<FakeBridge> {
        GalleryExporter::new(
            Arc::clone(bridge),
            Box::new(MediaImages),
            &GalleryConfig::default(),
        )
    }

    #[test]
    fn denied_permission_saves_nothing() {
        let bridge = Arc::new(FakeBridge::new());
        let result = exporter(&bridge).export("data:image/png;base64,XXXX", "photo.png");

        assert_eq!(result, Err(ExportError::PermissionDenied));
        assert!(bridge.gallery().is_empty());
        assert_eq!(
            bridge.permission_requests(),
            vec![(vec![READ_MEDIA_IMAGES.to_string()], 100)]
        );
    }

    #[test]
    fn failed_permission_request_is_not_a_pending_denial() {
        let bridge = Arc::new(FakeBridge::new().with_failing_permission_request());
        let result = exporter(&bridge).export("data:image/png;base64,XXXX", "photo.png");

        assert!(matches!(result, Err(ExportError::PermissionRequestFailed(_))));
        assert!(bridge.gallery().is_empty());
    }

    #[test]
    fn data_url_is_saved_with_sniffed_type() {
        let bridge = Arc::new(FakeBridge::new().grant(READ_MEDIA_IMAGES));
        let png = plain_png();
        let payload = format!("data:image/png;base64,{}", STANDARD.encode(&png));

        let handle = exporter(&bridge).export(&payload, "location.png").unwrap();

        assert!(handle.0.starts_with("content://media/external/images/media/"));
        let saved = bridge.gallery();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].bytes, png);
        assert_eq!(saved[0].mime_type, "image/png");
        assert_eq!(saved[0].title, "location.png");
        assert_eq!(saved[0].description, "Photo Location Viewer");
    }

    #[test]
    fn raw_base64_with_line_breaks_is_accepted() {
        let encoded = STANDARD.encode(plain_jpeg());
        let wrapped: String = encoded
            .as_bytes()
            .chunks(76)
            .map(|line| format!("{}\n", String::from_utf8_lossy(line)))
            .collect();
        let trimmed = wrapped.trim_end().trim_end_matches('=');

        let request = decode_payload(trimmed, "shot.jpg").unwrap();
        assert_eq!(request.mime_type, "image/jpeg");
        assert_eq!(request.suggested_name, "shot.jpg");
    }

    #[test]
    fn garbage_payloads_fail_to_decode() {
        assert!(matches!(
            decode_payload("data:image/png;base64,@@@", "x.png"),
            Err(ExportError::DecodeFailed(_))
        ));
        assert!(matches!(
            decode_payload("data:image/png;base64,", "x.png"),
            Err(ExportError::DecodeFailed(_))
        ));
        let text = STANDARD.encode(b"hello, this is not a picture");
        assert!(matches!(
            decode_payload(&text, "x.png"),
            Err(ExportError::DecodeFailed(_))
        ));
    }

    #[test]
    fn truncated_image_fails_to_decode() {
        let png = plain_png();
        let payload = STANDARD.encode(&png[..png.len() / 2]);
        assert!(matches!(
            decode_payload(&payload, "x.png"),
            Err(ExportError::DecodeFailed(_))
        ));
    }

    #[test]
    fn gallery_refusal_is_insert_failed() {
        let bridge = Arc::new(
            FakeBridge::new()
                .grant(READ_MEDIA_IMAGES)
                .with_failing_gallery(),
        );
        let payload = STANDARD.encode(plain_png());
        assert!(matches!(
            exporter(&bridge).export(&payload, "x.png"),
            Err(ExportError::InsertFailed(_))
        ));
    }
}
