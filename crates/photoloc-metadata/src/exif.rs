// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// EXIF extraction: GPS fix, capture time, device and orientation from any
// container `kamadak-exif` understands (JPEG, TIFF, HEIF, PNG, WebP).

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Seek};
use std::path::Path;

use ::exif::{Exif, Field, In, Reader, Tag, Value};
use photoloc_core::error::{PhotolocError, Result};
use photoloc_core::types::{ExifMetadata, GeoPoint};
use tracing::{debug, instrument};

/// Parse the image at `path`.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn read_from_path(path: impl AsRef<Path>) -> Result<ExifMetadata> {
    let file = File::open(path.as_ref())?;
    read_from_container(&mut BufReader::new(file))
}

/// Parse an image held in memory.
pub fn read_from_bytes(data: &[u8]) -> Result<ExifMetadata> {
    read_from_container(&mut Cursor::new(data))
}

/// Parse an image container.
///
/// A container without an EXIF block is readable and yields empty metadata.
/// An unrecognised container or an I/O failure is an error.
pub fn read_from_container<R: BufRead + Seek>(reader: &mut R) -> Result<ExifMetadata> {
    match Reader::new().read_from_container(reader) {
        Ok(exif) => Ok(extract(&exif)),
        Err(::exif::Error::NotFound(container)) => {
            debug!(container, "no EXIF block");
            Ok(ExifMetadata::default())
        }
        Err(::exif::Error::Io(err)) => Err(PhotolocError::Io(err)),
        Err(err) => Err(PhotolocError::Exif(err.to_string())),
    }
}

fn extract(exif: &Exif) -> ExifMetadata {
    let metadata = ExifMetadata {
        location: location(exif),
        datetime: ascii_field(exif, Tag::DateTime)
            .or_else(|| ascii_field(exif, Tag::DateTimeOriginal)),
        make: ascii_field(exif, Tag::Make),
        model: ascii_field(exif, Tag::Model),
        orientation: exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0)),
    };
    debug!(
        has_location = metadata.has_location(),
        fields = exif.fields().len(),
        "EXIF extracted"
    );
    metadata
}

/// Latitude and longitude with their hemisphere refs, or nothing.
fn location(exif: &Exif) -> Option<GeoPoint> {
    let latitude = coordinate(exif, Tag::GPSLatitude, Tag::GPSLatitudeRef, 'N', 'S')?;
    let longitude = coordinate(exif, Tag::GPSLongitude, Tag::GPSLongitudeRef, 'E', 'W')?;
    if latitude.abs() > 90.0 || longitude.abs() > 180.0 {
        debug!(latitude, longitude, "GPS fix out of range, ignored");
        return None;
    }
    Some(GeoPoint {
        latitude,
        longitude,
    })
}

fn coordinate(exif: &Exif, tag: Tag, ref_tag: Tag, positive: char, negative: char) -> Option<f64> {
    let magnitude = dms_to_degrees(exif.get_field(tag, In::PRIMARY)?)?;
    let hemisphere = ascii_field(exif, ref_tag)?;
    match hemisphere.chars().next()?.to_ascii_uppercase() {
        c if c == positive => Some(magnitude),
        c if c == negative => Some(-magnitude),
        _ => None,
    }
}

/// `[degrees, minutes, seconds]` rationals to decimal degrees.
fn dms_to_degrees(field: &Field) -> Option<f64> {
    let Value::Rational(parts) = &field.value else {
        return None;
    };
    if parts.len() < 3 || parts.iter().take(3).any(|r| r.denom == 0) {
        return None;
    }
    let degrees = parts[0].to_f64() + parts[1].to_f64() / 60.0 + parts[2].to_f64() / 3600.0;
    degrees.is_finite().then_some(degrees)
}

/// First ASCII component of a field, trimmed; empty is absent.
fn ascii_field(exif: &Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    let Value::Ascii(components) = &field.value else {
        return None;
    };
    let text = String::from_utf8_lossy(components.first()?);
    let text = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    (!text.is_empty()).then(|| text.to_string())
}
