// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Test images built in memory: a tiny JPEG from the `image` crate, with an
// optional EXIF block written by `kamadak-exif` and spliced in as APP1.

use std::io::Cursor;

use ::exif::experimental::Writer;
use ::exif::{Field, In, Rational, Tag, Value};
use image::{DynamicImage, ImageFormat, RgbImage};

pub const FIXTURE_MAKE: &str = "Apple";
pub const FIXTURE_MODEL: &str = "iPhone 14";
pub const FIXTURE_DATETIME: &str = "2024:01:15 10:30:45";

/// 8x8 grey JPEG with no EXIF block.
pub fn plain_jpeg() -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, image::Rgb([128, 128, 128])));
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Jpeg)
        .expect("encode fixture jpeg");
    out.into_inner()
}

/// 8x8 PNG, used where a valid raster that is not a JPEG is needed.
pub fn plain_png() -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, image::Rgb([10, 20, 30])));
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .expect("encode fixture png");
    out.into_inner()
}

/// JPEG carrying exactly `fields` in its EXIF block.
pub fn jpeg_with_fields(fields: &[Field]) -> Vec<u8> {
    let mut writer = Writer::new();
    for field in fields {
        writer.push_field(field);
    }
    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, false).expect("write fixture exif");
    let tiff = tiff.into_inner();

    let jpeg = plain_jpeg();
    // APP1 length covers itself, the "Exif\0\0" marker and the TIFF data.
    let segment_len = u16::try_from(2 + 6 + tiff.len()).expect("fixture exif too large");

    let mut out = Vec::with_capacity(jpeg.len() + tiff.len() + 10);
    out.extend_from_slice(&jpeg[..2]); // SOI
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(&tiff);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// JPEG with a GPS fix, capture time, device and orientation 6.
pub fn tagged_jpeg(latitude: f64, longitude: f64) -> Vec<u8> {
    let mut fields = gps_fields(latitude, longitude);
    fields.extend([
        ascii(Tag::Make, FIXTURE_MAKE),
        ascii(Tag::Model, FIXTURE_MODEL),
        ascii(Tag::DateTime, FIXTURE_DATETIME),
        Field {
            tag: Tag::Orientation,
            ifd_num: In::PRIMARY,
            value: Value::Short(vec![6]),
        },
    ]);
    jpeg_with_fields(&fields)
}

/// JPEG with device and time but no GPS.
pub fn untagged_location_jpeg() -> Vec<u8> {
    jpeg_with_fields(&[
        ascii(Tag::Make, FIXTURE_MAKE),
        ascii(Tag::Model, FIXTURE_MODEL),
        ascii(Tag::DateTime, FIXTURE_DATETIME),
    ])
}

/// The four GPS fields for a signed decimal position.
pub fn gps_fields(latitude: f64, longitude: f64) -> Vec<Field> {
    vec![
        Field {
            tag: Tag::GPSLatitudeRef,
            ifd_num: In::PRIMARY,
            value: ascii_value(if latitude < 0.0 { "S" } else { "N" }),
        },
        Field {
            tag: Tag::GPSLatitude,
            ifd_num: In::PRIMARY,
            value: dms(latitude),
        },
        Field {
            tag: Tag::GPSLongitudeRef,
            ifd_num: In::PRIMARY,
            value: ascii_value(if longitude < 0.0 { "W" } else { "E" }),
        },
        Field {
            tag: Tag::GPSLongitude,
            ifd_num: In::PRIMARY,
            value: dms(longitude),
        },
    ]
}

pub fn ascii(tag: Tag, text: &str) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: ascii_value(text),
    }
}

fn ascii_value(text: &str) -> Value {
    Value::Ascii(vec![text.as_bytes().to_vec()])
}

/// Degrees/minutes/seconds rationals for the magnitude of `value`.
pub fn dms(value: f64) -> Value {
    let value = value.abs();
    let degrees = value.trunc();
    let minutes_full = (value - degrees) * 60.0;
    let minutes = minutes_full.trunc();
    let seconds = (minutes_full - minutes) * 60.0;
    Value::Rational(vec![
        Rational {
            num: degrees as u32,
            denom: 1,
        },
        Rational {
            num: minutes as u32,
            denom: 1,
        },
        Rational {
            num: (seconds * 10_000.0).round() as u32,
            denom: 10_000,
        },
    ])
}
