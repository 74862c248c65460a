//! Best-effort extraction of the original capture timestamp from embedded
//! EXIF metadata.
//!
//! Failure at any stage (no metadata container, missing tags, unparsable
//! value) degrades silently: the upload proceeds without a captured-at
//! timestamp, it never fails because of metadata.

use chrono::NaiveDateTime;
use exif::{In, Tag};
use std::io::Cursor;

/// Tag lookup order for the capture timestamp; first parsable value wins.
const DATE_TAGS: [Tag; 3] = [Tag::DateTimeOriginal, Tag::DateTime, Tag::DateTimeDigitized];

pub fn capture_timestamp(bytes: &[u8]) -> Option<NaiveDateTime> {
    let mut reader = Cursor::new(bytes);
    let exif = match exif::Reader::new().read_from_container(&mut reader) {
        Ok(exif) => exif,
        Err(e) => {
            tracing::debug!(error = %e, "could not retrieve photo metadata");
            return None;
        }
    };

    for tag in DATE_TAGS {
        if let Some(field) = exif.get_field(tag, In::PRIMARY) {
            let raw = field.display_value().to_string();
            let raw = raw.trim_matches('"');
            if let Some(parsed) = parse_exif_datetime(raw) {
                return Some(parsed);
            }
            tracing::debug!(?tag, value = raw, "unparsable exif timestamp");
        }
    }
    None
}

/// EXIF timestamps use `:` as the date separator (`yyyy:MM:dd HH:mm:ss`);
/// normalize the first two before parsing. Dash-dated values are parsed
/// as they are, so the time colons are never touched.
fn parse_exif_datetime(raw: &str) -> Option<NaiveDateTime> {
    let normalized = if raw.as_bytes().get(4) == Some(&b':') {
        raw.replacen(':', "-", 2)
    } else {
        raw.to_string()
    };
    NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M:%S").ok()
}
