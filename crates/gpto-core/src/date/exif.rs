use chrono::NaiveDateTime;
use exif::{In, Reader, Tag};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::localized::in_local_zone;
use super::{DateSource, Extraction, ResolvedTimestamp};
use crate::media::has_exif_extension;

/// Capture tags first; the generic DateTime tag is only a fallback.
const DATE_TAGS: [Tag; 3] = [Tag::DateTimeOriginal, Tag::DateTimeDigitized, Tag::DateTime];

/// Read the embedded capture date of an image file.
/// EXIF datetimes have no timezone info - they are taken as local time.
pub fn extract_embedded_date(path: &Path) -> Extraction {
    if !has_exif_extension(path) {
        return Extraction::Missing("not an image type with embedded dates".to_string());
    }

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => return Extraction::Unusable(e.to_string()),
    };
    let exif = match Reader::new().read_from_container(&mut BufReader::new(file)) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => return Extraction::Missing("no EXIF data".to_string()),
        Err(e) => return Extraction::Unusable(e.to_string()),
    };

    let naive = DATE_TAGS.iter().find_map(|tag| {
        let field = exif.get_field(*tag, In::PRIMARY)?;
        parse_exif_datetime(&field.display_value().to_string())
    });
    let Some(naive) = naive else {
        return Extraction::Missing("no capture date tag".to_string());
    };

    match in_local_zone(naive) {
        Some(instant) => Extraction::Found(ResolvedTimestamp::new(instant, DateSource::Embedded)),
        None => Extraction::Unusable(format!("{} does not exist in the local timezone", naive)),
    }
}

fn parse_exif_datetime(s: &str) -> Option<NaiveDateTime> {
    let cleaned = s.trim().replace(['-', '/', '\\', '.'], ":");
    NaiveDateTime::parse_from_str(&cleaned, "%Y:%m:%d %H:%M:%S").ok()
}
