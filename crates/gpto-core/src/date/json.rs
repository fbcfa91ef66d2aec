use std::fs;
use std::path::Path;

use chrono::{DateTime, Local};
use encoding_rs::{Encoding, UTF_8};
use serde_json::Value;

use super::localized::parse_localized_date;
use super::{DateSource, Extraction, ResolvedTimestamp};
use crate::log::LogSink;

/// Date objects in lookup order.
const TIME_KEYS: [&str; 2] = ["photoTakenTime", "creationTime"];

/// Read a sidecar into a JSON document. A UTF-8 or UTF-16 byte-order mark is
/// honoured; anything else must be valid UTF-8.
pub fn read_sidecar(path: &Path) -> Result<Value, String> {
    let bytes = fs::read(path).map_err(|e| e.to_string())?;
    let (encoding, bom_len) = Encoding::for_bom(&bytes).unwrap_or((UTF_8, 0));
    let text = encoding
        .decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
        .ok_or_else(|| format!("invalid {} text", encoding.name()))?;
    serde_json::from_str(&text).map_err(|e| e.to_string())
}

/// First date object (in `TIME_KEYS` order) that carries `field`.
///
/// Selection is by key presence only: when `photoTakenTime.<field>` exists
/// but is malformed, `creationTime.<field>` is not consulted.
fn select<'a>(doc: &'a Value, field: &str) -> Option<(&'static str, &'a Value)> {
    TIME_KEYS
        .iter()
        .find_map(|key| doc.get(key)?.get(field).map(|v| (*key, v)))
}

/// Unix seconds, given either as a string (Takeout's form) or a number.
fn unix_seconds(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        _ => None,
    }
}

/// Extract the capture date from a parsed sidecar document.
///
/// Numeric timestamps take precedence over formatted strings; within each
/// kind `photoTakenTime` precedes `creationTime`.
pub fn date_from_document(doc: &Value, log: &dyn LogSink) -> Extraction {
    let mut problems = Vec::new();

    if let Some((key, value)) = select(doc, "timestamp") {
        let local = unix_seconds(value)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|utc| utc.with_timezone(&Local).fixed_offset());
        match local {
            Some(instant) => {
                return Extraction::Found(ResolvedTimestamp::new(
                    instant,
                    DateSource::SidecarTimestamp,
                ))
            }
            None => problems.push(format!("{}.timestamp {} is not a Unix time", key, value)),
        }
    }

    if let Some((key, value)) = select(doc, "formatted") {
        let parsed = value.as_str().and_then(|s| parse_localized_date(s, log));
        match parsed {
            Some(instant) => {
                return Extraction::Found(ResolvedTimestamp::new(
                    instant,
                    DateSource::SidecarFormatted,
                ))
            }
            None => problems.push(format!("{}.formatted {} is not a recognizable date", key, value)),
        }
    }

    if problems.is_empty() {
        Extraction::Missing("no photoTakenTime or creationTime".to_string())
    } else {
        Extraction::Unusable(problems.join("; "))
    }
}

/// Read the sidecar at `path` and extract its capture date.
pub fn extract_sidecar_date(path: &Path, log: &dyn LogSink) -> Extraction {
    match read_sidecar(path) {
        Ok(doc) => date_from_document(&doc, log),
        Err(reason) => {
            let name = path.file_name().unwrap_or_default().to_string_lossy();
            log.warn(&format!("Failed to parse sidecar '{}': {}", name, reason));
            Extraction::Unusable(reason)
        }
    }
}
