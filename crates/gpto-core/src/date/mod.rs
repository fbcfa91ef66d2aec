pub mod exif;
pub mod json;
pub mod localized;
pub mod window;

use std::fmt;
use std::path::Path;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::FileError;
use crate::log::LogSink;
use crate::media::MediaFile;
use window::PlausibilityWindow;

/// Where a resolved timestamp came from, most trusted first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateSource {
    SidecarTimestamp,
    SidecarFormatted,
    Embedded,
    ModifiedTime,
}

impl fmt::Display for DateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DateSource::SidecarTimestamp => "sidecar timestamp",
            DateSource::SidecarFormatted => "sidecar formatted date",
            DateSource::Embedded => "embedded metadata",
            DateSource::ModifiedTime => "file modification time",
        };
        f.write_str(s)
    }
}

/// An absolute instant plus the offset it should be displayed (and filed) in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTimestamp {
    pub instant: DateTime<FixedOffset>,
    pub source: DateSource,
}

impl ResolvedTimestamp {
    pub fn new(instant: DateTime<FixedOffset>, source: DateSource) -> Self {
        Self { instant, source }
    }
}

/// Outcome of asking one source for a date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Found(ResolvedTimestamp),
    /// The source does not exist for this file
    Missing(String),
    /// The source exists but could not be read or parsed
    Unusable(String),
}

/// Final verdict for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub timestamp: ResolvedTimestamp,
    /// Inside the plausibility window at classification time
    pub trusted: bool,
}

fn classify(
    ts: ResolvedTimestamp,
    filename: &str,
    window: &PlausibilityWindow,
    log: &dyn LogSink,
) -> Resolution {
    let trusted = window.contains(&ts.instant);
    log.info(&format!(
        "Date from {} for '{}': {}",
        ts.source,
        filename,
        ts.instant.format("%Y/%m/%d %H:%M:%S %:z")
    ));
    if !trusted {
        log.info(&format!(
            "Date of '{}' is before the service launch or in the future; routing to dateunknown",
            filename
        ));
    }
    Resolution { timestamp: ts, trusted }
}

/// Resolve the capture date of `media`: sidecar, then embedded metadata,
/// then filesystem modification time.
///
/// The first source that yields a date decides, trusted or not; later
/// sources are only consulted when the earlier ones produced nothing. Only
/// an unreadable modification time is an error, and it abandons the file.
pub fn resolve(
    media: &MediaFile,
    sidecar: Option<&Path>,
    window: &PlausibilityWindow,
    log: &dyn LogSink,
) -> Result<Resolution, FileError> {
    let name = media.filename.as_str();

    match sidecar {
        Some(path) => match json::extract_sidecar_date(path, log) {
            Extraction::Found(ts) => return Ok(classify(ts, name, window, log)),
            Extraction::Missing(reason) | Extraction::Unusable(reason) => log.warn(&format!(
                "No usable date in sidecar '{}' ({}); trying embedded metadata",
                path.display(),
                reason
            )),
        },
        None => log.warn(&format!(
            "No sidecar found for '{}'; trying embedded metadata",
            name
        )),
    }

    match exif::extract_embedded_date(&media.path) {
        Extraction::Found(ts) => return Ok(classify(ts, name, window, log)),
        Extraction::Missing(reason) | Extraction::Unusable(reason) => log.warn(&format!(
            "No usable embedded date in '{}' ({}); using file modification time",
            name, reason
        )),
    }

    let mtime = media.modified()?;
    let ts = ResolvedTimestamp::new(mtime.fixed_offset(), DateSource::ModifiedTime);
    Ok(classify(ts, name, window, log))
}
