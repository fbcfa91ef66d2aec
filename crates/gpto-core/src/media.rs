use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::FileError;

/// Extensions collected by the run. Sidecar `.json` files are never media.
pub const MEDIA_EXTENSIONS: &[&str] = &[
    "mp4", "mov", "avi", "webm", "mkv", "jpg", "jpeg", "png", "heic", "webp", "gif",
];

/// Extensions whose embedded capture tag is consulted. Video containers are
/// not probed.
pub const EXIF_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tiff", "heic"];

fn extension_in(path: &Path, list: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |ext| list.iter().any(|x| x.eq_ignore_ascii_case(ext)))
}

pub fn is_media_path(path: &Path) -> bool {
    extension_in(path, MEDIA_EXTENSIONS)
}

pub fn has_exif_extension(path: &Path) -> bool {
    extension_in(path, EXIF_EXTENSIONS)
}

/// A source media file. Never written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    /// Absolute (or input-root-joined) path
    pub path: PathBuf,
    /// Just the filename, preserved verbatim in the output tree
    pub filename: String,
    /// File size in bytes
    pub size: u64,
}

impl MediaFile {
    pub fn new(path: PathBuf, size: u64) -> Self {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, filename, size }
    }

    /// Stat `path` and build a `MediaFile` from it.
    pub fn open(path: &Path) -> Result<Self, FileError> {
        let meta = fs::metadata(path).map_err(|source| FileError::Metadata {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(path.to_path_buf(), meta.len()))
    }

    /// Filesystem modification time, read fresh from disk.
    pub fn modified(&self) -> Result<DateTime<Local>, FileError> {
        let err = |source| FileError::ModifiedTime {
            path: self.path.clone(),
            source,
        };
        let mtime = fs::metadata(&self.path).and_then(|m| m.modified()).map_err(err)?;
        Ok(DateTime::<Local>::from(mtime))
    }
}
