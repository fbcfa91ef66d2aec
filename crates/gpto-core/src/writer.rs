use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Datelike;
use filetime::FileTime;
use serde::{Deserialize, Serialize};

use crate::date::Resolution;
use crate::error::FileError;
use crate::log::LogSink;
use crate::media::MediaFile;

/// Folder (under the output root) for files without a trusted date.
pub const DATE_UNKNOWN_DIR: &str = "dateunknown";

/// What to do when the destination name is taken by a file of another size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Leave the existing file alone and skip the source
    #[default]
    Skip,
    /// Copy to the first free `stem(N).ext`
    Rename,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveOutcome {
    Copied { dest: PathBuf, stamped: bool },
    /// Same name and size already archived
    Duplicate { dest: PathBuf },
    /// Same name, different size; nothing written
    Collision { dest: PathBuf },
}

/// `<root>/<YYYY>/<MM>` for trusted dates, `<root>/dateunknown` otherwise.
pub fn destination_dir(output_root: &Path, resolution: &Resolution) -> PathBuf {
    if resolution.trusted {
        let dt = &resolution.timestamp.instant;
        output_root
            .join(format!("{:04}", dt.year()))
            .join(format!("{:02}", dt.month()))
    } else {
        output_root.join(DATE_UNKNOWN_DIR)
    }
}

fn numbered_name(filename: &str, n: u32) -> String {
    let path = Path::new(filename);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) => format!("{}({}).{}", stem, n, ext),
        None => format!("{}({})", stem, n),
    }
}

enum Slot {
    Free(PathBuf),
    Duplicate(PathBuf),
    Collision(PathBuf),
}

/// Walk candidate names until one is free or already holds this file.
fn find_slot(dir: &Path, media: &MediaFile, policy: CollisionPolicy) -> Result<Slot, FileError> {
    let mut n = 0u32;
    loop {
        let name = if n == 0 {
            media.filename.clone()
        } else {
            numbered_name(&media.filename, n)
        };
        let candidate = dir.join(name);
        match fs::metadata(&candidate) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Slot::Free(candidate)),
            Err(source) => {
                return Err(FileError::Metadata {
                    path: candidate,
                    source,
                })
            }
            Ok(meta) if meta.len() == media.size => return Ok(Slot::Duplicate(candidate)),
            Ok(_) if policy == CollisionPolicy::Skip => return Ok(Slot::Collision(candidate)),
            Ok(_) => n += 1,
        }
    }
}

/// Copy content and permissions into a destination that must not exist yet.
fn copy_new(from: &Path, to: &Path) -> io::Result<fs::Metadata> {
    let src_meta = fs::metadata(from)?;
    let mut reader = BufReader::new(File::open(from)?);
    let out = OpenOptions::new().write(true).create_new(true).open(to)?;
    let mut writer = BufWriter::new(out);
    let written = io::copy(&mut reader, &mut writer).and_then(|_| writer.flush());
    drop(writer);
    if let Err(e) = written {
        // Only our own partial file is removed.
        let _ = fs::remove_file(to);
        return Err(e);
    }
    fs::set_permissions(to, src_meta.permissions())?;
    Ok(src_meta)
}

/// Copy `media` into its archive destination.
///
/// Existing destination files are never overwritten. Dated copies get their
/// access and modification times set to the resolved date; undated copies keep
/// the source's times. A failure to set times is logged, not returned.
pub fn archive(
    media: &MediaFile,
    resolution: &Resolution,
    output_root: &Path,
    policy: CollisionPolicy,
    log: &dyn LogSink,
) -> Result<ArchiveOutcome, FileError> {
    let dir = destination_dir(output_root, resolution);
    fs::create_dir_all(&dir).map_err(|source| FileError::CreateDir {
        path: dir.clone(),
        source,
    })?;

    let dest = match find_slot(&dir, media, policy)? {
        Slot::Free(dest) => dest,
        Slot::Duplicate(dest) => {
            log.info(&format!(
                "Skipped '{}': already archived at '{}'",
                media.filename,
                dest.display()
            ));
            return Ok(ArchiveOutcome::Duplicate { dest });
        }
        Slot::Collision(dest) => {
            log.warn(&format!(
                "Skipped '{}': '{}' exists with a different size",
                media.filename,
                dest.display()
            ));
            return Ok(ArchiveOutcome::Collision { dest });
        }
    };

    let src_meta = copy_new(&media.path, &dest).map_err(|source| FileError::Copy {
        from: media.path.clone(),
        to: dest.clone(),
        source,
    })?;

    let times = if resolution.trusted {
        let instant = &resolution.timestamp.instant;
        let ft = FileTime::from_unix_time(instant.timestamp(), instant.timestamp_subsec_nanos());
        (ft, ft)
    } else {
        (
            FileTime::from_last_access_time(&src_meta),
            FileTime::from_last_modification_time(&src_meta),
        )
    };
    let stamped = match filetime::set_file_times(&dest, times.0, times.1) {
        Ok(()) => true,
        Err(e) => {
            log.error(&format!(
                "Failed to set file times on '{}': {}",
                dest.display(),
                e
            ));
            false
        }
    };

    log.info(&format!(
        "Copied '{}' -> '{}'{}",
        media.filename,
        dest.display(),
        if stamped { "" } else { " (file times not set)" }
    ));
    Ok(ArchiveOutcome::Copied { dest, stamped })
}
