use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::OrganizeError;
use crate::log::LogSink;
use crate::media::is_media_path;
use crate::writer::DATE_UNKNOWN_DIR;

/// Where the archive sits relative to the input tree, so that neither
/// enumeration nor the sidecar index reads earlier output back as input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputTree {
    /// Output root lies outside the input tree
    #[default]
    Separate,
    /// Output root is a folder somewhere below the input root
    Nested(PathBuf),
    /// Output root is the input root; only generated top-level folders belong
    /// to the archive
    Shared(PathBuf),
}

impl OutputTree {
    /// Both roots are expected to be canonical.
    pub fn new(input_root: &Path, output_root: &Path) -> Self {
        if output_root == input_root {
            OutputTree::Shared(input_root.to_path_buf())
        } else if output_root.starts_with(input_root) {
            OutputTree::Nested(output_root.to_path_buf())
        } else {
            OutputTree::Separate
        }
    }

    /// True if `path` is (the top of) archive output. The input root itself
    /// never is.
    pub fn contains(&self, path: &Path) -> bool {
        match self {
            OutputTree::Separate => false,
            OutputTree::Nested(output_root) => path == output_root,
            OutputTree::Shared(root) => {
                path.parent() == Some(root.as_path())
                    && path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .map_or(false, is_generated_folder)
            }
        }
    }
}

/// `YYYY` or `dateunknown`.
fn is_generated_folder(name: &str) -> bool {
    name == DATE_UNKNOWN_DIR || (name.len() == 4 && name.bytes().all(|b| b.is_ascii_digit()))
}

/// Folders to process: every immediate subfolder of the input root, sorted by
/// name, minus any archive output.
fn top_level(
    input_root: &Path,
    output: &OutputTree,
) -> Result<(Vec<PathBuf>, Vec<PathBuf>), OrganizeError> {
    let read_err = |source| OrganizeError::ReadInput {
        path: input_root.to_path_buf(),
        source,
    };
    let mut entries: Vec<fs::DirEntry> = fs::read_dir(input_root)
        .map_err(read_err)?
        .collect::<Result<_, _>>()
        .map_err(read_err)?;
    entries.sort_by_key(|e| e.file_name());

    let mut folders = Vec::new();
    let mut loose = Vec::new();
    for entry in entries {
        let path = entry.path();
        if output.contains(&path) {
            continue;
        }
        let Ok(ft) = entry.file_type() else { continue };
        if ft.is_dir() {
            folders.push(path);
        } else if ft.is_file() && is_media_path(&path) {
            loose.push(path);
        }
    }
    Ok((folders, loose))
}

/// Collect every media file under `input_root` in a stable order: loose files
/// at the top level first, then each subfolder walked recursively. Each path
/// appears once.
pub fn collect_media(
    input_root: &Path,
    output: &OutputTree,
    log: &dyn LogSink,
) -> Result<Vec<PathBuf>, OrganizeError> {
    let (folders, loose) = top_level(input_root, output)?;

    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut media: Vec<PathBuf> = Vec::new();

    if !loose.is_empty() {
        log.info(&format!(
            "Added '{}' (loose files at the top level) to the processing list",
            input_root.display()
        ));
    }
    for path in loose {
        if seen.insert(path.clone()) {
            media.push(path);
        }
    }

    for folder in &folders {
        log.info(&format!(
            "Added folder '{}' to the processing list",
            folder.file_name().unwrap_or_default().to_string_lossy()
        ));
        let walker = WalkDir::new(folder)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !output.contains(e.path()));
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    log.warn(&format!("Skipping unreadable entry: {}", e));
                    continue;
                }
            };
            if entry.file_type().is_file() && is_media_path(entry.path()) {
                let path = entry.into_path();
                if seen.insert(path.clone()) {
                    media.push(path);
                }
            }
        }
    }

    Ok(media)
}
