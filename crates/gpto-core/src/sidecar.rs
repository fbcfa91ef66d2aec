//! Locating the JSON sidecar Takeout writes next to (or, for split exports,
//! somewhere else than) each media file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::scan::OutputTree;

const SUPPLEMENTAL_SUFFIX: &str = ".supplemental-metadata.json";

/// Candidate sidecar names for `filename`, in lookup order.
pub fn candidate_names(filename: &str) -> [String; 4] {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    [
        format!("{}.json", filename),
        format!("{}.json", stem),
        format!("{}{}", filename, SUPPLEMENTAL_SUFFIX),
        format!("{}{}", stem, SUPPLEMENTAL_SUFFIX),
    ]
}

fn filename_of(media_path: &Path) -> Option<&str> {
    media_path.file_name().and_then(|n| n.to_str())
}

/// First candidate that exists in the media file's own folder.
fn find_beside(media_path: &Path, candidates: &[String]) -> Option<PathBuf> {
    let dir = media_path.parent()?;
    candidates
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
}

fn walk(root: &Path, output: &OutputTree) -> impl Iterator<Item = walkdir::DirEntry> {
    let output = output.clone();
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |e| !output.contains(e.path()))
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
}

/// Find the sidecar for `media_path`: same folder first, then the first match
/// of a full walk of `input_root`. `None` is a normal outcome.
pub fn locate_sidecar(media_path: &Path, input_root: &Path) -> Option<PathBuf> {
    let candidates = candidate_names(filename_of(media_path)?);
    if let Some(found) = find_beside(media_path, &candidates) {
        return Some(found);
    }
    walk(input_root, &OutputTree::Separate)
        .find(|e| {
            e.file_name()
                .to_str()
                .map_or(false, |n| candidates.iter().any(|c| c == n))
        })
        .map(|e| e.into_path())
}

/// One walk of the input tree, remembering where each `.json` file name was
/// first seen. Answers tree-wide lookups exactly as `locate_sidecar` would.
#[derive(Debug, Default)]
pub struct SidecarIndex {
    first_seen: HashMap<String, (usize, PathBuf)>,
}

impl SidecarIndex {
    pub fn build(input_root: &Path, output: &OutputTree) -> Self {
        let mut first_seen = HashMap::new();
        let jsons = walk(input_root, output).filter(|e| {
            e.file_name()
                .to_str()
                .map_or(false, |n| n.to_ascii_lowercase().ends_with(".json"))
        });
        for (order, entry) in jsons.enumerate() {
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            first_seen
                .entry(name)
                .or_insert_with(|| (order, entry.into_path()));
        }
        Self { first_seen }
    }

    pub fn len(&self) -> usize {
        self.first_seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first_seen.is_empty()
    }

    pub fn locate(&self, media_path: &Path) -> Option<PathBuf> {
        let candidates = candidate_names(filename_of(media_path)?);
        if let Some(found) = find_beside(media_path, &candidates) {
            return Some(found);
        }
        candidates
            .iter()
            .filter_map(|name| self.first_seen.get(name))
            .min_by_key(|(order, _)| *order)
            .map(|(_, path)| path.clone())
    }
}
