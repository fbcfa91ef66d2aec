pub mod cancel;
pub mod date;
pub mod error;
pub mod log;
pub mod media;
pub mod scan;
pub mod sidecar;
pub mod writer;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use date::window::PlausibilityWindow;
use date::Resolution;
use media::MediaFile;
use scan::OutputTree;
use sidecar::SidecarIndex;
use writer::ArchiveOutcome;

pub use cancel::CancellationToken;
pub use error::{FileError, OrganizeError};
pub use log::{LogLevel, LogRecord, LogSink};
pub use writer::CollisionPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizeOptions {
    /// Root of the extracted Takeout tree (read only)
    pub input_root: PathBuf,
    /// Root of the dated archive (created if missing)
    pub output_root: PathBuf,
    #[serde(default)]
    pub collision: CollisionPolicy,
}

/// Control options for a run (cancellation).
#[derive(Debug, Clone, Default)]
pub struct RunControl {
    pub cancel_token: Option<CancellationToken>,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = Some(token);
        self
    }
}

/// Receives one call per finished file, synchronously, on the run's thread.
pub trait ProgressObserver {
    /// `index` is 0-based; `total` is the number of media files found.
    fn on_file(&self, path: &Path, index: usize, total: usize);
}

impl<F> ProgressObserver for F
where
    F: Fn(&Path, usize, usize),
{
    fn on_file(&self, path: &Path, index: usize, total: usize) {
        self(path, index, total)
    }
}

/// Observer that ignores progress.
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_file(&self, _path: &Path, _index: usize, _total: usize) {}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStatistics {
    pub processed: u64,
    pub copied_dated: u64,
    pub copied_unknown: u64,
    /// Destination already held a file of the same name and size, or (under
    /// `CollisionPolicy::Skip`) a different file of the same name
    pub skipped: u64,
    pub failed: u64,
    /// Subset of `skipped` where the sizes differed
    pub name_collisions: u64,
}

impl RunStatistics {
    fn record(&mut self, result: &Result<FileReport, FileError>) {
        let Ok(file) = result else {
            self.failed += 1;
            return;
        };
        match file.outcome {
            ArchiveOutcome::Copied { .. } if file.resolution.trusted => self.copied_dated += 1,
            ArchiveOutcome::Copied { .. } => self.copied_unknown += 1,
            ArchiveOutcome::Duplicate { .. } => self.skipped += 1,
            ArchiveOutcome::Collision { .. } => {
                self.skipped += 1;
                self.name_collisions += 1;
            }
        }
    }
}

/// The resolved date of one file and what archiving it did.
#[derive(Debug, Clone)]
struct FileReport {
    resolution: Resolution,
    outcome: ArchiveOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub stats: RunStatistics,
    /// Stopped early through the cancellation token
    pub cancelled: bool,
    /// Media files found by enumeration
    pub total: u64,
}

/// Create the output root. Failure here aborts the run.
pub fn prepare_output_root(output_root: &Path) -> Result<PathBuf, OrganizeError> {
    let err = |source| OrganizeError::CreateOutputRoot {
        path: output_root.to_path_buf(),
        source,
    };
    fs::create_dir_all(output_root).map_err(err)?;
    fs::canonicalize(output_root).map_err(err)
}

fn check_input_root(input_root: &Path) -> Result<PathBuf, OrganizeError> {
    if !input_root.exists() {
        return Err(OrganizeError::InputNotFound {
            path: input_root.to_path_buf(),
        });
    }
    if !input_root.is_dir() {
        return Err(OrganizeError::InputNotDirectory {
            path: input_root.to_path_buf(),
        });
    }
    fs::canonicalize(input_root).map_err(|source| OrganizeError::ReadInput {
        path: input_root.to_path_buf(),
        source,
    })
}

/// Resolve then archive one file.
fn process_file(
    path: &Path,
    sidecars: &SidecarIndex,
    output_root: &Path,
    options: &OrganizeOptions,
    window: &PlausibilityWindow,
    log: &dyn LogSink,
) -> Result<FileReport, FileError> {
    let media = MediaFile::open(path)?;
    log.debug(&format!("Processing '{}' ({} bytes)", media.path.display(), media.size));
    let sidecar = sidecars.locate(&media.path);
    if let Some(found) = &sidecar {
        log.debug(&format!("Sidecar for '{}': '{}'", media.filename, found.display()));
    }
    let resolution = date::resolve(&media, sidecar.as_deref(), window, log)?;
    let outcome = writer::archive(&media, &resolution, output_root, options.collision, log)?;
    Ok(FileReport { resolution, outcome })
}

/// Organize the whole input tree into the output tree.
pub fn organize(
    options: &OrganizeOptions,
    log: &dyn LogSink,
    progress: &dyn ProgressObserver,
) -> Result<RunReport, OrganizeError> {
    organize_with_control(options, &RunControl::default(), log, progress)
}

/// Organize with cancellation support. Files are processed strictly one at a
/// time; a cancelled run returns the statistics gathered so far.
pub fn organize_with_control(
    options: &OrganizeOptions,
    control: &RunControl,
    log: &dyn LogSink,
    progress: &dyn ProgressObserver,
) -> Result<RunReport, OrganizeError> {
    let input_root = check_input_root(&options.input_root)?;
    let output_root = prepare_output_root(&options.output_root)?;
    let output_tree = OutputTree::new(&input_root, &output_root);
    match &output_tree {
        OutputTree::Separate => {}
        OutputTree::Nested(dir) => log.info(&format!(
            "Output folder '{}' is inside the input folder; it will not be scanned",
            dir.display()
        )),
        OutputTree::Shared(dir) => log.info(&format!(
            "Output folder '{}' is the input folder; its year and {} folders will not be scanned",
            dir.display(),
            writer::DATE_UNKNOWN_DIR
        )),
    }

    let files = scan::collect_media(&input_root, &output_tree, log)?;
    let sidecars = SidecarIndex::build(&input_root, &output_tree);
    let total = files.len();
    log.info(&format!(
        "Found {} media file(s) and {} sidecar name(s) under '{}'",
        total,
        sidecars.len(),
        input_root.display()
    ));

    let window = PlausibilityWindow::default();
    let mut stats = RunStatistics::default();
    let mut cancelled = false;

    for (index, path) in files.iter().enumerate() {
        if let Some(token) = &control.cancel_token {
            if token.is_cancelled() {
                log.warn(&format!("Cancelled after {} of {} file(s)", index, total));
                cancelled = true;
                break;
            }
        }

        stats.processed += 1;
        let result = process_file(path, &sidecars, &output_root, options, &window, log);
        if let Err(e) = &result {
            log.error(&e.to_string());
        }
        stats.record(&result);
        progress.on_file(path, index, total);
    }

    log.info(&format!(
        "Done: {} processed, {} to dated folders, {} to {}, {} skipped, {} failed",
        stats.processed,
        stats.copied_dated,
        stats.copied_unknown,
        writer::DATE_UNKNOWN_DIR,
        stats.skipped,
        stats.failed
    ));

    Ok(RunReport {
        stats,
        cancelled,
        total: total as u64,
    })
}
