use std::path::PathBuf;

use thiserror::Error;

/// Conditions that abort the whole run before (or instead of) processing files.
#[derive(Error, Debug)]
pub enum OrganizeError {
    #[error("Input folder not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Input path is not a folder: {path}")]
    InputNotDirectory { path: PathBuf },

    #[error("Failed to create output folder {path}: {source}")]
    CreateOutputRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to list input folder {path}: {source}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures that abandon a single file; the run continues with the next one.
#[derive(Error, Debug)]
pub enum FileError {
    #[error("Failed to read modification time of {path}: {source}")]
    ModifiedTime {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read metadata of {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create folder {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy {from} -> {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
