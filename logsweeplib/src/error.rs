//! Error types for logsweeplib

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while sweeping a source tree
#[derive(Error, Debug)]
pub enum SweepError {
    /// A directory or file could not be listed or opened
    #[error("cannot read '{path}': {source}")]
    PathUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// File contents are not valid UTF-8 text
    #[error("'{path}' is not a text file: {message}")]
    Decode { path: PathBuf, message: String },

    /// Writing the transformed text back failed
    #[error("failed to write '{path}': {source}")]
    WriteFailure {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Unknown mode name
    #[error("invalid mode '{0}' (expected one of: disable, restore, delete-all, delete-active, delete-commented)")]
    InvalidMode(String),

    /// Target is not a dotted identifier path such as `console.log`
    #[error("invalid target '{0}': expected a dotted identifier such as console.log")]
    InvalidTarget(String),

    /// Invalid glob pattern
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    /// Path does not exist
    #[error("path does not exist: {0}")]
    PathNotFound(PathBuf),

    /// Worker pool could not be created
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),

    /// CSV serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
