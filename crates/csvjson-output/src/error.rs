//! Error types for JSON document output.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while writing or verifying output documents.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OutputError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize document for {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("output file {path} failed verification: {reason}")]
    Verify { path: PathBuf, reason: String },
}

impl OutputError {
    /// Path of the file or directory involved.
    pub fn path(&self) -> &Path {
        match self {
            OutputError::CreateDir { path, .. }
            | OutputError::Write { path, .. }
            | OutputError::Serialize { path, .. }
            | OutputError::Verify { path, .. } => path.as_path(),
        }
    }
}

/// Result type for output operations.
pub type Result<T> = std::result::Result<T, OutputError>;
