//! Error types for configuration loading and file ingestion.

use std::path::PathBuf;

use csvjson_model::SchemaError;
use thiserror::Error;

/// Errors that can occur while loading configuration or reading input files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IngestError {
    // === File System Errors ===
    /// Input or configuration file not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Parsing Errors ===
    /// Malformed delimited record.
    #[error("failed to parse CSV {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Malformed TOML document.
    #[error("failed to parse TOML {origin}: {source}")]
    Toml {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    // === Configuration Errors ===
    /// A setting holds a value that cannot be used.
    #[error("invalid setting {key}: {message}")]
    InvalidSetting { key: String, message: String },

    /// The schema definition is malformed.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
