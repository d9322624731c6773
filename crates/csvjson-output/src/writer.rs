//! Writing output documents to disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{OutputError, Result};
use crate::mapper::{CombinedDocument, OutputDocument};

/// Outcome of one written file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteStats {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub record_count: usize,
    pub duration: Duration,
}

/// Write one table document as UTF-8 JSON.
pub fn write_table_json(document: &OutputDocument, path: &Path, pretty: bool) -> Result<WriteStats> {
    write_json(document, path, pretty, document.record_count())
}

/// Write the combined document as UTF-8 JSON.
pub fn write_combined_json(
    document: &CombinedDocument,
    path: &Path,
    pretty: bool,
) -> Result<WriteStats> {
    write_json(document, path, pretty, document.record_count())
}

/// Re-read a written file and check it parses as a JSON object.
pub fn verify_output_file(path: &Path) -> Result<()> {
    let bytes = fs::read(path).map_err(|err| OutputError::Verify {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    let value: serde_json::Value =
        serde_json::from_slice(&bytes).map_err(|err| OutputError::Verify {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
    if !value.is_object() {
        return Err(OutputError::Verify {
            path: path.to_path_buf(),
            reason: "root is not a JSON object".to_string(),
        });
    }
    debug!(path = %path.display(), "output file verified");
    Ok(())
}

fn write_json<T: Serialize>(
    value: &T,
    path: &Path,
    pretty: bool,
    record_count: usize,
) -> Result<WriteStats> {
    let started = Instant::now();
    ensure_parent_dir(path)?;

    let encoded = if pretty {
        serde_json::to_vec_pretty(value)
    } else {
        serde_json::to_vec(value)
    };
    let bytes = encoded.map_err(|source| OutputError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, &bytes).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    let stats = WriteStats {
        path: path.to_path_buf(),
        size_bytes: bytes.len() as u64,
        record_count,
        duration: started.elapsed(),
    };
    info!(
        path = %path.display(),
        size_bytes = stats.size_bytes,
        record_count,
        "wrote JSON document"
    );
    Ok(stats)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| OutputError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}
