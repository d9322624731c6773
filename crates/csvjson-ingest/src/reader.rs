//! Delimited text files to raw rows.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use csvjson_model::{RawRow, TableSchema};

use crate::error::{IngestError, Result};

/// Prefix of keys given to fields beyond the known columns.
pub const EXTRA_FIELD_PREFIX: &str = "_extra_";

/// How a table file is laid out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderOptions {
    pub delimiter: u8,
    /// The first non-blank record names the columns.
    pub has_header: bool,
    /// Cell contents treated as absent.
    pub null_values: Vec<String>,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: false,
            null_values: vec!["NULL".to_string(), "null".to_string(), "None".to_string()],
        }
    }
}

impl ReaderOptions {
    fn is_null(&self, cell: &str) -> bool {
        let cell = cell.trim();
        self.null_values.iter().any(|marker| marker == cell)
    }
}

/// Read every record of a table file in file order.
///
/// Without a header, fields map to the schema's columns by position. Cells
/// matching a null marker are left out of the row; empty cells are kept.
/// Fields past the known columns are stored under `_extra_<n>` keys.
pub fn read_table_rows(
    path: &Path,
    schema: &TableSchema,
    options: &ReaderOptions,
) -> Result<Vec<RawRow>> {
    let file = File::open(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    let rows = read_rows(file, path, schema, options)?;
    debug!(
        path = %path.display(),
        table = %schema.name(),
        rows = rows.len(),
        "table file read"
    );
    Ok(rows)
}

fn read_rows<R: Read>(
    source: R,
    path: &Path,
    schema: &TableSchema,
    options: &ReaderOptions,
) -> Result<Vec<RawRow>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(source);

    let mut column_names: Option<Vec<String>> = if options.has_header {
        None
    } else {
        Some(schema.column_names().into_iter().map(str::to_string).collect())
    };
    let mut rows = Vec::new();

    for record in reader.records() {
        let record = record.map_err(|source| IngestError::CsvParse {
            path: path.to_path_buf(),
            source,
        })?;
        if is_blank_line(&record) {
            continue;
        }
        let Some(names) = column_names.as_ref() else {
            column_names = Some(record.iter().map(normalize_header).collect());
            continue;
        };
        rows.push(to_raw_row(&record, names, options));
    }
    Ok(rows)
}

fn to_raw_row(record: &StringRecord, names: &[String], options: &ReaderOptions) -> RawRow {
    let mut row = RawRow::new();
    for (index, cell) in record.iter().enumerate() {
        let cell = normalize_cell(cell);
        if options.is_null(cell) {
            continue;
        }
        match names.get(index).filter(|name| !name.is_empty()) {
            Some(name) => row.insert(name.as_str(), cell),
            None => row.insert(format!("{EXTRA_FIELD_PREFIX}{}", index + 1), cell),
        }
    }
    row
}

fn is_blank_line(record: &StringRecord) -> bool {
    record.len() <= 1 && record.iter().all(|cell| normalize_cell(cell).trim().is_empty())
}

fn normalize_header(raw: &str) -> String {
    normalize_cell(raw)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn normalize_cell(raw: &str) -> &str {
    raw.trim_matches('\u{feff}')
}
