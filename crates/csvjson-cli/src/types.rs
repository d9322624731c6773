//! Results of a conversion run, as consumed by the summary printer.

use std::path::PathBuf;
use std::time::Duration;

use csvjson_model::TableQualityReport;
use csvjson_validate::RunSummary;

#[derive(Debug)]
pub struct RunResult {
    pub output_dir: PathBuf,
    /// One entry per requested table, in schema-declared order.
    pub tables: Vec<TableSummary>,
    /// Combined document path, when written.
    pub combined: Option<PathBuf>,
    pub summary: RunSummary,
    /// Table-independent failures, e.g. the combined file could not be written.
    pub errors: Vec<String>,
    pub dry_run: bool,
    pub duration: Duration,
}

impl RunResult {
    /// True when a requested table produced no document or a write failed.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty() || self.tables.iter().any(|table| table.error.is_some())
    }

    pub fn failed_tables(&self) -> impl Iterator<Item = &TableSummary> {
        self.tables.iter().filter(|table| table.error.is_some())
    }
}

#[derive(Debug)]
pub struct TableSummary {
    pub table: String,
    pub records: usize,
    /// Present when the table produced a document.
    pub report: Option<TableQualityReport>,
    /// Individual document path, when written.
    pub output: Option<PathBuf>,
    pub error: Option<String>,
}

impl TableSummary {
    pub fn failed(table: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            records: 0,
            report: None,
            output: None,
            error: Some(error.into()),
        }
    }
}
