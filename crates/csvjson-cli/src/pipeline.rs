//! Conversion pipeline with explicit stages.
//!
//! The pipeline follows these stages in order:
//! 1. **Load**: Read settings and schemas from the config directory
//! 2. **Read**: Read the raw rows of every requested table
//! 3. **Validate**: Coerce rows against their schema and collect quality reports
//! 4. **Map**: Build the per-table output documents
//! 5. **Output**: Write and verify the individual and combined JSON files
//!
//! A table that cannot be read, or that the schema does not declare, is
//! reported and skipped; the remaining tables continue.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, error, info, info_span, warn};

use csvjson_ingest::{
    SCHEMAS_FILE, SETTINGS_FILE, Settings, load_schema_file, load_settings, read_table_rows,
    table_input_path,
};
use csvjson_model::{RawRow, SchemaCatalog};
use csvjson_output::{
    OutputDocument, WriteStats, to_combined_document, to_output_document, verify_output_file,
    write_combined_json, write_table_json,
};
use csvjson_validate::{
    EngineOptions, RunSummary, TableOutcome, TableResult, ValidationEngine, process_tables,
};

use crate::types::{RunResult, TableSummary};

// ============================================================================
// Stage 1: Load
// ============================================================================

/// Settings and schemas of one run.
#[derive(Debug)]
pub struct LoadedConfig {
    pub settings: Settings,
    pub catalog: SchemaCatalog,
}

/// Load `settings.toml` (optional) and `schemas.toml` from `config_dir`.
pub fn load_config(config_dir: &Path) -> Result<LoadedConfig> {
    let settings_path = config_dir.join(SETTINGS_FILE);
    let settings = if settings_path.is_file() {
        load_settings(&settings_path)
            .with_context(|| format!("load settings {}", settings_path.display()))?
    } else {
        info!(path = %settings_path.display(), "no settings file, using defaults");
        Settings::default()
    };
    let schemas_path = config_dir.join(SCHEMAS_FILE);
    let catalog = load_schema_file(&schemas_path)
        .with_context(|| format!("load schemas {}", schemas_path.display()))?;
    Ok(LoadedConfig { settings, catalog })
}

/// Command-line adjustments applied on top of the settings file.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub no_validate: bool,
    pub parallel: bool,
    pub no_individual: bool,
    pub no_combined: bool,
    pub dry_run: bool,
    /// Restrict the run to these tables.
    pub tables: Option<Vec<String>>,
    /// Allow raw cell values in debug logs.
    pub log_values: bool,
}

impl RunOverrides {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(dir) = &self.input_dir {
            settings.input.base_path = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            settings.output.base_path = dir.clone();
        }
        if self.no_validate {
            settings.processing.validate_data = false;
        }
        if self.parallel {
            settings.processing.parallel = true;
        }
        if self.no_individual {
            settings.output.individual_files = false;
        }
        if self.no_combined {
            settings.output.combined_file = false;
        }
    }
}

/// Tables to process: declared tables in declaration order, then any
/// requested names the schema does not know.
pub fn requested_tables(catalog: &SchemaCatalog, only: Option<&[String]>) -> Vec<String> {
    let Some(only) = only else {
        return catalog
            .table_names()
            .into_iter()
            .map(str::to_string)
            .collect();
    };
    let wanted: BTreeSet<&str> = only.iter().map(|name| name.trim()).collect();
    let mut tables: Vec<String> = catalog
        .table_names()
        .into_iter()
        .filter(|name| wanted.contains(name))
        .map(str::to_string)
        .collect();
    let mut unknown = BTreeSet::new();
    for name in only.iter().map(|name| name.trim()) {
        if catalog.table(name).is_none() && unknown.insert(name) {
            tables.push(name.to_string());
        }
    }
    tables
}

// ============================================================================
// Stage 2: Read
// ============================================================================

/// Result of the read stage.
#[derive(Debug, Default)]
pub struct ReadResult {
    /// Raw rows by table.
    pub inputs: BTreeMap<String, Vec<RawRow>>,
    /// Read failures by table.
    pub errors: BTreeMap<String, String>,
}

/// Read every declared table among `tables`.
pub fn read_inputs(
    settings: &Settings,
    catalog: &SchemaCatalog,
    tables: &[String],
) -> Result<ReadResult> {
    let options = settings.reader_options().context("input settings")?;
    let mut result = ReadResult::default();
    for table in tables {
        let Some(schema) = catalog.table(table) else {
            continue;
        };
        let path = table_input_path(settings, table);
        match read_table_rows(&path, schema, &options) {
            Ok(rows) => {
                debug!(table = %table, rows = rows.len(), "table read");
                result.inputs.insert(table.clone(), rows);
            }
            Err(err) => {
                error!(table = %table, error = %err, "failed to read table");
                result.errors.insert(table.clone(), err.to_string());
            }
        }
    }
    Ok(result)
}

// ============================================================================
// Stage 3: Validate
// ============================================================================

/// Coerce every table, returning results in the order of `tables`.
pub fn validate(
    catalog: &SchemaCatalog,
    options: EngineOptions,
    tables: &[String],
    inputs: &BTreeMap<String, Vec<RawRow>>,
    parallel: bool,
) -> Vec<(String, TableResult)> {
    let engine = ValidationEngine::new(catalog, options);
    process_tables(&engine, tables, inputs, parallel)
}

// ============================================================================
// Stage 4: Map
// ============================================================================

/// Build the output document of one coerced table.
pub fn map_document(
    catalog: &SchemaCatalog,
    outcome: TableOutcome,
    generated_at: DateTime<Utc>,
) -> Option<OutputDocument> {
    let schema = catalog.table(&outcome.table)?;
    Some(to_output_document(
        &outcome.table,
        outcome.rows,
        schema,
        outcome.report,
        generated_at,
    ))
}

// ============================================================================
// Stage 5: Output
// ============================================================================

/// Result of the output stage.
#[derive(Debug, Default)]
pub struct OutputResult {
    /// Individual document paths by table.
    pub table_files: BTreeMap<String, PathBuf>,
    pub combined: Option<PathBuf>,
    pub errors: Vec<String>,
}

/// Write the enabled documents and verify each written file.
pub fn write_outputs(settings: &Settings, documents: Vec<(String, OutputDocument)>) -> OutputResult {
    let mut result = OutputResult::default();
    let pretty = settings.output.pretty;

    if settings.output.individual_files {
        for (table, document) in &documents {
            let path = settings.table_output_path(table);
            match write_table_json(document, &path, pretty).and_then(verified) {
                Ok(stats) => {
                    result.table_files.insert(table.clone(), stats.path);
                }
                Err(err) => {
                    error!(table = %table, error = %err, "failed to write table document");
                    result.errors.push(format!("{table}: {err}"));
                }
            }
        }
    }

    if settings.output.combined_file {
        if documents.is_empty() {
            warn!("no table documents, combined document skipped");
            return result;
        }
        let combined = to_combined_document(documents);
        let path = settings.combined_output_path();
        match write_combined_json(&combined, &path, pretty).and_then(verified) {
            Ok(stats) => result.combined = Some(stats.path),
            Err(err) => {
                error!(error = %err, "failed to write combined document");
                result.errors.push(format!("combined document: {err}"));
            }
        }
    }
    result
}

fn verified(stats: WriteStats) -> csvjson_output::Result<WriteStats> {
    verify_output_file(&stats.path)?;
    Ok(stats)
}

// ============================================================================
// Run
// ============================================================================

/// Run every stage for the tables configured in `config_dir`.
///
/// Fails only when configuration cannot be loaded; per-table failures are
/// reported in the returned [`RunResult`].
pub fn run_conversion(config_dir: &Path, overrides: &RunOverrides) -> Result<RunResult> {
    let started = Instant::now();
    let run_span = info_span!("convert", config_dir = %config_dir.display());
    let _run_guard = run_span.enter();

    let LoadedConfig {
        mut settings,
        catalog,
    } = load_config(config_dir)?;
    overrides.apply(&mut settings);
    let tables = requested_tables(&catalog, overrides.tables.as_deref());
    info!(
        table_count = tables.len(),
        validate_data = settings.processing.validate_data,
        parallel = settings.processing.parallel,
        "configuration loaded"
    );

    let read_start = Instant::now();
    let ReadResult {
        inputs,
        errors: read_errors,
    } = info_span!("read").in_scope(|| read_inputs(&settings, &catalog, &tables))?;
    info!(
        tables_read = inputs.len(),
        duration_ms = read_start.elapsed().as_millis(),
        "read complete"
    );

    let validate_start = Instant::now();
    let options = EngineOptions {
        validate_data: settings.processing.validate_data,
        log_values: overrides.log_values,
    };
    let results = validate(
        &catalog,
        options,
        &tables,
        &inputs,
        settings.processing.parallel,
    );
    info!(
        duration_ms = validate_start.elapsed().as_millis(),
        "validation complete"
    );

    let generated_at = Utc::now();
    let mut summaries = Vec::with_capacity(results.len());
    let mut documents = Vec::new();
    for (table, result) in results {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                let message = read_errors
                    .get(&table)
                    .cloned()
                    .unwrap_or_else(|| err.to_string());
                summaries.push(TableSummary::failed(table, message));
                continue;
            }
        };
        let Some(document) = map_document(&catalog, outcome, generated_at) else {
            summaries.push(TableSummary::failed(
                table.as_str(),
                format!("no schema declared for table '{table}'"),
            ));
            continue;
        };
        summaries.push(TableSummary {
            table: table.clone(),
            records: document.record_count(),
            report: Some(document.report().clone()),
            output: None,
            error: None,
        });
        documents.push((table, document));
    }

    let mut combined = None;
    let mut errors = Vec::new();
    if overrides.dry_run {
        info!("dry run, no files written");
    } else {
        let output_start = Instant::now();
        let mut output = info_span!("output").in_scope(|| write_outputs(&settings, documents));
        for summary in &mut summaries {
            summary.output = output.table_files.remove(&summary.table);
        }
        combined = output.combined;
        errors = output.errors;
        info!(
            duration_ms = output_start.elapsed().as_millis(),
            "output complete"
        );
    }

    let summary = RunSummary::from_reports(summaries.iter().filter_map(|s| s.report.as_ref()));
    let failed = summaries.iter().filter(|s| s.error.is_some()).count();
    info!(
        tables = summaries.len(),
        failed,
        total_rows = summary.total_rows,
        quality_score = summary.overall_quality_score,
        duration_ms = started.elapsed().as_millis(),
        "conversion complete"
    );

    Ok(RunResult {
        output_dir: settings.output.base_path.clone(),
        tables: summaries,
        combined,
        summary,
        errors,
        dry_run: overrides.dry_run,
        duration: started.elapsed(),
    })
}
