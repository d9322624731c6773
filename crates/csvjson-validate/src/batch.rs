//! Multi-table runs with optional per-table worker threads.

use std::collections::BTreeMap;
use std::thread;

use csvjson_model::{ConfigurationError, RawRow};
use tracing::{debug, error};

use crate::engine::{TableOutcome, ValidationEngine};

/// Outcome of one requested table.
pub type TableResult = Result<TableOutcome, ConfigurationError>;

/// Process `tables` in the given order.
///
/// With `parallel` set each table runs on its own scoped thread; results are
/// still returned in the order of `tables`, independent of completion order.
/// A table missing from the schema or from `inputs` yields a
/// [`ConfigurationError`] without affecting the others.
pub fn process_tables(
    engine: &ValidationEngine<'_>,
    tables: &[String],
    inputs: &BTreeMap<String, Vec<RawRow>>,
    parallel: bool,
) -> Vec<(String, TableResult)> {
    debug!(table_count = tables.len(), parallel, "processing tables");
    let results: Vec<TableResult> = if parallel && tables.len() > 1 {
        thread::scope(|scope| {
            let handles: Vec<_> = tables
                .iter()
                .map(|table| scope.spawn(move || process_one(engine, table, inputs)))
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect()
        })
    } else {
        tables
            .iter()
            .map(|table| process_one(engine, table, inputs))
            .collect()
    };

    tables.iter().cloned().zip(results).collect()
}

fn process_one(
    engine: &ValidationEngine<'_>,
    table: &str,
    inputs: &BTreeMap<String, Vec<RawRow>>,
) -> TableResult {
    if engine.schema().table(table).is_none() {
        let err = ConfigurationError::UnknownTable {
            table: table.to_string(),
        };
        error!(table = %table, %err, "table skipped");
        return Err(err);
    }
    let Some(raw_rows) = inputs.get(table) else {
        let err = ConfigurationError::MissingInput {
            table: table.to_string(),
        };
        error!(table = %table, %err, "table skipped");
        return Err(err);
    };
    engine.process_table(table, raw_rows)
}
