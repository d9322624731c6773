//! Schema-driven validation and type coercion.
//!
//! [`ValidationEngine::process_table`] turns raw textual rows into typed rows
//! plus a [`TableQualityReport`](csvjson_model::TableQualityReport). Bad
//! fields become `Null` and are recorded as issues; no row is ever dropped.

mod batch;
mod checks;
mod coerce;
mod engine;
mod summary;

pub use batch::{TableResult, process_tables};
pub use coerce::{coerce, parse_float, parse_integer};
pub use engine::{EngineOptions, REDACTED_VALUE, TableOutcome, ValidationEngine, resolve_field};
pub use summary::RunSummary;
