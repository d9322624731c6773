//! Core data model for schema-driven tabular-to-JSON conversion.
//!
//! - [`SchemaCatalog`] / [`TableSchema`] / [`ColumnSpec`]: the declared tables
//! - [`RawRow`] / [`TypedRow`] / [`TypedValue`]: rows before and after coercion
//! - [`TableQualityReport`] / [`QualityIssue`]: findings of one table pass

pub mod error;
pub mod quality;
pub mod schema;
pub mod value;

pub use error::{ConfigurationError, Result, SchemaError};
pub use quality::{
    IssueKind, QualityIssue, QualityWarning, SCORE_PRECISION, TableQualityReport, WarningKind,
    round_score,
};
pub use schema::{
    ColumnDefinition, ColumnSpec, LogicalType, SchemaCatalog, TableDefinition, TableSchema,
};
pub use value::{RawRow, TypedRow, TypedValue};
