//! Error types for schema construction and table lookup.

use thiserror::Error;

/// A malformed schema definition. Fatal to the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SchemaError {
    /// The schema declares no tables at all.
    #[error("schema declares no tables")]
    NoTables,

    /// A table name was declared more than once.
    #[error("table '{table}' is declared more than once")]
    DuplicateTable { table: String },

    /// A table has zero columns.
    #[error("table '{table}' has no columns")]
    EmptyTable { table: String },

    /// A column name appears twice within one table.
    #[error("table '{table}': column '{column}' is declared more than once")]
    DuplicateColumn { table: String, column: String },

    /// Two columns share the same position.
    #[error("table '{table}': position {position} is used by '{first}' and '{second}'")]
    DuplicatePosition {
        table: String,
        position: u32,
        first: String,
        second: String,
    },

    /// Positions are not contiguous starting at 1.
    #[error("table '{table}': expected position {expected}, found {found} on column '{column}'")]
    PositionGap {
        table: String,
        column: String,
        expected: u32,
        found: u32,
    },

    /// The declared logical type is not one of int64, float64, string.
    #[error("table '{table}': column '{column}' has unknown type '{declared}'")]
    UnknownType {
        table: String,
        column: String,
        declared: String,
    },
}

/// A table requested for processing that the schema (or the raw input) does not know.
///
/// Fatal to that table only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// No schema was declared for the table.
    #[error("no schema declared for table '{table}'")]
    UnknownTable { table: String },

    /// The schema declares the table but no raw rows were supplied for it.
    #[error("no input rows supplied for table '{table}'")]
    MissingInput { table: String },
}

impl ConfigurationError {
    /// Name of the table this error belongs to.
    pub fn table(&self) -> &str {
        match self {
            Self::UnknownTable { table } | Self::MissingInput { table } => table,
        }
    }
}

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
