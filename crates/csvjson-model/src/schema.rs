//! Table schemas: column order, logical type, and required-ness.
//!
//! A [`SchemaCatalog`] is built once from the declarative description and is
//! read-only afterwards. Every component borrows it; nothing mutates it.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};

/// Declared logical type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalType {
    #[serde(rename = "int64")]
    Integer64,
    #[serde(rename = "float64")]
    Float64,
    #[serde(rename = "string")]
    String,
}

impl LogicalType {
    /// Canonical name as written in schema files and output metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalType::Integer64 => "int64",
            LogicalType::Float64 => "float64",
            LogicalType::String => "string",
        }
    }

    /// Returns true for Integer64 and Float64.
    pub fn is_numeric(&self) -> bool {
        matches!(self, LogicalType::Integer64 | LogicalType::Float64)
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogicalType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "int64" | "integer" | "int" => Ok(LogicalType::Integer64),
            "float64" | "float" | "double" => Ok(LogicalType::Float64),
            "string" | "str" | "text" => Ok(LogicalType::String),
            _ => Err(format!("Unknown logical type: {}", s)),
        }
    }
}

/// One declared column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub logical_type: LogicalType,
    pub required: bool,
    /// 1-based output position.
    pub position: u32,
}

impl ColumnSpec {
    pub fn new(
        name: impl Into<String>,
        logical_type: LogicalType,
        required: bool,
        position: u32,
    ) -> Self {
        Self {
            name: name.into(),
            logical_type,
            required,
            position,
        }
    }
}

/// Ordered columns of one named table.
///
/// Construction validates names and positions; columns are kept sorted by
/// position so [`TableSchema::columns_in_order`] never re-sorts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    name: String,
    columns: Vec<ColumnSpec>,
}

impl TableSchema {
    /// Build a table schema, rejecting empty tables, duplicate names, and
    /// positions that are duplicated or not contiguous from 1.
    pub fn new(name: impl Into<String>, mut columns: Vec<ColumnSpec>) -> Result<Self> {
        let name = name.into();
        if columns.is_empty() {
            return Err(SchemaError::EmptyTable { table: name });
        }

        let mut seen = BTreeSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(SchemaError::DuplicateColumn {
                    table: name,
                    column: column.name.clone(),
                });
            }
        }

        columns.sort_by_key(|column| column.position);
        for (idx, column) in columns.iter().enumerate() {
            if idx > 0 && columns[idx - 1].position == column.position {
                return Err(SchemaError::DuplicatePosition {
                    table: name,
                    position: column.position,
                    first: columns[idx - 1].name.clone(),
                    second: column.name.clone(),
                });
            }
            let expected = idx as u32 + 1;
            if column.position != expected {
                return Err(SchemaError::PositionGap {
                    table: name,
                    column: column.name.clone(),
                    expected,
                    found: column.position,
                });
            }
        }

        Ok(Self { name, columns })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns sorted by ascending position.
    pub fn columns_in_order(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    pub fn required_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter().filter(|column| column.required)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Declarative description of a column as written in a schema file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub declared_type: String,
    #[serde(default)]
    pub required: bool,
    pub position: u32,
}

/// Declarative description of a table as written in a schema file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDefinition {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnDefinition>,
}

impl TableDefinition {
    fn into_schema(self) -> Result<TableSchema> {
        let mut columns = Vec::with_capacity(self.columns.len());
        for column in self.columns {
            let logical_type = column.declared_type.parse::<LogicalType>().map_err(|_| {
                SchemaError::UnknownType {
                    table: self.name.clone(),
                    column: column.name.clone(),
                    declared: column.declared_type.clone(),
                }
            })?;
            columns.push(ColumnSpec::new(
                column.name,
                logical_type,
                column.required,
                column.position,
            ));
        }
        TableSchema::new(self.name, columns)
    }
}

/// Every table schema of a run, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SchemaCatalog {
    tables: Vec<TableSchema>,
}

impl SchemaCatalog {
    /// Build a catalog from already-validated table schemas.
    pub fn new(tables: Vec<TableSchema>) -> Result<Self> {
        if tables.is_empty() {
            return Err(SchemaError::NoTables);
        }
        let mut seen = BTreeSet::new();
        for table in &tables {
            if !seen.insert(table.name()) {
                return Err(SchemaError::DuplicateTable {
                    table: table.name().to_string(),
                });
            }
        }
        Ok(Self { tables })
    }

    /// Validate declarative definitions and build the catalog.
    pub fn from_definitions(definitions: Vec<TableDefinition>) -> Result<Self> {
        let tables = definitions
            .into_iter()
            .map(TableDefinition::into_schema)
            .collect::<Result<Vec<_>>>()?;
        Self::new(tables)
    }

    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|table| table.name() == name)
    }

    /// Table names in declaration order.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(TableSchema::name).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TableSchema> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
