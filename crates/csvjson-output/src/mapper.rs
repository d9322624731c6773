//! Mapping of typed rows onto the canonical JSON document shape.
//!
//! A table document is `{"metadata": {...}, "data": [...]}` with every
//! record carrying every declared column in position order. The combined
//! document holds one table document per key, in the order supplied.

use std::cmp::Ordering;

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::Serialize;
use tracing::warn;

use csvjson_model::{
    ColumnSpec, IssueKind, LogicalType, QualityIssue, TableQualityReport, TableSchema, TypedRow,
    TypedValue,
};

/// Decimal places kept for column means.
const MEAN_PRECISION: i32 = 4;

/// One table's output document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputDocument {
    pub metadata: DocumentMetadata,
    pub data: Vec<TypedRow>,
    /// Quality report including defects found while mapping.
    #[serde(skip)]
    report: TableQualityReport,
}

impl OutputDocument {
    pub fn report(&self) -> &TableQualityReport {
        &self.report
    }

    pub fn table_name(&self) -> &str {
        &self.metadata.table_name
    }

    pub fn record_count(&self) -> usize {
        self.data.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentMetadata {
    pub table_name: String,
    pub record_count: usize,
    pub column_count: usize,
    /// Column names in position order.
    pub columns: Vec<String>,
    /// RFC 3339, UTC, second precision.
    pub generated_at: String,
    pub data_types: IndexMap<String, LogicalType>,
    pub statistics: DocumentStatistics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentStatistics {
    pub quality_score: f64,
    pub issue_count: usize,
    pub warning_count: usize,
    pub columns: IndexMap<String, ColumnStatistics>,
}

/// Per-column figures. `min`, `max` and `mean` are only set for numeric
/// columns holding at least one value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnStatistics {
    pub null_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<TypedValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<TypedValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
}

/// Every table's document under a single root, keyed by table name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CombinedDocument {
    tables: IndexMap<String, OutputDocument>,
}

impl CombinedDocument {
    pub fn get(&self, table: &str) -> Option<&OutputDocument> {
        self.tables.get(table)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OutputDocument)> {
        self.tables
            .iter()
            .map(|(table, document)| (table.as_str(), document))
    }

    /// Records across all tables.
    pub fn record_count(&self) -> usize {
        self.tables.values().map(OutputDocument::record_count).sum()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Build the output document for one table.
///
/// Non-finite floats are replaced by null and appended to the report as
/// [`IssueKind::NonFiniteNumber`].
pub fn to_output_document(
    table: &str,
    mut rows: Vec<TypedRow>,
    schema: &TableSchema,
    report: TableQualityReport,
    generated_at: DateTime<Utc>,
) -> OutputDocument {
    let non_finite = scrub_non_finite(table, &mut rows);
    let report = report.with_additional_issues(non_finite);
    let columns = schema.columns_in_order();

    let metadata = DocumentMetadata {
        table_name: table.to_string(),
        record_count: rows.len(),
        column_count: columns.len(),
        columns: columns.iter().map(|column| column.name.clone()).collect(),
        generated_at: format_timestamp(generated_at),
        data_types: columns
            .iter()
            .map(|column| (column.name.clone(), column.logical_type))
            .collect(),
        statistics: DocumentStatistics {
            quality_score: report.quality_score(),
            issue_count: report.issue_count(),
            warning_count: report.warnings().len(),
            columns: columns
                .iter()
                .map(|column| (column.name.clone(), column_statistics(column, &rows)))
                .collect(),
        },
    };

    OutputDocument {
        metadata,
        data: rows,
        report,
    }
}

/// Combine table documents in the order given.
///
/// A table supplied twice keeps its first position and its last document.
pub fn to_combined_document<I>(documents: I) -> CombinedDocument
where
    I: IntoIterator<Item = (String, OutputDocument)>,
{
    let mut tables = IndexMap::new();
    for (table, document) in documents {
        match tables.entry(table) {
            Entry::Occupied(mut slot) => {
                warn!(table = %slot.key(), "table supplied twice, earlier document replaced");
                slot.insert(document);
            }
            Entry::Vacant(slot) => {
                slot.insert(document);
            }
        }
    }
    CombinedDocument { tables }
}

/// ISO-8601 UTC timestamp with a `Z` suffix, e.g. `2024-01-15T10:30:00Z`.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn scrub_non_finite(table: &str, rows: &mut [TypedRow]) -> Vec<QualityIssue> {
    let mut issues = Vec::new();
    for (row_index, row) in rows.iter_mut().enumerate() {
        for (column, value) in row.iter_mut() {
            let TypedValue::Float(number) = *value else {
                continue;
            };
            if number.is_finite() {
                continue;
            }
            warn!(
                table = %table,
                row_index,
                column = %column,
                "non-finite number written as null"
            );
            issues.push(QualityIssue {
                table: table.to_string(),
                row_index,
                column: column.to_string(),
                kind: IssueKind::NonFiniteNumber,
                raw_value: Some(number.to_string()),
            });
            *value = TypedValue::Null;
        }
    }
    issues
}

fn column_statistics(column: &ColumnSpec, rows: &[TypedRow]) -> ColumnStatistics {
    let mut stats = ColumnStatistics::default();
    let mut sum = 0.0;
    let mut count = 0usize;

    for value in rows.iter().filter_map(|row| row.get(&column.name)) {
        if value.is_null() {
            stats.null_count += 1;
            continue;
        }
        if !column.logical_type.is_numeric() {
            continue;
        }
        let Some(number) = value.as_f64() else {
            continue;
        };
        sum += number;
        count += 1;
        if replaces(value, stats.min.as_ref(), Ordering::Less) {
            stats.min = Some(value.clone());
        }
        if replaces(value, stats.max.as_ref(), Ordering::Greater) {
            stats.max = Some(value.clone());
        }
    }

    if count > 0 {
        let factor = 10f64.powi(MEAN_PRECISION);
        stats.mean = Some((sum / count as f64 * factor).round() / factor);
    }
    stats
}

/// True when `value` compares as `wanted` against the current extreme.
/// Integers compare exactly; only mixed or float pairs go through `f64`.
fn replaces(value: &TypedValue, current: Option<&TypedValue>, wanted: Ordering) -> bool {
    let Some(current) = current else {
        return true;
    };
    let ordering = match (value, current) {
        (TypedValue::Integer(a), TypedValue::Integer(b)) => Some(a.cmp(b)),
        _ => value
            .as_f64()
            .zip(current.as_f64())
            .and_then(|(a, b)| a.partial_cmp(&b)),
    };
    ordering == Some(wanted)
}
