//! Validation and coercion of one table's raw rows against its schema.

use csvjson_model::{
    ColumnSpec, ConfigurationError, IssueKind, LogicalType, QualityIssue, RawRow, SchemaCatalog,
    TableQualityReport, TableSchema, TypedRow, TypedValue,
};
use tracing::{debug, info, info_span, warn};

use crate::checks::WarningTally;
use crate::coerce::coerce;

/// Placeholder logged instead of cell contents when value logging is off.
pub const REDACTED_VALUE: &str = "[REDACTED]";

/// Engine behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// When false, every field is passed through as a trimmed string and
    /// nothing is reported.
    pub validate_data: bool,
    /// Whether raw cell values may appear in debug logs.
    pub log_values: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            validate_data: true,
            log_values: false,
        }
    }
}

/// Typed rows and findings for one table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableOutcome {
    pub table: String,
    pub rows: Vec<TypedRow>,
    pub report: TableQualityReport,
}

/// Coerces raw rows against a shared, read-only schema catalog.
#[derive(Debug, Clone, Copy)]
pub struct ValidationEngine<'a> {
    schema: &'a SchemaCatalog,
    options: EngineOptions,
}

impl<'a> ValidationEngine<'a> {
    pub fn new(schema: &'a SchemaCatalog, options: EngineOptions) -> Self {
        Self { schema, options }
    }

    pub fn schema(&self) -> &'a SchemaCatalog {
        self.schema
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    /// Coerce every row of `table`.
    ///
    /// Row count and order are preserved; every output row carries exactly
    /// the declared columns in position order. Field defects are recorded in
    /// the report, never returned as errors.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::UnknownTable`] when the catalog does not declare
    /// `table`.
    pub fn process_table(
        &self,
        table: &str,
        raw_rows: &[RawRow],
    ) -> Result<TableOutcome, ConfigurationError> {
        let schema = self
            .schema
            .table(table)
            .ok_or_else(|| ConfigurationError::UnknownTable {
                table: table.to_string(),
            })?;
        let span = info_span!("table", table = %table, rows = raw_rows.len());
        let _guard = span.enter();

        let outcome = if self.options.validate_data {
            self.coerce_rows(schema, raw_rows)
        } else {
            debug!("validation disabled, passing values through as strings");
            passthrough_rows(schema, raw_rows)
        };

        let report = &outcome.report;
        info!(
            total_rows = report.total_rows(),
            valid_rows = report.valid_rows(),
            issue_count = report.issue_count(),
            warning_count = report.warnings().len(),
            quality_score = report.quality_score(),
            "table processed"
        );
        if report.has_issues() {
            warn!(
                missing_required = report.count_of(IssueKind::MissingRequired),
                type_mismatch = report.count_of(IssueKind::TypeMismatch),
                rows_with_issues = report.rows_with_issues(),
                "table has quality issues"
            );
        }
        Ok(outcome)
    }

    fn coerce_rows(&self, schema: &TableSchema, raw_rows: &[RawRow]) -> TableOutcome {
        let columns = schema.columns_in_order();
        let mut rows = Vec::with_capacity(raw_rows.len());
        let mut issues = Vec::new();
        let mut rows_with_issues = 0usize;
        let mut tally = WarningTally::new(schema);

        for (row_index, raw) in raw_rows.iter().enumerate() {
            tally.observe_row(raw);
            let mut typed = TypedRow::with_capacity(columns.len());
            let issues_before = issues.len();

            for column in columns {
                let raw_value = raw.get(&column.name);
                let (value, kind) = resolve_field(column, raw_value);
                if let Some(kind) = kind {
                    debug!(
                        row_index,
                        column = %column.name,
                        kind = %kind,
                        raw_value = self.loggable(raw_value),
                        "field defect"
                    );
                    issues.push(QualityIssue {
                        table: schema.name().to_string(),
                        row_index,
                        column: column.name.clone(),
                        kind,
                        raw_value: raw_value.map(str::to_string),
                    });
                }
                tally.observe_value(column, &value);
                typed.push(column.name.clone(), value);
            }

            if issues.len() > issues_before {
                rows_with_issues += 1;
            }
            rows.push(typed);
        }

        let report = TableQualityReport::new(
            schema.name(),
            raw_rows.len(),
            rows_with_issues,
            issues,
            tally.finish(),
        );
        TableOutcome {
            table: schema.name().to_string(),
            rows,
            report,
        }
    }

    fn loggable<'v>(&self, value: Option<&'v str>) -> &'v str {
        match value {
            Some(value) if self.options.log_values => value,
            Some(_) => REDACTED_VALUE,
            None => "",
        }
    }
}

/// Resolve one field to its typed value and the defect it carries, if any.
///
/// A missing key is absent for every type. Blank text is absent for numeric
/// and required columns but a present, empty value for optional string
/// columns.
pub fn resolve_field(column: &ColumnSpec, raw: Option<&str>) -> (TypedValue, Option<IssueKind>) {
    let Some(text) = raw.map(str::trim) else {
        return absent(column);
    };
    match column.logical_type {
        _ if text.is_empty() && column.required => absent(column),
        LogicalType::String => (TypedValue::String(text.to_string()), None),
        _ if text.is_empty() => absent(column),
        logical_type => match coerce(text, logical_type) {
            Some(value) => (value, None),
            None => (TypedValue::Null, Some(IssueKind::TypeMismatch)),
        },
    }
}

fn absent(column: &ColumnSpec) -> (TypedValue, Option<IssueKind>) {
    let issue = column.required.then_some(IssueKind::MissingRequired);
    (TypedValue::Null, issue)
}

fn passthrough_rows(schema: &TableSchema, raw_rows: &[RawRow]) -> TableOutcome {
    let columns = schema.columns_in_order();
    let rows = raw_rows
        .iter()
        .map(|raw| {
            let mut typed = TypedRow::with_capacity(columns.len());
            for column in columns {
                let value = match raw.get(&column.name) {
                    Some(text) => TypedValue::String(text.trim().to_string()),
                    None => TypedValue::Null,
                };
                typed.push(column.name.clone(), value);
            }
            typed
        })
        .collect();
    TableOutcome {
        table: schema.name().to_string(),
        rows,
        report: TableQualityReport::clean(schema.name(), raw_rows.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(logical_type: LogicalType, required: bool) -> ColumnSpec {
        ColumnSpec::new("c", logical_type, required, 1)
    }

    #[test]
    fn absent_required_is_missing() {
        let (value, issue) = resolve_field(&column(LogicalType::Integer64, true), None);
        assert_eq!(value, TypedValue::Null);
        assert_eq!(issue, Some(IssueKind::MissingRequired));
    }

    #[test]
    fn blank_numeric_is_absent() {
        let (value, issue) = resolve_field(&column(LogicalType::Float64, false), Some("   "));
        assert_eq!(value, TypedValue::Null);
        assert_eq!(issue, None);
    }

    #[test]
    fn empty_optional_string_is_present() {
        let (value, issue) = resolve_field(&column(LogicalType::String, false), Some(""));
        assert_eq!(value, TypedValue::String(String::new()));
        assert_eq!(issue, None);
    }

    #[test]
    fn empty_required_string_is_missing() {
        let (value, issue) = resolve_field(&column(LogicalType::String, true), Some(" "));
        assert_eq!(value, TypedValue::Null);
        assert_eq!(issue, Some(IssueKind::MissingRequired));
    }

    #[test]
    fn trims_before_coercion() {
        let (value, issue) = resolve_field(&column(LogicalType::Integer64, true), Some(" 12 "));
        assert_eq!(value, TypedValue::Integer(12));
        assert_eq!(issue, None);
        let (value, _) = resolve_field(&column(LogicalType::String, true), Some("  Golf  "));
        assert_eq!(value, TypedValue::String("Golf".to_string()));
    }
}
