//! Data-quality findings recorded while coercing a table.
//!
//! Issues and warnings are data, not errors: recording one never stops a
//! row or a table from being processed.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Decimal places kept when reporting quality scores.
pub const SCORE_PRECISION: i32 = 4;

/// Round a ratio to [`SCORE_PRECISION`] decimals.
pub fn round_score(value: f64) -> f64 {
    let factor = 10f64.powi(SCORE_PRECISION);
    (value * factor).round() / factor
}

/// Kind of a per-field defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A required column was absent.
    MissingRequired,
    /// Present text did not fit the declared logical type.
    TypeMismatch,
    /// A non-finite float reached serialization and was written as null.
    NonFiniteNumber,
}

impl IssueKind {
    pub fn label(&self) -> &'static str {
        match self {
            IssueKind::MissingRequired => "missing required",
            IssueKind::TypeMismatch => "type mismatch",
            IssueKind::NonFiniteNumber => "non-finite number",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One recorded defect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityIssue {
    pub table: String,
    /// 0-based index of the row in input order.
    pub row_index: usize,
    pub column: String,
    pub kind: IssueKind,
    /// Original text, `None` when the field was absent.
    pub raw_value: Option<String>,
}

impl QualityIssue {
    /// Human-readable description.
    pub fn message(&self) -> String {
        match (&self.kind, &self.raw_value) {
            (IssueKind::MissingRequired, _) => {
                format!("row {}: required column {} is empty", self.row_index, self.column)
            }
            (IssueKind::TypeMismatch, Some(raw)) => format!(
                "row {}: column {} value '{}' does not fit the declared type",
                self.row_index, self.column, raw
            ),
            (IssueKind::TypeMismatch, None) => format!(
                "row {}: column {} does not fit the declared type",
                self.row_index, self.column
            ),
            (IssueKind::NonFiniteNumber, _) => format!(
                "row {}: column {} holds a non-finite number",
                self.row_index, self.column
            ),
        }
    }
}

/// Kind of a non-scoring observation about a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// An `*_id` column holds negative values.
    NegativeIdentifier,
    /// A `*_price` or `*_subtotal` column holds negative values.
    NegativeAmount,
    /// A string column holds present-but-empty values.
    EmptyString,
    /// Rows carry a column the schema does not declare.
    UnexpectedColumn,
}

/// An aggregated warning for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityWarning {
    pub column: String,
    pub kind: WarningKind,
    /// Number of rows showing the condition.
    pub count: usize,
}

impl QualityWarning {
    pub fn message(&self) -> String {
        match self.kind {
            WarningKind::NegativeIdentifier => {
                format!("Column {}: {} negative ID values", self.column, self.count)
            }
            WarningKind::NegativeAmount => {
                format!("Column {}: {} negative price values", self.column, self.count)
            }
            WarningKind::EmptyString => {
                format!("Column {}: {} empty string values", self.column, self.count)
            }
            WarningKind::UnexpectedColumn => format!(
                "Column {}: present in {} rows but not declared",
                self.column, self.count
            ),
        }
    }
}

/// Quality findings for one table pass.
///
/// Built once by the engine when the pass completes; read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableQualityReport {
    table: String,
    total_rows: usize,
    rows_with_issues: usize,
    issues: Vec<QualityIssue>,
    #[serde(default)]
    warnings: Vec<QualityWarning>,
}

impl TableQualityReport {
    pub fn new(
        table: impl Into<String>,
        total_rows: usize,
        rows_with_issues: usize,
        issues: Vec<QualityIssue>,
        warnings: Vec<QualityWarning>,
    ) -> Self {
        Self {
            table: table.into(),
            total_rows,
            rows_with_issues,
            issues,
            warnings,
        }
    }

    /// A report with no findings, e.g. when validation is disabled.
    pub fn clean(table: impl Into<String>, total_rows: usize) -> Self {
        Self::new(table, total_rows, 0, Vec::new(), Vec::new())
    }

    /// Append issues found after the pass, recounting affected rows.
    pub fn with_additional_issues(mut self, issues: Vec<QualityIssue>) -> Self {
        if issues.is_empty() {
            return self;
        }
        let before: BTreeSet<usize> = self.issues.iter().map(|issue| issue.row_index).collect();
        let new_rows: BTreeSet<usize> = issues
            .iter()
            .map(|issue| issue.row_index)
            .filter(|row_index| !before.contains(row_index))
            .collect();
        self.rows_with_issues = (self.rows_with_issues + new_rows.len()).min(self.total_rows);
        self.issues.extend(issues);
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub fn rows_with_issues(&self) -> usize {
        self.rows_with_issues
    }

    pub fn valid_rows(&self) -> usize {
        self.total_rows.saturating_sub(self.rows_with_issues)
    }

    pub fn issues(&self) -> &[QualityIssue] {
        &self.issues
    }

    pub fn warnings(&self) -> &[QualityWarning] {
        &self.warnings
    }

    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn count_of(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|issue| issue.kind == kind).count()
    }

    /// Share of rows without issues, rounded to four decimals.
    ///
    /// An empty table scores 1.0.
    pub fn quality_score(&self) -> f64 {
        if self.total_rows == 0 {
            return 1.0;
        }
        round_score(self.valid_rows() as f64 / self.total_rows as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(row_index: usize, kind: IssueKind) -> QualityIssue {
        QualityIssue {
            table: "orders".to_string(),
            row_index,
            column: "order_id".to_string(),
            kind,
            raw_value: None,
        }
    }

    #[test]
    fn empty_table_scores_one() {
        let report = TableQualityReport::clean("orders", 0);
        assert_eq!(report.quality_score(), 1.0);
        assert!(!report.has_issues());
    }

    #[test]
    fn score_rounds_to_four_decimals() {
        let report = TableQualityReport::new(
            "orders",
            3,
            1,
            vec![issue(0, IssueKind::TypeMismatch)],
            Vec::new(),
        );
        assert_eq!(report.quality_score(), 0.6667);
        assert_eq!(report.valid_rows(), 2);
    }

    #[test]
    fn counts_by_kind() {
        let report = TableQualityReport::new(
            "orders",
            2,
            2,
            vec![
                issue(0, IssueKind::TypeMismatch),
                issue(1, IssueKind::MissingRequired),
                issue(1, IssueKind::MissingRequired),
            ],
            Vec::new(),
        );
        assert_eq!(report.count_of(IssueKind::MissingRequired), 2);
        assert_eq!(report.count_of(IssueKind::TypeMismatch), 1);
        assert_eq!(report.quality_score(), 0.0);
    }

    #[test]
    fn additional_issues_recount_rows() {
        let report = TableQualityReport::new(
            "orders",
            4,
            1,
            vec![issue(0, IssueKind::TypeMismatch)],
            Vec::new(),
        )
        .with_additional_issues(vec![
            issue(0, IssueKind::NonFiniteNumber),
            issue(3, IssueKind::NonFiniteNumber),
        ]);
        assert_eq!(report.issue_count(), 3);
        assert_eq!(report.rows_with_issues(), 2);
        assert_eq!(report.quality_score(), 0.5);
    }

    #[test]
    fn issue_kind_serializes_snake_case() {
        let json = serde_json::to_string(&IssueKind::MissingRequired).unwrap();
        assert_eq!(json, "\"missing_required\"");
    }
}
