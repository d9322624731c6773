//! Run-level aggregation of table quality reports.

use serde::Serialize;

use csvjson_model::{TableQualityReport, round_score};

/// Totals across every table that produced a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub tables_validated: usize,
    pub total_rows: usize,
    pub valid_rows: usize,
    pub total_issues: usize,
    pub tables_with_issues: usize,
    pub tables_with_warnings: usize,
    /// Mean of the per-table scores; 1.0 when no table was validated.
    pub overall_quality_score: f64,
}

impl RunSummary {
    pub fn from_reports<'a, I>(reports: I) -> Self
    where
        I: IntoIterator<Item = &'a TableQualityReport>,
    {
        let mut summary = Self {
            tables_validated: 0,
            total_rows: 0,
            valid_rows: 0,
            total_issues: 0,
            tables_with_issues: 0,
            tables_with_warnings: 0,
            overall_quality_score: 1.0,
        };
        let mut score_sum = 0.0;
        for report in reports {
            summary.tables_validated += 1;
            summary.total_rows += report.total_rows();
            summary.valid_rows += report.valid_rows();
            summary.total_issues += report.issue_count();
            if report.has_issues() {
                summary.tables_with_issues += 1;
            }
            if !report.warnings().is_empty() {
                summary.tables_with_warnings += 1;
            }
            score_sum += report.quality_score();
        }
        if summary.tables_validated > 0 {
            summary.overall_quality_score =
                round_score(score_sum / summary.tables_validated as f64);
        }
        summary
    }
}
