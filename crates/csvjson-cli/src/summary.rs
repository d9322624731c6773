use std::collections::BTreeMap;
use std::path::PathBuf;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use csvjson_cli::types::{RunResult, TableSummary};
use csvjson_model::{IssueKind, TableQualityReport};

/// Row indices shown per issue group.
const MAX_EXAMPLES: usize = 3;

pub fn print_summary(result: &RunResult) {
    println!("Output: {}", result.output_dir.display());
    if let Some(path) = &result.combined {
        println!("Combined: {}", path.display());
    }
    if result.dry_run {
        println!("Dry run: no files written");
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Records"),
        header_cell("Issues"),
        header_cell("Warnings"),
        header_cell("Score"),
        header_cell("JSON"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Center);
    for summary in &result.tables {
        let report = summary.report.as_ref();
        table.add_row(vec![
            table_cell(summary),
            Cell::new(summary.records),
            count_cell(report.map(TableQualityReport::issue_count), Color::Red),
            count_cell(report.map(|r| r.warnings().len()), Color::Yellow),
            score_cell(report.map(TableQualityReport::quality_score)),
            output_cell(summary.output.as_ref()),
        ]);
    }
    let totals = &result.summary;
    let total_warnings: usize = result
        .tables
        .iter()
        .filter_map(|summary| summary.report.as_ref())
        .map(|report| report.warnings().len())
        .sum();
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(totals.total_rows).add_attribute(Attribute::Bold),
        count_cell(Some(totals.total_issues), Color::Red).add_attribute(Attribute::Bold),
        count_cell(Some(total_warnings), Color::Yellow).add_attribute(Attribute::Bold),
        score_cell(Some(totals.overall_quality_score)).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    println!("{table}");
    print_issue_table(result);
    print_errors(result);
}

fn print_issue_table(result: &RunResult) {
    let rows = issue_rows(result);
    if rows.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Severity"),
        header_cell("Column"),
        header_cell("Kind"),
        header_cell("Count"),
        header_cell("Rows"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    align_column(&mut table, 4, CellAlignment::Right);
    for row in rows {
        table.add_row(vec![
            Cell::new(row.table).fg(Color::Blue),
            severity_cell(row.is_issue),
            Cell::new(row.column),
            Cell::new(row.kind),
            Cell::new(row.count),
            example_cell(row.examples),
        ]);
    }
    println!();
    println!("Issues:");
    println!("{table}");
}

fn print_errors(result: &RunResult) {
    let failed: Vec<&TableSummary> = result.failed_tables().collect();
    if failed.is_empty() && result.errors.is_empty() {
        return;
    }
    eprintln!("Errors:");
    for summary in failed {
        if let Some(error) = &summary.error {
            eprintln!("- {}: {error}", summary.table);
        }
    }
    for error in &result.errors {
        eprintln!("- {error}");
    }
}

/// One aggregated line of the issue table.
#[derive(Debug, PartialEq)]
struct IssueRow {
    table: String,
    is_issue: bool,
    column: String,
    kind: String,
    count: usize,
    examples: String,
}

fn issue_rows(result: &RunResult) -> Vec<IssueRow> {
    let mut rows = Vec::new();
    for summary in &result.tables {
        let Some(report) = summary.report.as_ref() else {
            continue;
        };
        let mut grouped: BTreeMap<(&str, IssueKind), Vec<usize>> = BTreeMap::new();
        for issue in report.issues() {
            grouped
                .entry((issue.column.as_str(), issue.kind))
                .or_default()
                .push(issue.row_index);
        }
        for ((column, kind), row_indices) in grouped {
            rows.push(IssueRow {
                table: summary.table.clone(),
                is_issue: true,
                column: column.to_string(),
                kind: kind.label().to_string(),
                count: row_indices.len(),
                examples: examples(&row_indices),
            });
        }
        for warning in report.warnings() {
            rows.push(IssueRow {
                table: summary.table.clone(),
                is_issue: false,
                column: warning.column.clone(),
                kind: warning.message(),
                count: warning.count,
                examples: "-".to_string(),
            });
        }
    }
    rows
}

fn examples(row_indices: &[usize]) -> String {
    let mut shown: Vec<String> = row_indices
        .iter()
        .take(MAX_EXAMPLES)
        .map(|index| index.to_string())
        .collect();
    if row_indices.len() > MAX_EXAMPLES {
        shown.push(format!("+{}", row_indices.len() - MAX_EXAMPLES));
    }
    shown.join(", ")
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(120);
}

fn apply_issue_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn table_cell(summary: &TableSummary) -> Cell {
    if summary.error.is_some() {
        Cell::new(&summary.table)
            .fg(Color::Red)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new(&summary.table)
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold)
    }
}

fn output_cell(path: Option<&PathBuf>) -> Cell {
    match path {
        Some(_) => Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        None => dim_cell("-"),
    }
}

fn count_cell(count: Option<usize>, color: Color) -> Cell {
    match count {
        Some(value) if value > 0 => Cell::new(value).fg(color).add_attribute(Attribute::Bold),
        Some(value) => dim_cell(value),
        None => dim_cell("-"),
    }
}

fn score_cell(score: Option<f64>) -> Cell {
    match score {
        Some(value) if value >= 1.0 => Cell::new(format!("{value:.4}")).fg(Color::Green),
        Some(value) => Cell::new(format!("{value:.4}")).fg(Color::Yellow),
        None => dim_cell("-"),
    }
}

fn severity_cell(is_issue: bool) -> Cell {
    if is_issue {
        Cell::new("ISSUE").fg(Color::Red)
    } else {
        Cell::new("WARN").fg(Color::Yellow)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn example_cell(value: String) -> Cell {
    if value == "-" {
        dim_cell(value)
    } else {
        Cell::new(value)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

#[cfg(test)]
mod tests {
    use super::*;
    use csvjson_model::{QualityIssue, QualityWarning, WarningKind};
    use csvjson_validate::RunSummary;
    use std::time::Duration;

    fn issue(row_index: usize, column: &str, kind: IssueKind) -> QualityIssue {
        QualityIssue {
            table: "products".to_string(),
            row_index,
            column: column.to_string(),
            kind,
            raw_value: None,
        }
    }

    fn result_with(report: TableQualityReport) -> RunResult {
        let summary = RunSummary::from_reports([&report]);
        RunResult {
            output_dir: PathBuf::from("out"),
            tables: vec![TableSummary {
                table: "products".to_string(),
                records: report.total_rows(),
                report: Some(report),
                output: None,
                error: None,
            }],
            combined: None,
            summary,
            errors: Vec::new(),
            dry_run: true,
            duration: Duration::ZERO,
        }
    }

    #[test]
    fn issues_are_grouped_by_column_and_kind() {
        let report = TableQualityReport::new(
            "products",
            6,
            5,
            vec![
                issue(0, "product_price", IssueKind::TypeMismatch),
                issue(1, "product_price", IssueKind::TypeMismatch),
                issue(2, "product_price", IssueKind::TypeMismatch),
                issue(3, "product_price", IssueKind::TypeMismatch),
                issue(4, "product_name", IssueKind::MissingRequired),
            ],
            vec![QualityWarning {
                column: "product_price".to_string(),
                kind: WarningKind::NegativeAmount,
                count: 1,
            }],
        );
        let rows = issue_rows(&result_with(report));

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].column, "product_name");
        assert_eq!(rows[0].kind, "missing required");
        assert_eq!(rows[1].column, "product_price");
        assert_eq!(rows[1].count, 4);
        assert_eq!(rows[1].examples, "0, 1, 2, +1");
        assert!(!rows[2].is_issue);
        assert_eq!(rows[2].kind, "Column product_price: 1 negative price values");
    }

    #[test]
    fn clean_run_has_no_issue_rows() {
        let rows = issue_rows(&result_with(TableQualityReport::clean("products", 3)));
        assert!(rows.is_empty());
    }
}
