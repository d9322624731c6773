//! Non-scoring column checks.
//!
//! These never produce [`QualityIssue`](csvjson_model::QualityIssue)s and
//! never change the quality score; they only surface suspicious values.

use std::collections::{BTreeMap, BTreeSet};

use csvjson_model::{
    ColumnSpec, LogicalType, QualityWarning, RawRow, TableSchema, TypedValue, WarningKind,
};

const IDENTIFIER_SUFFIX: &str = "_id";
const AMOUNT_SUFFIXES: &[&str] = &["_price", "_subtotal"];

fn is_identifier_column(column: &ColumnSpec) -> bool {
    column.logical_type == LogicalType::Integer64 && column.name.ends_with(IDENTIFIER_SUFFIX)
}

fn is_amount_column(column: &ColumnSpec) -> bool {
    column.logical_type.is_numeric()
        && AMOUNT_SUFFIXES
            .iter()
            .any(|suffix| column.name.ends_with(suffix))
}

/// Per-column warning counters for one table pass.
#[derive(Debug)]
pub(crate) struct WarningTally<'a> {
    declared: BTreeSet<&'a str>,
    counts: BTreeMap<(String, WarningKind), usize>,
}

impl<'a> WarningTally<'a> {
    pub(crate) fn new(schema: &'a TableSchema) -> Self {
        Self {
            declared: schema
                .columns_in_order()
                .iter()
                .map(|column| column.name.as_str())
                .collect(),
            counts: BTreeMap::new(),
        }
    }

    /// Record keys of `raw` that the schema does not declare.
    pub(crate) fn observe_row(&mut self, raw: &RawRow) {
        for column in raw.columns() {
            if !self.declared.contains(column) {
                self.bump(column, WarningKind::UnexpectedColumn);
            }
        }
    }

    /// Record range and emptiness findings for one coerced value.
    pub(crate) fn observe_value(&mut self, column: &ColumnSpec, value: &TypedValue) {
        match value {
            TypedValue::String(text) if text.is_empty() => {
                self.bump(&column.name, WarningKind::EmptyString);
            }
            TypedValue::Integer(_) | TypedValue::Float(_) => {
                let negative = value.as_f64().is_some_and(|number| number < 0.0);
                if !negative {
                    return;
                }
                if is_identifier_column(column) {
                    self.bump(&column.name, WarningKind::NegativeIdentifier);
                } else if is_amount_column(column) {
                    self.bump(&column.name, WarningKind::NegativeAmount);
                }
            }
            _ => {}
        }
    }

    fn bump(&mut self, column: &str, kind: WarningKind) {
        *self.counts.entry((column.to_string(), kind)).or_insert(0) += 1;
    }

    pub(crate) fn finish(self) -> Vec<QualityWarning> {
        self.counts
            .into_iter()
            .map(|((column, kind), count)| QualityWarning { column, kind, count })
            .collect()
    }
}
