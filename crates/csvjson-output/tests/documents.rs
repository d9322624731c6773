//! Document shape and writer behaviour.

use std::fs;

use chrono::{DateTime, TimeZone, Utc};
use csvjson_model::{
    ColumnSpec, LogicalType, QualityIssue, TableQualityReport, TableSchema, TypedRow, TypedValue,
};
use csvjson_output::{
    OutputDocument, OutputError, to_combined_document, to_output_document, verify_output_file,
    write_combined_json, write_table_json,
};

fn generated_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
}

fn widget_schema() -> TableSchema {
    TableSchema::new(
        "widgets",
        vec![
            ColumnSpec::new("name", LogicalType::String, true, 2),
            ColumnSpec::new("id", LogicalType::Integer64, true, 1),
        ],
    )
    .unwrap()
}

fn widget(id: TypedValue, name: &str) -> TypedRow {
    let mut row = TypedRow::with_capacity(2);
    row.push("id", id);
    row.push("name", TypedValue::String(name.to_string()));
    row
}

fn widget_document(rows: Vec<TypedRow>) -> OutputDocument {
    let report = TableQualityReport::clean("widgets", rows.len());
    to_output_document("widgets", rows, &widget_schema(), report, generated_at())
}

#[test]
fn table_document_shape() {
    let document = widget_document(vec![widget(TypedValue::Integer(7), "Widget")]);
    let json = serde_json::to_string_pretty(&document).unwrap();
    insta::assert_snapshot!(json, @r#"
    {
      "metadata": {
        "table_name": "widgets",
        "record_count": 1,
        "column_count": 2,
        "columns": [
          "id",
          "name"
        ],
        "generated_at": "2024-01-15T10:30:00Z",
        "data_types": {
          "id": "int64",
          "name": "string"
        },
        "statistics": {
          "quality_score": 1.0,
          "issue_count": 0,
          "warning_count": 0,
          "columns": {
            "id": {
              "null_count": 0,
              "min": 7,
              "max": 7,
              "mean": 7.0
            },
            "name": {
              "null_count": 0
            }
          }
        }
      },
      "data": [
        {
          "id": 7,
          "name": "Widget"
        }
      ]
    }
    "#);
}

#[test]
fn null_fields_are_written_not_omitted() {
    let report = TableQualityReport::new(
        "widgets",
        1,
        1,
        vec![QualityIssue {
            table: "widgets".to_string(),
            row_index: 0,
            column: "id".to_string(),
            kind: csvjson_model::IssueKind::MissingRequired,
            raw_value: Some(String::new()),
        }],
        Vec::new(),
    );
    let document = to_output_document(
        "widgets",
        vec![widget(TypedValue::Null, "Widget")],
        &widget_schema(),
        report,
        generated_at(),
    );
    let json = serde_json::to_string(&document.data).unwrap();
    assert_eq!(json, r#"[{"id":null,"name":"Widget"}]"#);
    assert_eq!(document.metadata.statistics.quality_score, 0.0);
    assert_eq!(document.metadata.statistics.issue_count, 1);
}

#[test]
fn integers_round_trip_as_integers() {
    let document = widget_document(vec![widget(TypedValue::Integer(42), "Answer")]);
    let json = serde_json::to_string(&document).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    let id = &parsed["data"][0]["id"];
    assert!(!id.is_f64());
    assert_eq!(id.as_i64(), Some(42));
    assert_eq!(parsed["data"][0]["name"], "Answer");

    let extreme = widget_document(vec![widget(TypedValue::Integer(i64::MIN), "Min")]);
    let json = serde_json::to_string(&extreme).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["data"][0]["id"].as_i64(), Some(i64::MIN));
}

#[test]
fn combined_document_keeps_supplied_order() {
    let departments = widget_document(vec![widget(TypedValue::Integer(2), "Fitness")]);
    let categories = widget_document(Vec::new());
    let combined = to_combined_document(vec![
        ("departments".to_string(), departments),
        ("categories".to_string(), categories),
    ]);

    let names: Vec<&str> = combined.table_names().collect();
    assert_eq!(names, vec!["departments", "categories"]);
    assert_eq!(combined.record_count(), 1);

    let json = serde_json::to_string(&combined).unwrap();
    let departments_at = json.find("\"departments\"").unwrap();
    let categories_at = json.find("\"categories\"").unwrap();
    assert!(departments_at < categories_at);
    assert!(json.starts_with(r#"{"departments":{"metadata":"#));
}

#[test]
fn writes_and_verifies_table_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("widgets.json");
    let document = widget_document(vec![widget(TypedValue::Integer(1), "Café")]);

    let stats = write_table_json(&document, &path, true).unwrap();

    assert_eq!(stats.path, path);
    assert_eq!(stats.record_count, 1);
    let written = fs::read_to_string(&path).unwrap();
    assert_eq!(stats.size_bytes, written.len() as u64);
    assert!(written.contains("\"Café\""));
    assert!(written.contains("\n  \"metadata\""));
    verify_output_file(&path).unwrap();
}

#[test]
fn writes_compact_combined_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("combined.json");
    let combined = to_combined_document(vec![(
        "widgets".to_string(),
        widget_document(vec![widget(TypedValue::Integer(1), "A")]),
    )]);

    let stats = write_combined_json(&combined, &path, false).unwrap();

    assert_eq!(stats.record_count, 1);
    let written = fs::read_to_string(&path).unwrap();
    assert!(!written.contains('\n'));
    verify_output_file(&path).unwrap();
}

#[test]
fn verify_rejects_broken_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{\"metadata\": ").unwrap();
    let err = verify_output_file(&path).unwrap_err();
    assert!(matches!(err, OutputError::Verify { .. }));

    fs::write(&path, "[1, 2]").unwrap();
    assert!(verify_output_file(&path).is_err());

    let missing = dir.path().join("missing.json");
    assert!(verify_output_file(&missing).is_err());
}
