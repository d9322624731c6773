//! End-to-end conversion runs against a temporary config and data tree.

use std::fs;
use std::path::{Path, PathBuf};

use csvjson_cli::pipeline::{RunOverrides, requested_tables, run_conversion};
use csvjson_ingest::load_schema;

const SCHEMAS: &str = r#"
[[tables]]
name = "departments"

[[tables.columns]]
name = "department_id"
type = "int64"
required = true
position = 1

[[tables.columns]]
name = "department_name"
type = "string"
required = true
position = 2

[[tables]]
name = "categories"

[[tables.columns]]
name = "category_id"
type = "int64"
required = true
position = 1

[[tables.columns]]
name = "category_department_id"
type = "int64"
required = true
position = 2

[[tables.columns]]
name = "category_name"
type = "string"
required = true
position = 3
"#;

struct Workspace {
    _dir: tempfile::TempDir,
    config: PathBuf,
    input: PathBuf,
    output: PathBuf,
}

fn workspace() -> Workspace {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config");
    let input = dir.path().join("input");
    let output = dir.path().join("output");
    fs::create_dir_all(&config).unwrap();
    fs::write(config.join("schemas.toml"), SCHEMAS).unwrap();
    fs::write(
        config.join("settings.toml"),
        format!(
            "[input]\nbase_path = {:?}\n\n[output]\nbase_path = {:?}\ncombined_filename = \"all.json\"\n",
            input.display().to_string(),
            output.display().to_string()
        ),
    )
    .unwrap();
    Workspace {
        _dir: dir,
        config,
        input,
        output,
    }
}

fn write_table(input: &Path, table: &str, contents: &str) {
    let dir = input.join(table);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("part-00000"), contents).unwrap();
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn converts_every_table_in_schema_order() {
    let ws = workspace();
    write_table(&ws.input, "departments", "2,Fitness\n3,Footwear\n");
    let categories: String = (1..=2000)
        .map(|id| format!("{id},2,Category {id}\n"))
        .collect();
    write_table(&ws.input, "categories", &categories);

    let overrides = RunOverrides {
        parallel: true,
        ..RunOverrides::default()
    };
    let result = run_conversion(&ws.config, &overrides).unwrap();

    assert!(!result.has_errors());
    let names: Vec<&str> = result.tables.iter().map(|t| t.table.as_str()).collect();
    assert_eq!(names, vec!["departments", "categories"]);
    assert_eq!(result.summary.total_rows, 2002);
    assert_eq!(result.summary.overall_quality_score, 1.0);

    let combined_path = ws.output.join("all.json");
    assert_eq!(result.combined.as_deref(), Some(combined_path.as_path()));
    let text = fs::read_to_string(&combined_path).unwrap();
    let departments_at = text.find("\"departments\"").unwrap();
    let categories_at = text.find("\"categories\"").unwrap();
    assert!(departments_at < categories_at);

    let departments = read_json(&ws.output.join("departments.json"));
    insta::assert_snapshot!(departments["data"].to_string(), @r#"[{"department_id":2,"department_name":"Fitness"},{"department_id":3,"department_name":"Footwear"}]"#);
    assert_eq!(departments["metadata"]["record_count"], 2);
    assert_eq!(departments["metadata"]["data_types"]["department_id"], "int64");
}

#[test]
fn bad_values_are_reported_not_dropped() {
    let ws = workspace();
    write_table(&ws.input, "departments", "2,Fitness\nabc,Footwear\n,Apparel\n");
    write_table(&ws.input, "categories", "1,2,Football\n");

    let result = run_conversion(&ws.config, &RunOverrides::default()).unwrap();

    assert!(!result.has_errors());
    let departments = &result.tables[0];
    assert_eq!(departments.records, 3);
    let report = departments.report.as_ref().unwrap();
    assert_eq!(report.issue_count(), 2);
    assert_eq!(report.quality_score(), 0.3333);

    let document = read_json(&ws.output.join("departments.json"));
    assert_eq!(document["data"][1]["department_id"], serde_json::Value::Null);
    assert_eq!(document["data"][1]["department_name"], "Footwear");
    assert_eq!(document["metadata"]["statistics"]["issue_count"], 2);
}

#[test]
fn missing_input_fails_only_that_table() {
    let ws = workspace();
    write_table(&ws.input, "categories", "1,2,Football\n");

    let result = run_conversion(&ws.config, &RunOverrides::default()).unwrap();

    assert!(result.has_errors());
    let failed: Vec<&str> = result.failed_tables().map(|t| t.table.as_str()).collect();
    assert_eq!(failed, vec!["departments"]);
    assert!(
        result.tables[0]
            .error
            .as_deref()
            .unwrap()
            .contains("file not found")
    );
    assert!(ws.output.join("categories.json").is_file());
    assert!(!ws.output.join("departments.json").exists());

    let combined = read_json(&ws.output.join("all.json"));
    let keys: Vec<&String> = combined.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["categories"]);
}

#[test]
fn dry_run_writes_nothing() {
    let ws = workspace();
    write_table(&ws.input, "departments", "2,Fitness\n");
    write_table(&ws.input, "categories", "1,2,Football\n");

    let overrides = RunOverrides {
        dry_run: true,
        ..RunOverrides::default()
    };
    let result = run_conversion(&ws.config, &overrides).unwrap();

    assert!(!result.has_errors());
    assert!(result.combined.is_none());
    assert!(!ws.output.exists());
}

#[test]
fn passthrough_and_table_filter() {
    let ws = workspace();
    write_table(&ws.input, "departments", "x,Fitness\n");

    let overrides = RunOverrides {
        no_validate: true,
        no_combined: true,
        tables: Some(vec!["departments".to_string()]),
        ..RunOverrides::default()
    };
    let result = run_conversion(&ws.config, &overrides).unwrap();

    assert!(!result.has_errors());
    assert_eq!(result.tables.len(), 1);
    assert!(!ws.output.join("all.json").exists());
    let document = read_json(&ws.output.join("departments.json"));
    assert_eq!(document["data"][0]["department_id"], "x");
    assert_eq!(document["metadata"]["statistics"]["quality_score"], 1.0);
}

#[test]
fn unknown_requested_table_is_a_failure() {
    let ws = workspace();
    write_table(&ws.input, "departments", "2,Fitness\n");

    let overrides = RunOverrides {
        tables: Some(vec!["returns".to_string(), "departments".to_string()]),
        ..RunOverrides::default()
    };
    let result = run_conversion(&ws.config, &overrides).unwrap();

    assert!(result.has_errors());
    let names: Vec<&str> = result.tables.iter().map(|t| t.table.as_str()).collect();
    assert_eq!(names, vec!["departments", "returns"]);
    assert!(result.tables[0].error.is_none());
    assert!(result.tables[1].error.is_some());
}

#[test]
fn requested_tables_follow_declaration_order() {
    let catalog = load_schema(SCHEMAS).unwrap();
    assert_eq!(
        requested_tables(&catalog, None),
        vec!["departments".to_string(), "categories".to_string()]
    );
    let only = vec!["categories".to_string(), "departments".to_string()];
    assert_eq!(
        requested_tables(&catalog, Some(&only)),
        vec!["departments".to_string(), "categories".to_string()]
    );
}

#[test]
fn invalid_schema_aborts_the_run() {
    let ws = workspace();
    fs::write(ws.config.join("schemas.toml"), "[[tables]]\nname = \"empty\"\n").unwrap();
    let err = run_conversion(&ws.config, &RunOverrides::default()).unwrap_err();
    assert!(format!("{err:#}").contains("has no columns"));
}
