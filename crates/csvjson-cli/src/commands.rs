use anyhow::{Context, Result};
use comfy_table::Table;

use csvjson_cli::logging::log_data_enabled;
use csvjson_cli::pipeline::{RunOverrides, run_conversion};
use csvjson_cli::types::RunResult;
use csvjson_ingest::{SCHEMAS_FILE, load_schema_file};

use crate::cli::{ConvertArgs, TablesArgs};
use crate::summary::apply_table_style;

pub fn run_tables(args: &TablesArgs) -> Result<()> {
    let path = args.config_dir.join(SCHEMAS_FILE);
    let catalog =
        load_schema_file(&path).with_context(|| format!("load schemas {}", path.display()))?;
    let mut table = Table::new();
    table.set_header(vec!["Table", "Position", "Column", "Type", "Required"]);
    apply_table_style(&mut table);
    for schema in catalog.iter() {
        for column in schema.columns_in_order() {
            table.add_row(vec![
                schema.name().to_string(),
                column.position.to_string(),
                column.name.clone(),
                column.logical_type.to_string(),
                if column.required { "yes" } else { "no" }.to_string(),
            ]);
        }
    }
    println!("{table}");
    Ok(())
}

pub fn run_convert(args: &ConvertArgs) -> Result<RunResult> {
    let overrides = RunOverrides {
        input_dir: args.input_dir.clone(),
        output_dir: args.output_dir.clone(),
        no_validate: args.no_validate,
        parallel: args.parallel,
        no_individual: args.no_individual,
        no_combined: args.no_combined,
        dry_run: args.dry_run,
        tables: args.tables.clone(),
        log_values: log_data_enabled(),
    };
    run_conversion(&args.config_dir, &overrides)
}
