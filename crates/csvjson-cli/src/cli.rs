//! CLI argument definitions for csv-to-json.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "csv-to-json",
    version,
    about = "Convert delimited tables to schema-validated JSON documents",
    long_about = "Convert delimited tables to schema-validated JSON documents.\n\n\
                  Each table is coerced against its declared schema. Bad fields are\n\
                  written as null and reported; no row is dropped. Writes one document\n\
                  per table plus a combined document."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags and settings).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow raw cell values to appear in logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

impl Cli {
    /// Config directory of the selected command.
    pub fn config_dir(&self) -> &PathBuf {
        match &self.command {
            Command::Convert(args) => &args.config_dir,
            Command::Tables(args) => &args.config_dir,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Read, validate and convert every declared table.
    Convert(ConvertArgs),

    /// List the declared table schemas.
    Tables(TablesArgs),
}

#[derive(Parser)]
pub struct ConvertArgs {
    /// Directory holding settings.toml and schemas.toml.
    #[arg(long = "config-dir", value_name = "DIR", default_value = "config")]
    pub config_dir: PathBuf,

    /// Input directory (overrides input.base_path).
    #[arg(long = "input-dir", value_name = "DIR")]
    pub input_dir: Option<PathBuf>,

    /// Output directory (overrides output.base_path).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Pass values through as strings without coercion or issue reporting.
    #[arg(long = "no-validate")]
    pub no_validate: bool,

    /// Process tables on separate threads.
    #[arg(long = "parallel")]
    pub parallel: bool,

    /// Skip the per-table documents.
    #[arg(long = "no-individual")]
    pub no_individual: bool,

    /// Skip the combined document.
    #[arg(long = "no-combined")]
    pub no_combined: bool,

    /// Validate and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Only process these tables (comma-separated).
    #[arg(long = "tables", value_name = "NAMES", value_delimiter = ',')]
    pub tables: Option<Vec<String>>,
}

#[derive(Parser)]
pub struct TablesArgs {
    /// Directory holding schemas.toml.
    #[arg(long = "config-dir", value_name = "DIR", default_value = "config")]
    pub config_dir: PathBuf,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
