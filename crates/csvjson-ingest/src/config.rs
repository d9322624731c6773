//! Run settings and schema definitions, loaded from TOML.
//!
//! Every settings key is optional; missing sections fall back to the
//! defaults below. Schemas are declared as an array of tables so the
//! declaration order survives parsing.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use csvjson_model::{SchemaCatalog, TableDefinition};

use crate::error::{IngestError, Result};
use crate::reader::ReaderOptions;

/// File name of the run settings inside a config directory.
pub const SETTINGS_FILE: &str = "settings.toml";

/// File name of the schema definitions inside a config directory.
pub const SCHEMAS_FILE: &str = "schemas.toml";

// =============================================================================
// ROOT SETTINGS
// =============================================================================

/// Settings for one conversion run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where raw tables are read from.
    pub input: InputSettings,

    /// Where documents are written.
    pub output: OutputSettings,

    /// Engine switches.
    pub processing: ProcessingSettings,

    /// Default log level.
    pub logging: LoggingSettings,
}

impl Settings {
    /// Reader options derived from the input section.
    pub fn reader_options(&self) -> Result<ReaderOptions> {
        let delimiter = self.input.delimiter;
        if !delimiter.is_ascii() {
            return Err(IngestError::InvalidSetting {
                key: "input.delimiter".to_string(),
                message: format!("'{delimiter}' is not a single-byte character"),
            });
        }
        Ok(ReaderOptions {
            delimiter: delimiter as u8,
            has_header: self.input.has_header,
            null_values: self.input.null_values.clone(),
        })
    }

    /// Output path of one table's document.
    pub fn table_output_path(&self, table: &str) -> PathBuf {
        self.output.base_path.join(format!("{table}.json"))
    }

    /// Output path of the combined document.
    pub fn combined_output_path(&self) -> PathBuf {
        self.output.base_path.join(&self.output.combined_filename)
    }
}

// =============================================================================
// SECTIONS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// Directory holding one sub-directory per table.
    pub base_path: PathBuf,
    /// File name inside each table directory.
    pub file_pattern: String,
    pub delimiter: char,
    pub has_header: bool,
    /// Cell contents treated as absent.
    pub null_values: Vec<String>,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("data/input/retail_db"),
            file_pattern: "part-00000".to_string(),
            delimiter: ',',
            has_header: false,
            null_values: vec!["NULL".to_string(), "null".to_string(), "None".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub base_path: PathBuf,
    pub combined_filename: String,
    /// Write one document per table.
    pub individual_files: bool,
    /// Write the combined document.
    pub combined_file: bool,
    /// Indent JSON with two spaces.
    pub pretty: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("data/output"),
            combined_filename: "retail_db_combined.json".to_string(),
            individual_files: true,
            combined_file: true,
            pretty: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingSettings {
    pub validate_data: bool,
    /// Process tables on separate threads.
    pub parallel: bool,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            validate_data: true,
            parallel: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// =============================================================================
// LOADING
// =============================================================================

#[derive(Debug, Deserialize)]
struct SchemaFile {
    #[serde(default)]
    tables: Vec<TableDefinition>,
}

/// Parse settings from TOML text.
pub fn parse_settings(source: &str) -> Result<Settings> {
    parse_toml(source, SETTINGS_FILE)
}

/// Load settings from a file.
pub fn load_settings(path: &Path) -> Result<Settings> {
    let settings = parse_toml(&read_config(path)?, &path.display().to_string())?;
    debug!(path = %path.display(), "settings loaded");
    Ok(settings)
}

/// Parse and validate schema definitions from TOML text.
pub fn load_schema(source: &str) -> Result<SchemaCatalog> {
    build_catalog(source, SCHEMAS_FILE)
}

/// Load and validate schema definitions from a file.
pub fn load_schema_file(path: &Path) -> Result<SchemaCatalog> {
    let catalog = build_catalog(&read_config(path)?, &path.display().to_string())?;
    debug!(path = %path.display(), tables = catalog.len(), "schema loaded");
    Ok(catalog)
}

fn build_catalog(source: &str, origin: &str) -> Result<SchemaCatalog> {
    let file: SchemaFile = parse_toml(source, origin)?;
    Ok(SchemaCatalog::from_definitions(file.tables)?)
}

/// `origin` names the source in errors: a file path, or the default file
/// name for in-memory text.
fn parse_toml<T: DeserializeOwned>(source: &str, origin: &str) -> Result<T> {
    toml::from_str(source).map_err(|source| IngestError::Toml {
        origin: origin.to_string(),
        source,
    })
}

/// Input file of `table`: `<base_path>/<table>/<file_pattern>`.
pub fn table_input_path(settings: &Settings, table: &str) -> PathBuf {
    settings
        .input
        .base_path
        .join(table)
        .join(&settings.input.file_pattern)
}

fn read_config(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}
