//! Loading of run settings and schemas, and reading of raw table files.

pub mod config;
pub mod error;
pub mod reader;

pub use config::{
    InputSettings, LoggingSettings, OutputSettings, ProcessingSettings, SCHEMAS_FILE,
    SETTINGS_FILE, Settings, load_schema, load_schema_file, load_settings, parse_settings,
    table_input_path,
};
pub use error::{IngestError, Result};
pub use reader::{EXTRA_FIELD_PREFIX, ReaderOptions, read_table_rows};
