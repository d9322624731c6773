//! JSON output for validated tables.
//!
//! [`to_output_document`] and [`to_combined_document`] build the canonical
//! document shapes; the writer functions put them on disk.

pub mod error;
pub mod mapper;
pub mod writer;

pub use error::{OutputError, Result};
pub use mapper::{
    ColumnStatistics, CombinedDocument, DocumentMetadata, DocumentStatistics, OutputDocument,
    format_timestamp, to_combined_document, to_output_document,
};
pub use writer::{WriteStats, verify_output_file, write_combined_json, write_table_json};
