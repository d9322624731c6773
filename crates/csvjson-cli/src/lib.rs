//! CLI library components for csv-to-json.

pub mod logging;
pub mod pipeline;
pub mod types;
