//! Review report rendering.
//!
//! This module renders the aggregated review into Markdown and JSON
//! documents.

pub mod generator;

pub use generator::{write_json_report, write_report};
