//! Output writers for merged traces and text reports.
//!
//! This module handles writing data to disk:
//! - Merged trace JSON (atomic)
//! - Path shortening applied to serialized text
//! - Plain-text report files

pub mod json;
pub mod report;
pub mod shortener;

// Re-export main functions
pub use json::{to_string_with_indent, trace_to_string, validate_path, write_atomic, write_trace};
pub use report::write_report;
pub use shortener::PathShortener;
