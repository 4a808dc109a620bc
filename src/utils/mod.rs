//! Utility modules for configuration, error handling, and small helpers.

pub mod config;
pub mod error;
pub mod truncation;

// Re-export commonly used error types for convenience
pub use error::{ConfigError, MergeError, OutputError, ParseError, SummaryError};
