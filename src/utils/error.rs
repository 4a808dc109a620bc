//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading a trace file
///
/// Most variants mean "this JSON is not a trace" and the file is skipped.
/// The field variants mean the compiler produced something we do not
/// understand, which aborts the run (see [`ParseError::is_fatal`]).
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Could not read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} is not valid UTF-8")]
    NotUtf8(PathBuf),

    #[error("Could not load the JSON in {path}: {source}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON in {0} is not an object")]
    NotAnObject(PathBuf),

    #[error("Could not find {key} in {path}")]
    MissingKey { path: PathBuf, key: &'static str },

    #[error("{key} in {path} is not an integer: {value}")]
    InvalidStartTime {
        path: PathBuf,
        key: &'static str,
        value: String,
    },

    #[error("JSON in {path} had unknown set of keys: {keys:?}")]
    UnexpectedKeys { path: PathBuf, keys: Vec<String> },

    #[error("Could not find key {field} in event of {path}: {event}")]
    MissingField {
        path: PathBuf,
        field: &'static str,
        event: String,
    },

    #[error("{field} value was invalid in {path}: {value}")]
    InvalidField {
        path: PathBuf,
        field: &'static str,
        value: String,
    },
}

impl ParseError {
    /// Whether this error must abort the whole run instead of skipping the file
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ParseError::MissingField { .. } | ParseError::InvalidField { .. }
        )
    }

    /// Whether the skip is expected often enough to only be worth a debug line
    pub fn is_quiet(&self) -> bool {
        matches!(
            self,
            ParseError::InvalidJson { .. } | ParseError::MissingKey { .. }
        )
    }
}

/// Errors that can occur while stitching trace files together
#[derive(Error, Debug)]
pub enum MergeError {
    #[error("Found {count} '{name}' events in {file}; the total time is ambiguous")]
    MultipleTotals {
        file: String,
        name: &'static str,
        count: usize,
    },
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}

/// Errors that can occur while building, saving or loading a summary store
#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("Summary data for '{0}' already exists. Keys must be unique and only added once.")]
    DuplicateKey(String),

    #[error("'{0}' is reserved and cannot be used as a summary key")]
    ReservedKey(String),

    #[error("Failed to read snapshot {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode snapshot {path}: {source}")]
    DecodeFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid snapshot format: {0}")]
    InvalidFormat(String),

    #[error("Failed to write snapshot: {0}")]
    WriteFailed(#[from] OutputError),

    #[error("Could not list snapshot folder {path}: {source}")]
    ListFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while loading the TOML config file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
}
