//! JSON output writers.
//!
//! Writes merged traces (and, through [`write_atomic`], snapshots) to disk.
//! Files are written to a temporary sibling first and renamed into place, so
//! an interrupted run never leaves a truncated JSON behind.

use super::shortener::PathShortener;
use crate::parser::TraceFile;
use crate::utils::config::{KEY_BEGINNING_OF_TIME, KEY_TRACE_EVENTS};
use crate::utils::error::OutputError;
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Render a trace in the `-ftime-trace` schema
///
/// **Public** - used by [`write_trace`] and tests
///
/// Output uses one-space indentation; merged traces get large and this keeps
/// them readable without doubling their size.
pub fn trace_to_string(trace: &TraceFile) -> Result<String, OutputError> {
    let events: Vec<Value> = trace.events().iter().map(|e| e.to_json()).collect();
    debug!("Built object graph ({} items)", events.len());

    let mut root = Map::new();
    root.insert(KEY_BEGINNING_OF_TIME.to_string(), Value::from(trace.beginning_of_time()));
    root.insert(KEY_TRACE_EVENTS.to_string(), Value::Array(events));

    to_string_with_indent(&Value::Object(root), b" ")
}

/// Serialize `value` as pretty JSON with a custom indent
pub fn to_string_with_indent<T: Serialize>(value: &T, indent: &[u8]) -> Result<String, OutputError> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value
        .serialize(&mut serializer)
        .map_err(OutputError::SerializationFailed)?;
    String::from_utf8(buffer).map_err(|e| OutputError::InvalidPath(format!("non UTF-8 JSON output: {e}")))
}

/// Write a trace to its own path, shortening known paths first
///
/// **Public** - main entry point for trace output
///
/// # Returns
/// Number of events written. An empty trace is not written and returns 0.
///
/// # Errors
/// * `OutputError::InvalidPath` - path is empty or a directory
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
pub fn write_trace(trace: &TraceFile, shortener: &PathShortener) -> Result<usize, OutputError> {
    if trace.is_empty() {
        warn!("No items to serialize");
        return Ok(0);
    }

    let text = trace_to_string(trace)?;
    info!("Serialized JSON ({} events)", trace.len());

    let text = shortener.apply(&text);
    write_atomic(trace.path(), text.as_bytes())?;

    info!(
        "Wrote to {} ({} bytes)",
        trace.path().display(),
        calculate_file_size(trace.path())
    );
    Ok(trace.len())
}

/// Atomically replace `output_path` with `contents`
///
/// Creates parent directories when needed.
pub fn write_atomic(output_path: impl AsRef<Path>, contents: &[u8]) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();
    validate_path(output_path)?;

    let parent = match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !parent.exists() {
        debug!("Creating parent directories: {}", parent.display());
        std::fs::create_dir_all(parent).map_err(|e| {
            OutputError::InvalidPath(format!("Cannot create directory {}: {}", parent.display(), e))
        })?;
    }

    let mut file = NamedTempFile::new_in(parent)?;
    file.write_all(contents)?;
    file.flush()?;
    file.persist(output_path).map_err(|e| OutputError::WriteFailed(e.error))?;
    Ok(())
}

/// Validate that an output path is usable
///
/// **Public** - shared with the snapshot writer
pub fn validate_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

fn calculate_file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
