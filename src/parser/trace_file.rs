//! Parser for one `-ftime-trace` file.
//!
//! Parses the JSON clang writes per compiled source file into a
//! [`TraceFile`]. The schema check is strict on purpose: build folders are
//! full of unrelated `.json` files, and a top-level object with exactly
//! `beginningOfTime` and `traceEvents` is what tells a trace apart.

use super::event::{file_name_of, parse_json_i64, TraceEvent, TraceOrigin};
use super::provenance::Provenance;
use crate::utils::config::{EVENT_TOTAL_EXECUTE_COMPILER, KEY_BEGINNING_OF_TIME, KEY_TRACE_EVENTS};
use crate::utils::error::{MergeError, ParseError};
use log::debug;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// All events recorded for one compiled source file
///
/// Also used as the accumulator of the merge engine, in which case it holds
/// events from many origins and a cumulative offset.
#[derive(Debug, Clone)]
pub struct TraceFile {
    origin: Rc<TraceOrigin>,
    beginning_of_time: i64,
    events: Vec<TraceEvent>,
    cumulative_offset: i64,
    merged: bool,
}

impl TraceFile {
    /// Create an empty trace
    pub fn new(path: impl Into<PathBuf>, provenance: Provenance) -> Self {
        Self {
            origin: Rc::new(TraceOrigin::new(path, provenance)),
            beginning_of_time: 0,
            events: Vec::new(),
            cumulative_offset: 0,
            merged: false,
        }
    }

    /// Create an empty accumulator for merging; it belongs to no target
    pub fn aggregate(path: impl Into<PathBuf>) -> Self {
        Self {
            merged: true,
            ..Self::new(path, Provenance::not_applicable())
        }
    }

    /// Read and parse a trace file from disk
    ///
    /// **Public** - main entry point for parsing
    ///
    /// # Errors
    /// See [`TraceFile::from_bytes`]; additionally `ParseError::Unreadable`
    /// when the file cannot be read.
    pub fn read(path: impl AsRef<Path>, provenance: Provenance) -> Result<Self, ParseError> {
        let path = path.as_ref();
        debug!("Reading {}", path.display());
        let bytes = fs::read(path).map_err(|source| ParseError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(path, provenance, &bytes)
    }

    /// Parse trace bytes that were read from `path`
    ///
    /// # Errors
    /// * `ParseError::NotUtf8`, `InvalidJson`, `NotAnObject`, `MissingKey`,
    ///   `InvalidStartTime`, `UnexpectedKeys` - not a trace; skip the file
    /// * `ParseError::MissingField`, `InvalidField` - a trace we cannot read;
    ///   abort the run
    pub fn from_bytes(
        path: impl Into<PathBuf>,
        provenance: Provenance,
        bytes: &[u8],
    ) -> Result<Self, ParseError> {
        let path = path.into();
        let text = std::str::from_utf8(bytes).map_err(|_| ParseError::NotUtf8(path.clone()))?;
        let data: Value = serde_json::from_str(text).map_err(|source| ParseError::InvalidJson {
            path: path.clone(),
            source,
        })?;

        let Some(object) = data.as_object() else {
            return Err(ParseError::NotAnObject(path));
        };

        for key in [KEY_BEGINNING_OF_TIME, KEY_TRACE_EVENTS] {
            if !object.contains_key(key) {
                return Err(ParseError::MissingKey { path, key });
            }
        }
        if object.len() != 2 {
            return Err(ParseError::UnexpectedKeys {
                path,
                keys: object.keys().cloned().collect(),
            });
        }

        let start = &object[KEY_BEGINNING_OF_TIME];
        let beginning_of_time =
            parse_json_i64(start).ok_or_else(|| ParseError::InvalidStartTime {
                path: path.clone(),
                key: KEY_BEGINNING_OF_TIME,
                value: start.to_string(),
            })?;

        let origin = Rc::new(TraceOrigin::new(path, provenance));
        let events = match &object[KEY_TRACE_EVENTS] {
            Value::Array(items) => items
                .iter()
                .map(|item| TraceEvent::from_json(item, &origin))
                .collect::<Result<Vec<_>, _>>()?,
            _ => {
                return Err(ParseError::MissingKey {
                    path: origin.path.clone(),
                    key: KEY_TRACE_EVENTS,
                })
            }
        };

        debug!("Parsed {} events from {}", events.len(), origin.path.display());

        Ok(Self {
            origin,
            beginning_of_time,
            events,
            cumulative_offset: 0,
            merged: false,
        })
    }

    /// Path of the raw trace emitted by the compiler (not the compiled source)
    pub fn path(&self) -> &Path {
        &self.origin.path
    }

    /// File name of the trace
    pub fn name(&self) -> String {
        file_name_of(&self.origin.path)
    }

    pub fn provenance(&self) -> &Provenance {
        &self.origin.provenance
    }

    pub fn target(&self) -> &str {
        &self.origin.provenance.target
    }

    pub fn platform(&self) -> &str {
        &self.origin.provenance.platform
    }

    pub fn arch(&self) -> &str {
        &self.origin.provenance.arch
    }

    pub fn beginning_of_time(&self) -> i64 {
        self.beginning_of_time
    }

    /// Events in the order they appeared in the file
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Sum of the totals of every trace merged into this one
    pub fn cumulative_offset(&self) -> i64 {
        self.cumulative_offset
    }

    /// Total compile time of this trace in microseconds
    ///
    /// For a merge accumulator this is the cumulative offset, even when it is
    /// zero; otherwise it is the end time of the `Total ExecuteCompiler` event
    /// (0 when there is none).
    ///
    /// # Errors
    /// * `MergeError::MultipleTotals` - more than one `Total ExecuteCompiler`
    ///   in a trace that is not a merge accumulator
    pub fn total_time(&self) -> Result<i64, MergeError> {
        if self.merged {
            return Ok(self.cumulative_offset);
        }
        self.sentinel_total()
    }

    /// End time of the single `Total ExecuteCompiler` event, ignoring any offset
    pub(crate) fn sentinel_total(&self) -> Result<i64, MergeError> {
        let mut totals = self.events.iter().filter(|e| e.is_total_execute_compiler());
        let Some(first) = totals.next() else {
            return Ok(0);
        };
        let extra = totals.count();
        if extra > 0 {
            return Err(MergeError::MultipleTotals {
                file: self.name(),
                name: EVENT_TOTAL_EXECUTE_COMPILER,
                count: extra + 1,
            });
        }
        Ok(first.end_time())
    }

    /// Append an event (merge engine and tests)
    pub fn push(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    /// Origin shared with events created for this trace
    pub fn origin(&self) -> &Rc<TraceOrigin> {
        &self.origin
    }

    pub(crate) fn set_beginning_of_time(&mut self, value: i64) {
        self.beginning_of_time = value;
    }

    pub(crate) fn advance_offset(&mut self, by: i64) {
        self.cumulative_offset += by;
    }
}
