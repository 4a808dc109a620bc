//! A single span from a `-ftime-trace` file.
//!
//! Clang emits Chrome trace-format events. We only interpret a handful of
//! fields; everything else is kept verbatim so a merged trace still carries
//! whatever the compiler wrote.

use super::provenance::Provenance;
use crate::utils::config::{
    EVENT_CODEGEN_FUNCTION, EVENT_EXECUTE_COMPILER, EVENT_SOURCE, EVENT_TOTAL_EXECUTE_COMPILER,
    EVENT_TOTAL_PREFIX, KEY_ARGS, KEY_DETAIL, KEY_DURATION, KEY_NAME, KEY_PROCESS_ID,
    KEY_THREAD_ID, KEY_TIMESTAMP,
};
use crate::utils::error::ParseError;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// The trace file an event was read from
///
/// Shared by every event of that file so an event can still name its file,
/// target and architecture after it has been merged into another trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceOrigin {
    pub path: PathBuf,
    pub provenance: Provenance,
}

impl TraceOrigin {
    pub fn new(path: impl Into<PathBuf>, provenance: Provenance) -> Self {
        Self {
            path: path.into(),
            provenance,
        }
    }

    /// File name of the trace, or the whole path when it has none
    pub fn file_name(&self) -> String {
        file_name_of(&self.path)
    }
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// One instrumented span
///
/// Timestamps and durations are in microseconds.
#[derive(Debug, Clone)]
pub struct TraceEvent {
    name: String,
    detail: Option<String>,
    timestamp: i64,
    duration: i64,
    pid: i64,
    tid: i64,
    origin: Rc<TraceOrigin>,
    raw: Map<String, Value>,
}

impl TraceEvent {
    /// Parse one element of `traceEvents`
    ///
    /// # Errors
    /// * `ParseError::MissingField` - `ts`, `pid` or `tid` is absent
    /// * `ParseError::InvalidField` - one of them is not an integer, or the
    ///   event is not an object
    ///
    /// Both are fatal: clang always writes these fields, so their absence
    /// means an unsupported trace format rather than a stray file.
    pub fn from_json(value: &Value, origin: &Rc<TraceOrigin>) -> Result<Self, ParseError> {
        let Some(raw) = value.as_object() else {
            return Err(ParseError::InvalidField {
                path: origin.path.clone(),
                field: "event",
                value: value.to_string(),
            });
        };

        let timestamp = read_int(raw, KEY_TIMESTAMP, &origin.path)?;
        let pid = read_int(raw, KEY_PROCESS_ID, &origin.path)?;
        let tid = read_int(raw, KEY_THREAD_ID, &origin.path)?;
        let duration = if raw.contains_key(KEY_DURATION) {
            read_int(raw, KEY_DURATION, &origin.path)?
        } else {
            0
        };

        let name = raw
            .get(KEY_NAME)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let detail = raw
            .get(KEY_ARGS)
            .and_then(|args| args.get(KEY_DETAIL))
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self {
            name,
            detail,
            timestamp,
            duration,
            pid,
            tid,
            origin: Rc::clone(origin),
            raw: raw.clone(),
        })
    }

    /// Build an event without a JSON source (tests and synthetic traces)
    pub fn new(
        name: impl Into<String>,
        timestamp: i64,
        duration: i64,
        pid: i64,
        tid: i64,
        origin: &Rc<TraceOrigin>,
    ) -> Self {
        let name = name.into();
        let mut raw = Map::new();
        raw.insert(KEY_NAME.to_string(), Value::from(name.clone()));
        raw.insert(KEY_DURATION.to_string(), Value::from(duration));
        Self {
            name,
            detail: None,
            timestamp,
            duration,
            pid,
            tid,
            origin: Rc::clone(origin),
            raw,
        }
    }

    /// Attach a detail label, as clang does under `args.detail`
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        let mut args = Map::new();
        args.insert(KEY_DETAIL.to_string(), Value::from(detail.clone()));
        self.raw.insert(KEY_ARGS.to_string(), Value::Object(args));
        self.detail = Some(detail);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Secondary label: included path, function name or source path
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn duration(&self) -> i64 {
        self.duration
    }

    /// Timestamp at which the span ends
    pub fn end_time(&self) -> i64 {
        self.timestamp + self.duration
    }

    pub fn pid(&self) -> i64 {
        self.pid
    }

    pub fn tid(&self) -> i64 {
        self.tid
    }

    pub fn origin(&self) -> &TraceOrigin {
        &self.origin
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

    /// `Total <category>` summary span
    pub fn is_total(&self) -> bool {
        self.name.starts_with(EVENT_TOTAL_PREFIX)
    }

    pub fn is_total_execute_compiler(&self) -> bool {
        self.name == EVENT_TOTAL_EXECUTE_COMPILER
    }

    pub fn is_execute_compiler(&self) -> bool {
        self.name == EVENT_EXECUTE_COMPILER
    }

    pub fn is_codegen_function(&self) -> bool {
        self.name == EVENT_CODEGEN_FUNCTION
    }

    /// Time spent parsing one included or compiled source file
    pub fn is_source(&self) -> bool {
        self.name == EVENT_SOURCE
    }

    /// Category of a `Total <category>` event, e.g. `Frontend`
    pub fn short_total_name(&self) -> Option<&str> {
        self.name.strip_prefix(EVENT_TOTAL_PREFIX)
    }

    /// Copy of this event moved along the timeline and onto another thread
    pub(crate) fn relocated(&self, offset: i64, pid: i64, tid: i64) -> Self {
        Self {
            timestamp: self.timestamp + offset,
            pid,
            tid,
            ..self.clone()
        }
    }

    /// JSON object for serialization
    ///
    /// Unknown keys are preserved. `ExecuteCompiler` spans are renamed to
    /// carry their source file name so they stay distinguishable once many
    /// files share one thread.
    pub fn to_json(&self) -> Value {
        let mut object = self.raw.clone();
        if self.is_execute_compiler() {
            let renamed = format!("{} - {}", self.name, self.origin.file_name());
            object.insert(KEY_NAME.to_string(), Value::from(renamed));
        }
        object.insert(KEY_TIMESTAMP.to_string(), Value::from(self.timestamp));
        object.insert(KEY_PROCESS_ID.to_string(), Value::from(self.pid));
        object.insert(KEY_THREAD_ID.to_string(), Value::from(self.tid));
        Value::Object(object)
    }
}

/// Read an integer field that may be a JSON number or a numeric string
fn read_int(object: &Map<String, Value>, key: &'static str, path: &Path) -> Result<i64, ParseError> {
    let Some(value) = object.get(key) else {
        return Err(ParseError::MissingField {
            path: path.to_path_buf(),
            field: key,
            event: Value::Object(object.clone()).to_string(),
        });
    };

    parse_json_i64(value).ok_or_else(|| ParseError::InvalidField {
        path: path.to_path_buf(),
        field: key,
        value: value.to_string(),
    })
}

/// Integer from a JSON number (fractions truncated) or a decimal string
pub(crate) fn parse_json_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn origin() -> Rc<TraceOrigin> {
        Rc::new(TraceOrigin::new(
            "/p/Debug/App.build/Objects-normal/arm64/main.json",
            Provenance::new("App", "Debug", "arm64"),
        ))
    }

    #[test]
    fn test_parse_full_event() {
        let value = json!({
            "name": "Source",
            "ts": 120,
            "dur": 30,
            "pid": 7,
            "tid": 9,
            "ph": "X",
            "args": { "detail": "/usr/include/stdio.h" }
        });

        let event = TraceEvent::from_json(&value, &origin()).unwrap();
        assert_eq!(event.name(), "Source");
        assert_eq!(event.timestamp(), 120);
        assert_eq!(event.duration(), 30);
        assert_eq!(event.end_time(), 150);
        assert_eq!((event.pid(), event.tid()), (7, 9));
        assert_eq!(event.detail(), Some("/usr/include/stdio.h"));
        assert!(event.is_source());
        assert_eq!(event.target(), "App");
    }

    #[test]
    fn test_duration_defaults_to_zero() {
        let value = json!({ "name": "Frontend", "ts": 5, "pid": 1, "tid": 1 });
        let event = TraceEvent::from_json(&value, &origin()).unwrap();
        assert_eq!(event.duration(), 0);
        assert!(event.detail().is_none());
    }

    #[test]
    fn test_timestamp_as_string() {
        let value = json!({ "name": "Frontend", "ts": "1234", "pid": 1, "tid": "2" });
        let event = TraceEvent::from_json(&value, &origin()).unwrap();
        assert_eq!(event.timestamp(), 1234);
        assert_eq!(event.tid(), 2);
    }

    #[test]
    fn test_missing_timestamp_is_fatal() {
        let value = json!({ "name": "Frontend", "pid": 1, "tid": 1 });
        let err = TraceEvent::from_json(&value, &origin()).unwrap_err();
        assert!(matches!(err, ParseError::MissingField { field: "ts", .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_garbage_pid_is_fatal() {
        let value = json!({ "name": "Frontend", "ts": 1, "pid": "seven", "tid": 1 });
        let err = TraceEvent::from_json(&value, &origin()).unwrap_err();
        assert!(matches!(err, ParseError::InvalidField { field: "pid", .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_total_names() {
        let origin = origin();
        let total = TraceEvent::new("Total Frontend", 0, 10, 1, 1, &origin);
        assert!(total.is_total());
        assert_eq!(total.short_total_name(), Some("Frontend"));

        let sentinel = TraceEvent::new("Total ExecuteCompiler", 0, 10, 1, 1, &origin);
        assert!(sentinel.is_total_execute_compiler());
        assert!(!sentinel.is_execute_compiler());

        let plain = TraceEvent::new("CodeGen Function", 0, 10, 1, 1, &origin);
        assert!(plain.short_total_name().is_none());
        assert!(plain.is_codegen_function());
    }

    #[test]
    fn test_to_json_renames_execute_compiler() {
        let origin = origin();
        let event = TraceEvent::new("ExecuteCompiler", 10, 90, 3, 4, &origin).relocated(100, 1, 2);
        let value = event.to_json();
        assert_eq!(value["name"], "ExecuteCompiler - main.json");
        assert_eq!(value["ts"], 110);
        assert_eq!(value["dur"], 90);
        assert_eq!(value["pid"], 1);
        assert_eq!(value["tid"], 2);
    }

    #[test]
    fn test_to_json_keeps_unknown_keys() {
        let value = json!({ "name": "Frontend", "ts": 5, "pid": 1, "tid": 1, "ph": "X", "cat": "x" });
        let event = TraceEvent::from_json(&value, &origin()).unwrap();
        let out = event.to_json();
        assert_eq!(out["ph"], "X");
        assert_eq!(out["cat"], "x");
        assert_eq!(out["name"], "Frontend");
    }
}
