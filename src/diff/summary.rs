//! Per-run summary store and its snapshot file.
//!
//! Each tool contributes one mapping of metric name -> number under its own
//! key. The store is saved as `comparison.json` in the run folder and loaded
//! by later runs as the "prior" side of a delta report.
//!
//! Snapshot layout (keys sorted, 4-space indent):
//!
//! ```json
//! {
//!     "*** Name ***": "nightly",
//!     "*** Version ***": "1.0.0",
//!     "Target Times": {
//!         "*** Total ***": 300,
//!         "Core": 100
//!     }
//! }
//! ```

use crate::output::{to_string_with_indent, write_atomic};
use crate::utils::config::{SCHEMA_VERSION, SNAPSHOT_NAME_KEY, SNAPSHOT_VERSION_KEY};
use crate::utils::error::SummaryError;
use log::debug;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Metric name -> value, ordered for stable output
pub type MetricMap = BTreeMap<String, f64>;

static EMPTY_METRICS: MetricMap = BTreeMap::new();

/// Named metrics contributed by the tools during one run
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStore {
    name: String,
    version: String,
    tools: BTreeMap<String, MetricMap>,
}

impl Default for SummaryStore {
    fn default() -> Self {
        Self::new("")
    }
}

impl SummaryStore {
    /// Create an empty store tagged with `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: SCHEMA_VERSION.to_string(),
            tools: BTreeMap::new(),
        }
    }

    /// Free-form run tag used to match snapshots
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Schema version the store was written with (empty for old snapshots)
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Add the metrics of one tool
    ///
    /// # Errors
    /// * `SummaryError::DuplicateKey` - `tool_key` was already added
    /// * `SummaryError::ReservedKey` - `tool_key` collides with a header key
    pub fn add(&mut self, tool_key: impl Into<String>, metrics: MetricMap) -> Result<(), SummaryError> {
        let tool_key = tool_key.into();
        if is_reserved(&tool_key) {
            return Err(SummaryError::ReservedKey(tool_key));
        }
        if self.tools.contains_key(&tool_key) {
            return Err(SummaryError::DuplicateKey(tool_key));
        }
        self.tools.insert(tool_key, metrics);
        Ok(())
    }

    pub fn get(&self, tool_key: &str) -> Option<&MetricMap> {
        self.tools.get(tool_key)
    }

    /// Metrics for `tool_key`, or an empty map when the tool did not report
    pub fn metrics(&self, tool_key: &str) -> &MetricMap {
        match self.tools.get(tool_key) {
            Some(metrics) => metrics,
            None => {
                debug!("No summary data for '{}' in '{}'", tool_key, self.name);
                &EMPTY_METRICS
            }
        }
    }

    pub fn tool_keys(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Snapshot JSON value
    pub fn to_json(&self) -> Value {
        let mut root = Map::new();
        root.insert(SNAPSHOT_NAME_KEY.to_string(), Value::from(self.name.clone()));
        root.insert(SNAPSHOT_VERSION_KEY.to_string(), Value::from(self.version.clone()));
        for (tool_key, metrics) in &self.tools {
            let object: Map<String, Value> = metrics
                .iter()
                .map(|(key, value)| (key.clone(), metric_to_json(*value)))
                .collect();
            root.insert(tool_key.clone(), Value::Object(object));
        }
        Value::Object(root)
    }

    /// Rebuild a store from snapshot JSON
    ///
    /// # Errors
    /// * `SummaryError::InvalidFormat` - root or a tool entry is not an
    ///   object, or a metric is not a number
    pub fn from_json(value: &Value) -> Result<Self, SummaryError> {
        let Some(root) = value.as_object() else {
            return Err(SummaryError::InvalidFormat("snapshot root is not an object".to_string()));
        };

        let mut store = Self::new("");
        store.version.clear();

        for (key, entry) in root {
            match key.as_str() {
                SNAPSHOT_NAME_KEY => store.name = string_header(key, entry)?,
                SNAPSHOT_VERSION_KEY => store.version = string_header(key, entry)?,
                _ => {
                    let Some(object) = entry.as_object() else {
                        return Err(SummaryError::InvalidFormat(format!(
                            "summary '{key}' is not an object"
                        )));
                    };
                    let mut metrics = MetricMap::new();
                    for (metric, number) in object {
                        let Some(number) = number.as_f64() else {
                            return Err(SummaryError::InvalidFormat(format!(
                                "metric '{metric}' in '{key}' is not a number: {number}"
                            )));
                        };
                        metrics.insert(metric.clone(), number);
                    }
                    store.tools.insert(key.clone(), metrics);
                }
            }
        }

        Ok(store)
    }

    /// Write the snapshot
    ///
    /// # Errors
    /// * `SummaryError::WriteFailed` - serialization or I/O failure
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SummaryError> {
        let mut text = to_string_with_indent(&self.to_json(), b"    ")?;
        text.push('\n');
        write_atomic(path, text.as_bytes())?;
        Ok(())
    }

    /// Read a snapshot
    ///
    /// # Errors
    /// * `SummaryError::ReadFailed` - the file cannot be read
    /// * `SummaryError::DecodeFailed` - invalid JSON
    /// * `SummaryError::InvalidFormat` - see [`SummaryStore::from_json`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SummaryError> {
        let path = path.as_ref();
        debug!("Reading comparison data from {}", path.display());
        let text = fs::read_to_string(path).map_err(|source| SummaryError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value = serde_json::from_str(&text).map_err(|source| SummaryError::DecodeFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&value)
    }
}

fn is_reserved(key: &str) -> bool {
    key == SNAPSHOT_NAME_KEY || key == SNAPSHOT_VERSION_KEY
}

fn string_header(key: &str, value: &Value) -> Result<String, SummaryError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| SummaryError::InvalidFormat(format!("'{key}' is not a string")))
}

/// Whole numbers are written without a fractional part
fn metric_to_json(value: f64) -> Value {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if value.fract() == 0.0 && value.abs() < MAX_EXACT {
        Value::from(value as i64)
    } else {
        Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn metrics(pairs: &[(&str, f64)]) -> MetricMap {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_add_rejects_duplicates() {
        let mut store = SummaryStore::new("run");
        store.add("Target Times", metrics(&[("Core", 1.0)])).unwrap();
        let err = store.add("Target Times", metrics(&[("Core", 2.0)])).unwrap_err();
        assert!(matches!(err, SummaryError::DuplicateKey(ref key) if key == "Target Times"));
        assert_eq!(store.metrics("Target Times")["Core"], 1.0);
    }

    #[test]
    fn test_add_rejects_reserved_keys() {
        let mut store = SummaryStore::new("run");
        assert!(matches!(
            store.add(SNAPSHOT_NAME_KEY, MetricMap::new()),
            Err(SummaryError::ReservedKey(_))
        ));
    }

    #[test]
    fn test_metrics_missing_is_empty() {
        let store = SummaryStore::new("run");
        assert!(store.metrics("nothing").is_empty());
        assert!(store.get("nothing").is_none());
    }

    #[test]
    fn test_to_json_layout() {
        let mut store = SummaryStore::new("nightly");
        store
            .add("Serial Times", metrics(&[("Total CPU seconds", 1.5), ("Count", 3.0)]))
            .unwrap();
        let value = store.to_json();
        assert_eq!(value[SNAPSHOT_NAME_KEY], "nightly");
        assert_eq!(value[SNAPSHOT_VERSION_KEY], SCHEMA_VERSION);
        assert_eq!(value["Serial Times"]["Count"], serde_json::json!(3));
        assert_eq!(value["Serial Times"]["Total CPU seconds"], serde_json::json!(1.5));
    }

    #[test]
    fn test_save_load_round_trip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("comparison.json");

        let mut store = SummaryStore::new("nightly");
        store
            .add("Target Times", metrics(&[("Core", 100.0), ("*** Total ***", 300.0)]))
            .unwrap();
        store.add("Serial Times", metrics(&[("Total CPU seconds", 0.3)])).unwrap();
        store.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n    \"*** Name ***\": \"nightly\""));

        let loaded = SummaryStore::load(&path).unwrap();
        assert_eq!(loaded, store);
    }

    #[test]
    fn test_load_legacy_snapshot_without_version() {
        let value = serde_json::json!({
            "*** Name ***": "",
            "Target Times": { "Core": 12 }
        });
        let store = SummaryStore::from_json(&value).unwrap();
        assert_eq!(store.version(), "");
        assert_eq!(store.metrics("Target Times")["Core"], 12.0);
    }

    #[test]
    fn test_load_rejects_bad_metric() {
        let value = serde_json::json!({ "Target Times": { "Core": "fast" } });
        assert!(matches!(
            SummaryStore::from_json(&value),
            Err(SummaryError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            SummaryStore::load("/definitely/not/comparison.json"),
            Err(SummaryError::ReadFailed { .. })
        ));
    }
}
