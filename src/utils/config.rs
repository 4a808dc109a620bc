//! Configuration and constants for the analyzer.
//!
//! Constants describe the on-disk formats we read and write. The optional
//! TOML file lets a project pin its folders, targets and short paths instead
//! of repeating them on every invocation.

use super::error::ConfigError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Current snapshot schema version, written under [`SNAPSHOT_VERSION_KEY`]
pub const SCHEMA_VERSION: &str = "1.0.0";

// Top-level keys of a -ftime-trace file
pub const KEY_BEGINNING_OF_TIME: &str = "beginningOfTime";
pub const KEY_TRACE_EVENTS: &str = "traceEvents";

// Keys of a single trace event
pub const KEY_NAME: &str = "name";
pub const KEY_TIMESTAMP: &str = "ts";
pub const KEY_DURATION: &str = "dur";
pub const KEY_PROCESS_ID: &str = "pid";
pub const KEY_THREAD_ID: &str = "tid";
pub const KEY_ARGS: &str = "args";
pub const KEY_DETAIL: &str = "detail";

// Event names the analyzer interprets
pub const EVENT_TOTAL_PREFIX: &str = "Total ";
pub const EVENT_TOTAL_EXECUTE_COMPILER: &str = "Total ExecuteCompiler";
pub const EVENT_EXECUTE_COMPILER: &str = "ExecuteCompiler";
pub const EVENT_CODEGEN_FUNCTION: &str = "CodeGen Function";
pub const EVENT_SOURCE: &str = "Source";

/// Suffix of the per-target intermediates directory
pub const BUILD_DIR_SUFFIX: &str = ".build";

/// Folder holding precompiled headers shared across targets
pub const SHARED_PCH_FOLDER: &str = "SharedPrecompiledHeaders";

/// Placeholder for a provenance field that does not apply
pub const NOT_APPLICABLE: &str = "-";

// Snapshot (comparison) file layout
pub const DEFAULT_SNAPSHOT_FILE_NAME: &str = "comparison.json";
pub const SNAPSHOT_NAME_KEY: &str = "*** Name ***";
pub const SNAPSHOT_VERSION_KEY: &str = "*** Version ***";

/// Metric key used by tools for their grand total
pub const SUMMARY_TOTAL_KEY: &str = "*** Total ***";

/// Build-system JSON files that share the extension but are never traces
pub const SKIPPED_FILE_SUFFIXES: &[&str] = &["-outputfilemap.json", "-buildrequest.json"];

/// Extension of candidate trace files (compared case-insensitively)
pub const TRACE_FILE_EXTENSION: &str = "json";

/// Run folder name format; sorts chronologically as a plain string
pub const RUN_FOLDER_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Settings that may come from a TOML file
///
/// Every field is optional; command-line flags take precedence.
///
/// ```toml
/// output = "/tmp/build-analysis"
/// folders = ["/Users/me/Library/Developer/Xcode/DerivedData/App"]
/// targets = ["Networking"]
/// comparison_name = "main"
///
/// [short_paths]
/// "/Users/me/src/app" = "app"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Base directory that receives one timestamped folder per run
    pub output: Option<PathBuf>,

    /// Folders to scan for trace files
    pub folders: Vec<PathBuf>,

    /// Targets to restrict the analysis to
    pub targets: Vec<String>,

    /// Tag stored in the snapshot and used to pick the prior run
    pub comparison_name: Option<String>,

    /// Snapshot file name inside each run folder
    pub comparison_file_name: Option<String>,

    /// Long path -> short name substitutions (applied in key order, before
    /// any given on the command line)
    pub short_paths: BTreeMap<String, String>,
}

/// Load settings from a TOML file
///
/// # Errors
/// * `ConfigError::Io` - If the file cannot be read
/// * `ConfigError::Parse` - If the TOML is invalid or has unknown keys
pub fn load_config_file(path: impl AsRef<Path>) -> Result<FileConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: FileConfig = toml::from_str(&contents)?;
    Ok(config)
}
