use crate::utils::config::{FileConfig, DEFAULT_SNAPSHOT_FILE_NAME};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Arguments for the analyze command
///
/// **Public** - built by main.rs from the config file and CLI flags
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    /// Base directory that receives one timestamped folder per run
    pub output_base: PathBuf,

    /// Folders to scan for trace files
    pub folders: Vec<PathBuf>,

    /// Targets to restrict the analysis to (empty = all)
    pub targets: Vec<String>,

    /// Snapshot file or folder to compare against instead of searching
    pub comparison: Option<PathBuf>,

    /// Tag stored in this run's snapshot and used to pick the prior one
    pub comparison_name: String,

    /// Snapshot file name inside each run folder
    pub comparison_file_name: String,

    /// Look up a prior snapshot and print delta reports
    pub compare: bool,

    /// Add per-target/platform breakdowns to the include report
    pub detailed: bool,

    /// Apply the path shortener to the merged trace
    pub shorten_paths: bool,

    /// Long path -> short name substitutions, applied in this order
    pub short_paths: Vec<(String, String)>,

    /// Ids of tools turned off on the command line
    pub disabled_tools: BTreeSet<String>,

    /// Copy the raw traces into `<run>/traces`
    pub gather_traces: bool,

    /// Write serial_trace.json (the serializer still reports its metrics)
    pub write_serial_trace: bool,

    /// Color delta reports
    pub use_color: bool,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            output_base: PathBuf::from("."),
            folders: Vec::new(),
            targets: Vec::new(),
            comparison: None,
            comparison_name: String::new(),
            comparison_file_name: DEFAULT_SNAPSHOT_FILE_NAME.to_string(),
            compare: true,
            detailed: true,
            shorten_paths: true,
            short_paths: Vec::new(),
            disabled_tools: BTreeSet::new(),
            gather_traces: false,
            write_serial_trace: true,
            use_color: true,
        }
    }
}

impl AnalyzeArgs {
    /// Start from the values of a config file
    pub fn from_config(config: FileConfig) -> Self {
        let defaults = Self::default();
        Self {
            output_base: config.output.unwrap_or(defaults.output_base),
            folders: config.folders,
            targets: config.targets,
            comparison_name: config.comparison_name.unwrap_or_default(),
            comparison_file_name: config
                .comparison_file_name
                .unwrap_or(defaults.comparison_file_name),
            short_paths: config.short_paths.into_iter().collect(),
            ..defaults
        }
    }

    pub fn is_tool_enabled(&self, id: &str) -> bool {
        !self.disabled_tools.contains(id)
    }
}

/// Arguments for the compare command
#[derive(Debug, Clone)]
pub struct CompareArgs {
    /// Snapshot of the newer run
    pub current: PathBuf,

    /// Snapshot of the older run
    pub prior: PathBuf,

    pub use_color: bool,
}
