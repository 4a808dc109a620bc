//! State shared by every tool during one analysis run.
//!
//! The context owns the run folder, the parsed traces, the summary store
//! being filled in and the prior snapshot it will be compared against.

use crate::aggregator::group_by_target;
use crate::commands::models::AnalyzeArgs;
use crate::diff::{locate_prior, LocatedSnapshot, MetricMap, SnapshotQuery, SummaryStore};
use crate::output::PathShortener;
use crate::parser::TraceFile;
use crate::utils::config::RUN_FOLDER_FORMAT;
use crate::utils::error::SummaryError;
use anyhow::{bail, Context as _, Result};
use chrono::Local;
use log::info;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Everything one analysis run reads and produces
#[derive(Debug)]
pub struct RunContext {
    args: AnalyzeArgs,
    output_path: PathBuf,
    trace_files: Vec<TraceFile>,
    summary: SummaryStore,
    prior: Option<LocatedSnapshot>,
    shortener: PathShortener,
}

impl RunContext {
    /// Create the run folder, named after the current local time
    ///
    /// **Public** - called once by the analyze command
    ///
    /// # Errors
    /// * The output base does not exist, or the run folder already does
    /// * An explicitly named comparison snapshot cannot be loaded
    pub fn initialize(args: AnalyzeArgs) -> Result<Self> {
        let folder_name = Local::now().format(RUN_FOLDER_FORMAT).to_string();
        Self::initialize_in(args, &folder_name)
    }

    /// Same as [`RunContext::initialize`] with a fixed run folder name
    pub fn initialize_in(args: AnalyzeArgs, folder_name: &str) -> Result<Self> {
        if !args.output_base.is_dir() {
            bail!(
                "Output folder does not exist: {}",
                args.output_base.display()
            );
        }

        let output_path = args.output_base.join(folder_name);
        if output_path.exists() {
            bail!(
                "Output folder {} already exists; refusing to overwrite a previous run",
                output_path.display()
            );
        }
        fs::create_dir(&output_path)
            .with_context(|| format!("Failed to create output folder {}", output_path.display()))?;
        info!("Writing results to {}", output_path.display());

        let mut shortener = PathShortener::new(args.shorten_paths);
        for (long_path, short_name) in &args.short_paths {
            shortener.add(long_path.clone(), short_name.clone());
        }

        let prior = if args.compare {
            let name_filter = Some(args.comparison_name.as_str()).filter(|name| !name.is_empty());
            let query = SnapshotQuery {
                current_output: &output_path,
                file_name: &args.comparison_file_name,
                explicit: args.comparison.as_deref(),
                name_filter,
            };
            let prior = locate_prior(&query).context("Failed to load comparison data")?;
            if prior.is_none() {
                info!("No previous run found to compare against");
            }
            prior
        } else {
            None
        };

        let summary = SummaryStore::new(args.comparison_name.clone());

        Ok(Self {
            args,
            output_path,
            trace_files: Vec::new(),
            summary,
            prior,
            shortener,
        })
    }

    pub fn args(&self) -> &AnalyzeArgs {
        &self.args
    }

    /// Folder of this run
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Path of a report inside the run folder
    pub fn output_file(&self, file_name: &str) -> PathBuf {
        self.output_path.join(file_name)
    }

    /// Where this run's snapshot is saved
    pub fn snapshot_path(&self) -> PathBuf {
        self.output_path.join(&self.args.comparison_file_name)
    }

    pub fn is_detailed(&self) -> bool {
        self.args.detailed
    }

    pub fn set_trace_files(&mut self, trace_files: Vec<TraceFile>) {
        self.trace_files = trace_files;
    }

    pub fn trace_files(&self) -> &[TraceFile] {
        &self.trace_files
    }

    /// Trace files grouped by target name
    pub fn by_target(&self) -> BTreeMap<&str, Vec<&TraceFile>> {
        group_by_target(&self.trace_files)
    }

    pub fn shortener(&self) -> &PathShortener {
        &self.shortener
    }

    pub fn summary(&self) -> &SummaryStore {
        &self.summary
    }

    /// Record a tool's metrics for this run
    ///
    /// # Errors
    /// * `SummaryError::DuplicateKey` - the key was already recorded
    pub fn add_summary(&mut self, tool_key: &str, metrics: MetricMap) -> Result<(), SummaryError> {
        self.summary.add(tool_key, metrics)
    }

    pub fn prior(&self) -> Option<&SummaryStore> {
        self.prior.as_ref().map(|located| &located.store)
    }

    pub fn prior_path(&self) -> Option<&Path> {
        self.prior.as_ref().map(|located| located.path.as_path())
    }
}
