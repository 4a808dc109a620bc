//! Build Trace Studio CLI
//!
//! Build-time analysis for clang -ftime-trace output.
//! Writes reports and a merged timeline per run and compares each run with
//! the previous one.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use std::collections::BTreeSet;
use std::path::PathBuf;

use build_trace_studio::commands::{
    display_tools, display_version, execute_analyze, execute_compare, AnalyzeArgs, CompareArgs,
};
use build_trace_studio::utils::config::{load_config_file, FileConfig};

/// Build Trace Studio - Build-time analysis for clang -ftime-trace
#[derive(Parser, Debug)]
#[command(name = "build-trace")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Disable colored delta reports
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan build folders, run the analysis tools and compare with the last run
    Analyze {
        /// TOML config file with default folders, targets and short paths
        #[arg(short, long, env = "BUILD_TRACE_CONFIG")]
        config: Option<PathBuf>,

        /// Base folder that receives one timestamped folder per run
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Folder to scan for trace files (repeatable)
        #[arg(short, long = "folder")]
        folders: Vec<PathBuf>,

        /// Only analyze this target (repeatable)
        #[arg(short, long = "target")]
        targets: Vec<String>,

        /// Snapshot file, or folder to search, to compare against
        #[arg(long)]
        comparison: Option<PathBuf>,

        /// Name stored with this run; only a prior run with the same name is compared
        #[arg(long)]
        comparison_name: Option<String>,

        /// Do not compare against a previous run
        #[arg(long)]
        no_comparison: bool,

        /// Leave per-target detail out of the include report
        #[arg(long)]
        no_detailed: bool,

        /// Do not shorten known paths in the merged trace
        #[arg(long)]
        no_shorten_paths: bool,

        /// Shorten LONG_PATH to NAME in the merged trace (repeatable)
        #[arg(long = "short-path", value_name = "LONG_PATH=NAME", value_parser = parse_short_path)]
        short_paths: Vec<(String, String)>,

        #[command(flatten)]
        tools: ToolFlags,
    },

    /// Print the delta reports between two saved snapshots
    Compare {
        /// Snapshot of the newer run
        current: PathBuf,

        /// Snapshot of the older run
        prior: PathBuf,
    },

    /// List the analysis tools
    Tools,

    /// Display version information
    Version,
}

/// Switches for individual tools
#[derive(Args, Debug)]
struct ToolFlags {
    /// Skip the most expensive source files report
    #[arg(long)]
    no_expensive_files: bool,

    /// Skip the expensive includes reports
    #[arg(long)]
    no_expensive_includes: bool,

    /// Skip the expensive codegen report
    #[arg(long)]
    no_expensive_codegen: bool,

    /// Copy the raw trace files into the run folder
    #[arg(long)]
    tool_gather: bool,

    /// Skip the per-target timing report
    #[arg(long)]
    no_target_times: bool,

    /// Skip merging the traces into one timeline
    #[arg(long)]
    no_serialize: bool,

    /// Merge and measure, but do not write serial_trace.json
    #[arg(long)]
    no_serialize_write: bool,

    /// Skip the clang phase breakdown
    #[arg(long)]
    no_clang_breakdown: bool,
}

impl ToolFlags {
    fn disabled(&self) -> BTreeSet<String> {
        [
            (self.no_expensive_files, "expensive-files"),
            (self.no_expensive_includes, "expensive-includes"),
            (self.no_expensive_codegen, "expensive-codegen"),
            (self.no_target_times, "target-times"),
            (self.no_serialize, "serialize"),
            (self.no_clang_breakdown, "clang-breakdown"),
        ]
        .into_iter()
        .filter(|(disabled, _)| *disabled)
        .map(|(_, id)| id.to_string())
        .collect()
    }
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let use_color = !cli.no_color;
    if !use_color {
        colored::control::set_override(false);
    }

    // Execute command
    match cli.command {
        Commands::Analyze {
            config,
            output,
            folders,
            targets,
            comparison,
            comparison_name,
            no_comparison,
            no_detailed,
            no_shorten_paths,
            short_paths,
            tools,
        } => {
            // Config file first, command line on top
            let file_config = match &config {
                Some(path) => load_config_file(path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
                None => FileConfig::default(),
            };
            let mut args = AnalyzeArgs::from_config(file_config);

            if let Some(output) = output {
                args.output_base = output;
            }
            args.folders.extend(folders);
            args.targets.extend(targets);
            args.comparison = comparison;
            if let Some(name) = comparison_name {
                args.comparison_name = name;
            }
            args.compare = !no_comparison;
            args.detailed = !no_detailed;
            args.shorten_paths = !no_shorten_paths;
            args.short_paths.extend(short_paths);
            args.disabled_tools = tools.disabled();
            args.gather_traces = tools.tool_gather;
            args.write_serial_trace = !tools.no_serialize_write;
            args.use_color = use_color;

            execute_analyze(args)?;
        }

        Commands::Compare { current, prior } => {
            execute_compare(CompareArgs {
                current,
                prior,
                use_color,
            })?;
        }

        Commands::Tools => {
            display_tools();
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Parse a `LONG_PATH=NAME` pair
///
/// **Private** - clap value parser
fn parse_short_path(value: &str) -> Result<(String, String), String> {
    let (long_path, short_name) = value
        .split_once('=')
        .ok_or_else(|| format!("expected LONG_PATH=NAME, got '{value}'"))?;
    if long_path.is_empty() || short_name.is_empty() {
        return Err(format!("expected LONG_PATH=NAME, got '{value}'"));
    }
    Ok((long_path.to_string(), short_name.to_string()))
}
