//! Analyze command implementation.
//!
//! The analyze command:
//! 1. Creates the run folder and finds the prior snapshot
//! 2. Scans the build folders for trace files
//! 3. Runs every enabled tool
//! 4. Prints delta reports against the prior run
//! 5. Saves this run's snapshot

use super::models::AnalyzeArgs;
use super::scan::scan_for_traces;
use crate::context::RunContext;
use crate::diff::render_delta_report;
use crate::tools::{registry, AnalysisTool, Tool};
use anyhow::{bail, Context, Result};
use log::{debug, info};
use std::time::Instant;

/// Validate analyze arguments before touching the file system
///
/// **Public** - called from main.rs
pub fn validate_args(args: &AnalyzeArgs) -> Result<()> {
    if args.folders.is_empty() {
        bail!("No folders to scan; pass --folder or set `folders` in the config file");
    }

    if args.comparison_file_name.trim().is_empty() {
        bail!("Comparison file name cannot be empty");
    }

    let known: Vec<&str> = registry().iter().map(|t| t.id()).collect();
    if let Some(unknown) = args.disabled_tools.iter().find(|id| !known.contains(&id.as_str())) {
        bail!("Unknown tool '{}'; known tools: {}", unknown, known.join(", "));
    }

    Ok(())
}

/// Execute the analyze command
///
/// **Public** - main entry point called from main.rs
///
/// # Returns
/// The finished run context (run folder, traces and summary)
///
/// # Errors
/// * Invalid arguments or output folder
/// * Fatal parse or merge errors
/// * Failure to write the merged trace or the snapshot
pub fn execute_analyze(args: AnalyzeArgs) -> Result<RunContext> {
    validate_args(&args)?;
    let context = RunContext::initialize(args)?;
    run_analysis(context)
}

/// Steps 2-5 on an already initialized context
pub fn run_analysis(mut context: RunContext) -> Result<RunContext> {
    let start_time = Instant::now();

    info!("Step 1/4: Scanning for trace files...");
    let traces = scan_for_traces(&context.args().folders, &context.args().targets)
        .context("Failed to scan for trace files")?;
    context.set_trace_files(traces);
    context.shortener().log_paths();

    info!("Step 2/4: Running tools...");
    let mut tools = enabled_tools(&context);
    for tool in &mut tools {
        let tool_start = Instant::now();
        info!("[{}]", tool.name());
        tool.run(&mut context)
            .with_context(|| format!("{} failed", tool.name()))?;
        debug!("{} took {:?}", tool.name(), tool_start.elapsed());
    }

    info!("Step 3/4: Comparing with the previous run...");
    report_deltas(&context, &tools);

    info!("Step 4/4: Saving comparison data...");
    let snapshot_path = context.snapshot_path();
    context
        .summary()
        .save(&snapshot_path)
        .context("Failed to save comparison data")?;
    info!("Wrote to {}", snapshot_path.display());

    info!(
        "Analyzed {} trace files in {:.2}s",
        context.trace_files().len(),
        start_time.elapsed().as_secs_f64()
    );
    info!("Results are in {}", context.output_path().display());

    Ok(context)
}

/// Registry tools not disabled on the command line, configured
fn enabled_tools(context: &RunContext) -> Vec<Tool> {
    let args = context.args();
    registry()
        .into_iter()
        .filter(|tool| {
            let enabled = args.is_tool_enabled(tool.id());
            if !enabled {
                info!("Skipping {} (disabled)", tool.name());
            }
            enabled
        })
        .map(|mut tool| {
            tool.configure(args);
            tool
        })
        .collect()
}

fn report_deltas(context: &RunContext, tools: &[Tool]) {
    let Some(prior) = context.prior() else {
        info!("No comparison data; skipping delta reports");
        return;
    };
    if let Some(path) = context.prior_path() {
        info!("Comparing against {}", path.display());
    }

    let use_color = context.args().use_color;
    for tool in tools {
        if let Some(report) = tool.report_delta(context.summary(), prior) {
            println!("{}", render_delta_report(&report, use_color));
        }
    }
}
