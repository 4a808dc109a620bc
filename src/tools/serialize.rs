//! One merged trace for the whole build.
//!
//! Lays every compiled file end to end (see [`merge_all`]) so the build can
//! be opened as a single timeline in chrome://tracing, Perfetto or
//! speedscope.

use super::AnalysisTool;
use crate::aggregator::merge_all;
use crate::commands::models::AnalyzeArgs;
use crate::context::RunContext;
use crate::diff::{MetricMap, OutputKind};
use crate::output::write_trace;
use crate::utils::truncation::{micros_to_seconds, truncate_to_place};
use anyhow::{Context, Result};
use log::info;

const SUMMARY_KEY: &str = "Serial Times";
const TOTAL_CPU_SECONDS: &str = "Total CPU seconds";
const AVERAGE_CPU_SECONDS: &str = "Average CPU second per item";
const SERIAL_TRACE: &str = "serial_trace.json";

#[derive(Debug, Clone)]
pub struct SerializeTrace {
    /// Write serial_trace.json; the metrics are recorded either way
    write: bool,
}

impl Default for SerializeTrace {
    fn default() -> Self {
        Self { write: true }
    }
}

impl AnalysisTool for SerializeTrace {
    fn name(&self) -> &'static str {
        "Trace Serializer"
    }

    fn id(&self) -> &'static str {
        "serialize"
    }

    fn describe(&self) -> &'static str {
        "Combines every source file into a single trace that can be viewed as one timeline."
    }

    fn configure(&mut self, args: &AnalyzeArgs) {
        self.write = args.write_serial_trace;
    }

    fn run(&mut self, context: &mut RunContext) -> Result<()> {
        let merged = merge_all(context.output_file(SERIAL_TRACE), context.trace_files())
            .context("Could not merge traces")?;

        if self.write {
            write_trace(&merged, context.shortener()).context("Could not serialize trace")?;
        }

        let total_seconds = micros_to_seconds(merged.total_time()?, 4);
        let count = context.trace_files().len().max(1);
        let average_seconds = truncate_to_place(total_seconds / count as f64, 2);

        info!("Took {} CPU seconds", total_seconds);
        info!("{} CPU seconds per build item", average_seconds);

        let mut summary = MetricMap::new();
        summary.insert(TOTAL_CPU_SECONDS.to_string(), total_seconds);
        summary.insert(AVERAGE_CPU_SECONDS.to_string(), average_seconds);
        context.add_summary(SUMMARY_KEY, summary)?;
        Ok(())
    }

    fn summary(&self) -> Option<(&'static str, OutputKind)> {
        Some((SUMMARY_KEY, OutputKind::TimeCpuSeconds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{Provenance, TraceEvent, TraceFile};

    fn context_with(write: bool, totals: &[i64]) -> (tempfile::TempDir, RunContext, SerializeTrace) {
        let base = tempfile::tempdir().unwrap();
        let args = AnalyzeArgs {
            output_base: base.path().to_path_buf(),
            write_serial_trace: write,
            ..AnalyzeArgs::default()
        };
        let mut tool = SerializeTrace::default();
        tool.configure(&args);

        let mut context = RunContext::initialize_in(args, "run").unwrap();
        let traces = totals
            .iter()
            .enumerate()
            .map(|(i, total)| {
                let mut trace = TraceFile::new(
                    format!("/t/{i}.json"),
                    Provenance::new("Core", "iOS", "arm64"),
                );
                let origin = trace.origin().clone();
                trace.push(TraceEvent::new("Total ExecuteCompiler", 0, *total, 1, 1, &origin));
                trace
            })
            .collect();
        context.set_trace_files(traces);
        (base, context, tool)
    }

    #[test]
    fn test_serializer_records_cpu_seconds() {
        let (_base, mut context, mut tool) = context_with(true, &[1_500_000, 2_000_000]);
        tool.run(&mut context).unwrap();

        assert!(context.output_file(SERIAL_TRACE).is_file());
        let metrics = context.summary().metrics(SUMMARY_KEY);
        assert_eq!(metrics[TOTAL_CPU_SECONDS], 3.5);
        assert_eq!(metrics[AVERAGE_CPU_SECONDS], 1.75);
    }

    #[test]
    fn test_serializer_without_write() {
        let (_base, mut context, mut tool) = context_with(false, &[1_000_000]);
        tool.run(&mut context).unwrap();

        assert!(!context.output_file(SERIAL_TRACE).exists());
        assert_eq!(context.summary().metrics(SUMMARY_KEY)[TOTAL_CPU_SECONDS], 1.0);
    }

    #[test]
    fn test_serializer_with_no_traces() {
        let (_base, mut context, mut tool) = context_with(true, &[]);
        tool.run(&mut context).unwrap();
        assert_eq!(context.summary().metrics(SUMMARY_KEY)[TOTAL_CPU_SECONDS], 0.0);
    }
}
