//! Where clang spends its time, by `Total <category>` event.

use super::AnalysisTool;
use crate::aggregator::sum_durations_by;
use crate::context::RunContext;
use crate::diff::{MetricMap, OutputKind};
use crate::parser::TraceFile;
use crate::utils::config::SUMMARY_TOTAL_KEY;
use crate::utils::truncation::{micros_to_millis, micros_to_seconds};
use anyhow::Result;
use log::info;

const SUMMARY_KEY: &str = "Clang Breakdown";

#[derive(Debug, Clone, Copy, Default)]
pub struct ClangBreakdown;

impl AnalysisTool for ClangBreakdown {
    fn name(&self) -> &'static str {
        "Clang Breakdown"
    }

    fn id(&self) -> &'static str {
        "clang-breakdown"
    }

    fn describe(&self) -> &'static str {
        "Shows a breakdown of the steps clang is spending time on."
    }

    fn run(&mut self, context: &mut RunContext) -> Result<()> {
        let summary = breakdown(context.trace_files());
        context.add_summary(SUMMARY_KEY, summary)?;
        Ok(())
    }

    fn summary(&self) -> Option<(&'static str, OutputKind)> {
        Some((SUMMARY_KEY, OutputKind::TimeMilliseconds))
    }
}

/// Milliseconds per category, skipping those under 10ms, plus the total
fn breakdown(traces: &[TraceFile]) -> MetricMap {
    let sums = sum_durations_by(traces, |_, event| event.short_total_name());

    let mut summary = MetricMap::new();
    let mut total = 0;
    for (category, micros) in sums {
        total += micros;
        let seconds = micros_to_seconds(micros, 2);
        if seconds == 0.0 {
            continue;
        }
        info!("{:>40} {} seconds", category, seconds);
        summary.insert(category.to_string(), micros_to_millis(micros) as f64);
    }
    summary.insert(SUMMARY_TOTAL_KEY.to_string(), micros_to_millis(total) as f64);
    summary
}
