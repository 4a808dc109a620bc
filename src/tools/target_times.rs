//! Compile time spent in each target.

use super::AnalysisTool;
use crate::context::RunContext;
use crate::diff::{MetricMap, OutputKind};
use crate::output::write_report;
use crate::parser::TraceFile;
use crate::utils::config::SUMMARY_TOTAL_KEY;
use crate::utils::truncation::{micros_to_millis, micros_to_seconds};
use anyhow::Result;
use log::{info, warn};
use std::collections::BTreeMap;

const SUMMARY_KEY: &str = "Target Times";
const REPORT: &str = "target_timing.txt";

#[derive(Debug, Clone, Copy, Default)]
pub struct TargetTimes;

impl AnalysisTool for TargetTimes {
    fn name(&self) -> &'static str {
        "Determine Target Times"
    }

    fn id(&self) -> &'static str {
        "target-times"
    }

    fn describe(&self) -> &'static str {
        "Breaks down how long each target takes to compile."
    }

    fn run(&mut self, context: &mut RunContext) -> Result<()> {
        let times = target_times(context.trace_files());
        if times.is_empty() {
            warn!("No targets to determine times for");
            return Ok(());
        }
        info!("Found {} targets", times.len());

        write_report(context.output_file(REPORT), &render(&times));

        let summary = to_summary(&times);
        context.add_summary(SUMMARY_KEY, summary)?;
        Ok(())
    }

    fn summary(&self) -> Option<(&'static str, OutputKind)> {
        Some((SUMMARY_KEY, OutputKind::TimeMilliseconds))
    }
}

/// Sum of `Total ExecuteCompiler` durations (µs) per target
fn target_times(traces: &[TraceFile]) -> BTreeMap<String, i64> {
    let mut times = BTreeMap::new();
    for trace in traces {
        let time = times.entry(trace.target().to_string()).or_insert(0);
        *time += trace
            .events()
            .iter()
            .filter(|e| e.is_total_execute_compiler())
            .map(|e| e.duration())
            .sum::<i64>();
    }
    times
}

/// Milliseconds per target plus the grand total
fn to_summary(times: &BTreeMap<String, i64>) -> MetricMap {
    let mut summary: MetricMap = times
        .iter()
        .map(|(target, micros)| (target.clone(), micros_to_millis(*micros) as f64))
        .collect();
    let total: i64 = times.values().sum();
    summary.insert(SUMMARY_TOTAL_KEY.to_string(), micros_to_millis(total) as f64);
    summary
}

fn render(times: &BTreeMap<String, i64>) -> String {
    let mut out = String::from("Total target times (in CPU seconds)\n");
    for (target, micros) in times {
        out.push_str(&format!("{:<50} : {}\n", target, micros_to_seconds(*micros, 2)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{Provenance, TraceEvent};
    use pretty_assertions::assert_eq;

    fn trace(path: &str, target: &str, total: i64) -> TraceFile {
        let mut trace = TraceFile::new(path, Provenance::new(target, "iOS", "arm64"));
        let origin = trace.origin().clone();
        trace.push(TraceEvent::new("Total ExecuteCompiler", 0, total, 1, 1, &origin));
        trace.push(TraceEvent::new("Total Frontend", 0, total / 2, 1, 1, &origin));
        trace
    }

    #[test]
    fn test_times_per_target() {
        let traces = vec![
            trace("/a.json", "Core", 100_000),
            trace("/b.json", "UI", 200_000),
            trace("/c.json", "Core", 1_500),
        ];
        let times = target_times(&traces);
        assert_eq!(times["Core"], 101_500);
        assert_eq!(times["UI"], 200_000);

        let summary = to_summary(&times);
        let expected: MetricMap = [
            ("*** Total ***".to_string(), 301.0),
            ("Core".to_string(), 101.0),
            ("UI".to_string(), 200.0),
        ]
        .into_iter()
        .collect();
        assert_eq!(summary, expected);

        let text = render(&times);
        assert!(text.starts_with("Total target times (in CPU seconds)\n"));
        assert!(text.contains(&format!("{:<50} : 0.2\n", "UI")));
    }
}
