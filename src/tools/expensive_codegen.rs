//! Functions that take longest to generate code for.

use super::AnalysisTool;
use crate::context::RunContext;
use crate::diff::{MetricMap, OutputKind};
use crate::output::report::section_header;
use crate::output::write_report;
use crate::parser::TraceEvent;
use crate::utils::config::SUMMARY_TOTAL_KEY;
use crate::utils::truncation::micros_to_millis;
use anyhow::Result;
use log::{info, warn};
use std::collections::BTreeMap;

const SUMMARY_KEY: &str = "CodeGen Times";
const REPORT_BY_TARGET: &str = "expensive_codegen_by_target.txt";
const TOP_COUNT: usize = 20;

#[derive(Debug, Clone, Copy, Default)]
pub struct ExpensiveCodegen;

/// `CodeGen Function` events worth reporting, plus the time of all of them
#[derive(Debug, Default)]
struct CodegenItems<'a> {
    total_micros: i64,
    items: Vec<&'a TraceEvent>,
    by_target: BTreeMap<&'a str, Vec<&'a TraceEvent>>,
}

impl AnalysisTool for ExpensiveCodegen {
    fn name(&self) -> &'static str {
        "Expensive CodeGen"
    }

    fn id(&self) -> &'static str {
        "expensive-codegen"
    }

    fn describe(&self) -> &'static str {
        "Lists the functions that take the longest to generate code for."
    }

    fn run(&mut self, context: &mut RunContext) -> Result<()> {
        let found = collect(context.trace_files().iter().flat_map(|t| t.events()));
        info!(
            "Found {} codegen items ({}ms)",
            found.items.len(),
            micros_to_millis(found.total_micros)
        );

        info!("   {:>10}  {:>35}   {}", "Time", "Target", "Function");
        for event in found.items.iter().take(TOP_COUNT) {
            info!(
                "   {:>10}  {:>35}   {}",
                format!("{}ms", micros_to_millis(event.duration())),
                event.target(),
                event.detail().unwrap_or_default()
            );
        }

        write_report(context.output_file(REPORT_BY_TARGET), &render_by_target(&found.by_target));

        let total_millis = found.total_micros as f64 / 1000.0;

        let mut summary = MetricMap::new();
        summary.insert(SUMMARY_TOTAL_KEY.to_string(), total_millis);
        context.add_summary(SUMMARY_KEY, summary)?;
        Ok(())
    }

    fn summary(&self) -> Option<(&'static str, OutputKind)> {
        Some((SUMMARY_KEY, OutputKind::TimeMilliseconds))
    }
}

/// Keep codegen events of at least 1ms that name their function, longest first
fn collect<'a>(events: impl Iterator<Item = &'a TraceEvent>) -> CodegenItems<'a> {
    let mut found = CodegenItems::default();

    for event in events.filter(|e| e.is_codegen_function()) {
        found.total_micros += event.duration();
        if micros_to_millis(event.duration()) == 0 {
            continue;
        }
        if event.detail().map_or(true, str::is_empty) {
            warn!("No function name associated with codegen item");
            continue;
        }
        found.items.push(event);
        found.by_target.entry(event.target()).or_default().push(event);
    }

    found.items.sort_by(|a, b| b.duration().cmp(&a.duration()));
    for items in found.by_target.values_mut() {
        items.sort_by(|a, b| b.duration().cmp(&a.duration()));
    }
    found
}

fn render_by_target(by_target: &BTreeMap<&str, Vec<&TraceEvent>>) -> String {
    let mut out = String::new();
    for (target, events) in by_target {
        out.push_str(&section_header(target, &format!("{:>12}   {}", "milliseconds", "function")));
        for event in events {
            out.push_str(&format!(
                "{:>12}   {}\n",
                micros_to_millis(event.duration()),
                event.detail().unwrap_or_default()
            ));
        }
        out.push('\n');
    }
    out
}
