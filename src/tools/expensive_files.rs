//! Which source files took longest to compile.

use super::AnalysisTool;
use crate::context::RunContext;
use crate::output::report::section_header;
use crate::output::write_report;
use crate::parser::TraceFile;
use crate::utils::truncation::micros_to_seconds;
use anyhow::Result;
use log::{info, warn};

const REPORT_ALL: &str = "expensive_files.txt";
const REPORT_BY_TARGET: &str = "expensive_files_by_target.txt";

#[derive(Debug, Clone, Copy, Default)]
pub struct ExpensiveFiles;

impl AnalysisTool for ExpensiveFiles {
    fn name(&self) -> &'static str {
        "Most Expensive Source Files"
    }

    fn id(&self) -> &'static str {
        "expensive-files"
    }

    fn describe(&self) -> &'static str {
        "Lists the source files that were the most expensive to compile."
    }

    fn run(&mut self, context: &mut RunContext) -> Result<()> {
        if context.trace_files().is_empty() {
            warn!("No timing items to analyze");
            return Ok(());
        }

        info!("Writing summary files sorted by time...");

        let all = sorted_by_time(context.trace_files().iter())?;
        write_report(context.output_file(REPORT_ALL), &render(&[("", all)]));

        let mut groups = Vec::new();
        for (target, traces) in context.by_target() {
            groups.push((target, sorted_by_time(traces.into_iter())?));
        }
        write_report(context.output_file(REPORT_BY_TARGET), &render(&groups));

        Ok(())
    }
}

/// Pair each trace with its total time, longest first
fn sorted_by_time<'a>(traces: impl Iterator<Item = &'a TraceFile>) -> Result<Vec<(i64, &'a TraceFile)>> {
    let mut timed = traces
        .map(|trace| Ok((trace.total_time()?, trace)))
        .collect::<Result<Vec<_>>>()?;
    timed.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(timed)
}

fn render(groups: &[(&str, Vec<(i64, &TraceFile)>)]) -> String {
    let mut out = String::new();
    for (title, traces) in groups {
        out.push_str(&section_header(title, &format!("{:>12}  {}", "seconds", "filename")));
        for (total, trace) in traces {
            out.push_str(&format!(
                "{:>12}  {}\n",
                micros_to_seconds(*total, 4),
                trace.name()
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{Provenance, TraceEvent};

    fn trace(path: &str, target: &str, total: i64) -> TraceFile {
        let mut trace = TraceFile::new(path, Provenance::new(target, "iOS", "arm64"));
        let origin = trace.origin().clone();
        trace.push(TraceEvent::new("Total ExecuteCompiler", 0, total, 1, 1, &origin));
        trace
    }

    #[test]
    fn test_longest_file_first() {
        let traces = vec![
            trace("/x/fast.json", "Core", 100_000),
            trace("/x/slow.json", "Core", 2_500_000),
        ];
        let sorted = sorted_by_time(traces.iter()).unwrap();
        let text = render(&[("Core", sorted)]);

        let slow = text.find("slow.json").unwrap();
        let fast = text.find("fast.json").unwrap();
        assert!(slow < fast);
        assert!(text.contains("         2.5  slow.json\n"));
        assert!(text.contains("         0.1  fast.json\n"));
    }
}
