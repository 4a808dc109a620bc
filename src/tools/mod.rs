//! Analysis tools run over the parsed traces.
//!
//! Each tool reads the [`RunContext`], writes its report files into the run
//! folder and may record metrics in the summary store. Tools that record
//! metrics can also print a delta report against the prior run.
//!
//! The registry order is the run order: the reports are cheap, the trace
//! serializer is the slow one and runs near the end.

mod clang_breakdown;
mod expensive_codegen;
mod expensive_files;
mod expensive_includes;
mod gather;
mod serialize;
mod target_times;

pub use clang_breakdown::ClangBreakdown;
pub use expensive_codegen::ExpensiveCodegen;
pub use expensive_files::ExpensiveFiles;
pub use expensive_includes::ExpensiveIncludes;
pub use gather::GatherTraces;
pub use serialize::SerializeTrace;
pub use target_times::TargetTimes;

use crate::commands::models::AnalyzeArgs;
use crate::context::RunContext;
use crate::diff::{delta_report, DeltaReport, OutputKind, SummaryStore};
use anyhow::Result;

/// Common interface of the analysis tools
pub trait AnalysisTool {
    /// Human readable name
    fn name(&self) -> &'static str;

    /// Command-line id; `--no-<id>` turns the tool off
    fn id(&self) -> &'static str;

    /// One-line description for `build-trace tools`
    fn describe(&self) -> &'static str;

    /// Does nothing unless turned on with `--tool-<id>`
    fn opt_in(&self) -> bool {
        false
    }

    /// Pick up tool-specific settings
    fn configure(&mut self, _args: &AnalyzeArgs) {}

    /// Analyze the traces in `context`
    ///
    /// # Errors
    /// Only conditions that must abort the run; report files that cannot be
    /// written are logged and skipped.
    fn run(&mut self, context: &mut RunContext) -> Result<()>;

    /// Summary key and display unit, for tools that keep metrics
    fn summary(&self) -> Option<(&'static str, OutputKind)> {
        None
    }

    /// Compare this tool's metrics between two runs
    fn report_delta(&self, current: &SummaryStore, prior: &SummaryStore) -> Option<DeltaReport> {
        let (key, kind) = self.summary()?;
        Some(delta_report(
            key,
            kind,
            current.metrics(key),
            prior.metrics(key),
            true,
        ))
    }
}

/// Every available tool
#[derive(Debug, Clone)]
pub enum Tool {
    ExpensiveFiles(ExpensiveFiles),
    ExpensiveIncludes(ExpensiveIncludes),
    ExpensiveCodegen(ExpensiveCodegen),
    GatherTraces(GatherTraces),
    TargetTimes(TargetTimes),
    SerializeTrace(SerializeTrace),
    ClangBreakdown(ClangBreakdown),
}

impl Tool {
    fn as_tool(&self) -> &dyn AnalysisTool {
        match self {
            Tool::ExpensiveFiles(tool) => tool,
            Tool::ExpensiveIncludes(tool) => tool,
            Tool::ExpensiveCodegen(tool) => tool,
            Tool::GatherTraces(tool) => tool,
            Tool::TargetTimes(tool) => tool,
            Tool::SerializeTrace(tool) => tool,
            Tool::ClangBreakdown(tool) => tool,
        }
    }

    fn as_tool_mut(&mut self) -> &mut dyn AnalysisTool {
        match self {
            Tool::ExpensiveFiles(tool) => tool,
            Tool::ExpensiveIncludes(tool) => tool,
            Tool::ExpensiveCodegen(tool) => tool,
            Tool::GatherTraces(tool) => tool,
            Tool::TargetTimes(tool) => tool,
            Tool::SerializeTrace(tool) => tool,
            Tool::ClangBreakdown(tool) => tool,
        }
    }
}

impl AnalysisTool for Tool {
    fn name(&self) -> &'static str {
        self.as_tool().name()
    }

    fn id(&self) -> &'static str {
        self.as_tool().id()
    }

    fn describe(&self) -> &'static str {
        self.as_tool().describe()
    }

    fn opt_in(&self) -> bool {
        self.as_tool().opt_in()
    }

    fn configure(&mut self, args: &AnalyzeArgs) {
        self.as_tool_mut().configure(args)
    }

    fn run(&mut self, context: &mut RunContext) -> Result<()> {
        self.as_tool_mut().run(context)
    }

    fn summary(&self) -> Option<(&'static str, OutputKind)> {
        self.as_tool().summary()
    }

    fn report_delta(&self, current: &SummaryStore, prior: &SummaryStore) -> Option<DeltaReport> {
        self.as_tool().report_delta(current, prior)
    }
}

/// All tools, in run order
pub fn registry() -> Vec<Tool> {
    vec![
        Tool::ExpensiveFiles(ExpensiveFiles),
        Tool::ExpensiveIncludes(ExpensiveIncludes),
        Tool::ExpensiveCodegen(ExpensiveCodegen),
        Tool::GatherTraces(GatherTraces::default()),
        Tool::TargetTimes(TargetTimes),
        Tool::SerializeTrace(SerializeTrace::default()),
        Tool::ClangBreakdown(ClangBreakdown),
    ]
}
