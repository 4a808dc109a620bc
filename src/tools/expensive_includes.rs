//! Which headers cost the most, summed over every file that includes them.
//!
//! Clang records one `Source` event per include with the header path as its
//! detail. Paths are compared case-insensitively since the default macOS
//! file system is.

use super::AnalysisTool;
use crate::context::RunContext;
use crate::output::report::section_header;
use crate::output::write_report;
use crate::parser::TraceEvent;
use crate::utils::truncation::micros_to_millis;
use anyhow::Result;
use log::{info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

const REPORT_ALL: &str = "expensive_includes.txt";
const REPORT_BY_TARGET: &str = "expensive_includes_by_target.txt";
const REPORT_BY_FILENAME: &str = "includes_by_filename.txt";

#[derive(Debug, Clone, Copy, Default)]
pub struct ExpensiveIncludes;

/// Aggregate cost of one header
#[derive(Debug)]
struct IncludeStats<'a> {
    /// Path as first seen (keys are lowercased)
    path: &'a str,
    total_micros: i64,
    events: Vec<&'a TraceEvent>,
}

impl IncludeStats<'_> {
    fn count(&self) -> usize {
        self.events.len()
    }

    fn total_millis(&self) -> i64 {
        micros_to_millis(self.total_micros)
    }

    fn average_millis(&self) -> i64 {
        self.total_millis() / self.count().max(1) as i64
    }
}

type IncludeMap<'a> = BTreeMap<String, IncludeStats<'a>>;

#[derive(Debug, Default)]
struct Includes<'a> {
    all: IncludeMap<'a>,
    by_target: BTreeMap<&'a str, IncludeMap<'a>>,
    /// Distinct trace files seen per target
    files_by_target: BTreeMap<&'a str, BTreeSet<&'a Path>>,
}

impl AnalysisTool for ExpensiveIncludes {
    fn name(&self) -> &'static str {
        "Expensive Includes"
    }

    fn id(&self) -> &'static str {
        "expensive-includes"
    }

    fn describe(&self) -> &'static str {
        "Lists the included files and how long they take to compile in aggregate."
    }

    fn run(&mut self, context: &mut RunContext) -> Result<()> {
        let includes = collect(context);
        if includes.all.is_empty() {
            warn!("No includes were found");
            return Ok(());
        }
        info!("Found {} includes", includes.all.len());

        let detailed = context.is_detailed();
        let total_files: usize = includes.files_by_target.values().map(BTreeSet::len).sum();

        let mut all = section_header("", &column_titles());
        render_sorted_by_time(&mut all, &includes.all, total_files, detailed, false);
        write_report(context.output_file(REPORT_ALL), &all);

        let mut by_target = String::new();
        for (target, map) in &includes.by_target {
            let files = includes.files_by_target.get(target).map_or(0, BTreeSet::len);
            by_target.push_str(&section_header(target, &column_titles()));
            render_sorted_by_time(&mut by_target, map, files, detailed, true);
        }
        write_report(context.output_file(REPORT_BY_TARGET), &by_target);

        write_report(
            context.output_file(REPORT_BY_FILENAME),
            &render_by_filename(&includes.all),
        );

        Ok(())
    }
}

fn collect(context: &RunContext) -> Includes<'_> {
    let mut includes = Includes::default();

    for trace in context.trace_files() {
        includes
            .files_by_target
            .entry(trace.target())
            .or_default()
            .insert(trace.path());

        for event in trace.events().iter().filter(|e| e.is_source()) {
            let Some(path) = event.detail().filter(|d| !d.is_empty()) else {
                warn!("No source file associated with source item in {}", trace.name());
                continue;
            };
            let target = event.target();
            if target.is_empty() {
                warn!("No target associated with source item in {}", trace.name());
                continue;
            }

            add(&mut includes.all, path, event);
            add(includes.by_target.entry(target).or_default(), path, event);
        }
    }

    includes
}

fn add<'a>(map: &mut IncludeMap<'a>, path: &'a str, event: &'a TraceEvent) {
    let stats = map.entry(path.to_lowercase()).or_insert_with(|| IncludeStats {
        path,
        total_micros: 0,
        events: Vec::new(),
    });
    stats.total_micros += event.duration();
    stats.events.push(event);
}

fn column_titles() -> String {
    format!("{:>12}  {:>12}  {:>12}  {}", "milliseconds", "avg time", "#includes", "filename")
}

/// Rows ordered by total time; per-target reports drop headers included once
fn render_sorted_by_time(
    out: &mut String,
    map: &IncludeMap<'_>,
    total_files: usize,
    detailed: bool,
    per_target: bool,
) {
    let mut rows: Vec<&IncludeStats<'_>> = map.values().collect();
    rows.sort_by(|a, b| b.total_micros.cmp(&a.total_micros));

    for stats in rows {
        if per_target && stats.count() == 1 {
            continue;
        }
        out.push_str(&format!(
            "{:>12}  {:>12}  {:>5}/{:<6}  {}\n",
            stats.total_millis(),
            stats.average_millis(),
            stats.count(),
            total_files,
            display_path(stats.path)
        ));
        if detailed {
            render_detail(out, stats, per_target);
        }
    }
}

/// Which target/platform/arch compiled each include
fn render_detail(out: &mut String, stats: &IncludeStats<'_>, per_target: bool) {
    let mut grouped: BTreeMap<&str, BTreeMap<&str, Vec<&TraceEvent>>> = BTreeMap::new();
    for event in &stats.events {
        grouped
            .entry(event.target())
            .or_default()
            .entry(event.platform())
            .or_default()
            .push(*event);
    }

    let target_header = if per_target { " " } else { "[target]" };
    out.push_str(&format!(
        "   {} {:<50} {:<10} {:<30} {}\n",
        " ", target_header, "[arch]", "[platform]", "[filename]"
    ));

    for platforms in grouped.values() {
        for events in platforms.values() {
            // repeated includes within one target/platform are flagged
            let prefix = if events.len() > 1 && !per_target { "*" } else { " " };
            for event in events {
                let target = if per_target { " " } else { event.target() };
                out.push_str(&format!(
                    "   {} {:<50} {:<10} {:<30} {}\n",
                    prefix,
                    target,
                    event.arch(),
                    event.platform(),
                    event.origin().file_name()
                ));
            }
        }
    }
    out.push('\n');
}

fn render_by_filename(map: &IncludeMap<'_>) -> String {
    let rows: Vec<(String, &IncludeStats<'_>)> = map
        .values()
        .map(|stats| (display_path(stats.path), stats))
        .collect();
    let width = rows.iter().map(|(path, _)| path.len()).max().unwrap_or(0);

    let mut out = format!(
        "{:<width$}  {:>12}  {:>12}  {:>12}\n",
        "filename", "milliseconds", "avg time", "#includes"
    );
    out.push_str("-------------------------------------------------------------\n");
    for (path, stats) in rows {
        out.push_str(&format!(
            "{:<width$}  {:>12}  {:>12}  {:>12}\n",
            path,
            stats.total_millis(),
            stats.average_millis(),
            stats.count()
        ));
    }
    out
}

/// Resolve symlinks when the header still exists on this machine
fn display_path(path: &str) -> String {
    fs::canonicalize(path)
        .map(|resolved| resolved.display().to_string())
        .unwrap_or_else(|_| path.to_string())
}
