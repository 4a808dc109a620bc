//! Terminal output rendering for delta reports.
//!
//! Rows are right-aligned in fixed-width columns, with the delta colored
//! green for improvements and red for regressions.

use super::delta::{DeltaClass, DeltaLine, DeltaReport};
use colored::*;

const COLUMN_WIDTH: usize = 16;

/// Render a delta report for the terminal
pub fn render_delta_report(report: &DeltaReport, use_color: bool) -> String {
    let mut out = String::new();

    let unit = report.kind.unit_label();
    let title = if unit.is_empty() {
        format!("* {}", report.tool_key)
    } else {
        format!("* {} ({})", report.tool_key, unit)
    };
    if use_color {
        out.push_str(&title.bold().to_string());
    } else {
        out.push_str(&title);
    }
    out.push('\n');

    out.push_str(&format!(
        "{:>w$} {:>w$} {:>w$}   {}\n",
        "Last",
        "Current",
        "Delta",
        "Name",
        w = COLUMN_WIDTH
    ));

    for line in &report.lines {
        out.push_str(&render_line(line, use_color));
        out.push('\n');
    }

    if report.lines.is_empty() {
        out.push_str("    (no data)\n");
    }

    out
}

fn render_line(line: &DeltaLine, use_color: bool) -> String {
    let delta = format!("{:>w$}", line.delta_text, w = COLUMN_WIDTH);
    let delta = if use_color {
        color_delta(&delta, line.class)
    } else {
        delta
    };

    format!(
        "{:>w$} {:>w$} {}   {}",
        line.prior_text,
        line.current_text,
        delta,
        line.key,
        w = COLUMN_WIDTH
    )
}

fn color_delta(text: &str, class: DeltaClass) -> String {
    match class {
        DeltaClass::Improved => text.green().to_string(),
        DeltaClass::Regressed => text.red().to_string(),
        DeltaClass::Unchanged | DeltaClass::NotApplicable => text.dimmed().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::delta::delta_report;
    use crate::diff::summary::MetricMap;
    use crate::diff::units::OutputKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_plain_report() {
        let current: MetricMap = [("Core".to_string(), 50.0)].into_iter().collect();
        let prior: MetricMap = [("Core".to_string(), 100.0)].into_iter().collect();
        let report = delta_report("Target Times", OutputKind::TimeMilliseconds, &current, &prior, true);

        let text = render_delta_report(&report, false);
        let expected = "* Target Times (ms)\n\
                        \x20           Last          Current            Delta   Name\n\
                        \x20          100ms             50ms          +50.00%   Core\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_render_empty_report() {
        let empty = MetricMap::new();
        let report = delta_report("Serial Times", OutputKind::TimeCpuSeconds, &empty, &empty, true);
        assert!(render_delta_report(&report, false).ends_with("(no data)\n"));
    }
}
