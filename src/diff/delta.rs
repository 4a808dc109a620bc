//! Line-by-line comparison of two metric mappings.

use super::summary::MetricMap;
use super::units::OutputKind;
use crate::utils::truncation::truncate_to_place;
use std::collections::BTreeSet;

/// Text shown when a delta cannot be computed
pub const DELTA_NOT_APPLICABLE: &str = "n/a";

/// Text shown for a value missing on one side
pub const VALUE_MISSING: &str = "-";

/// Direction of a change relative to the prior run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaClass {
    Improved,
    Regressed,
    Unchanged,
    NotApplicable,
}

/// One rendered row of a delta report
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaLine {
    pub key: String,
    pub prior: Option<f64>,
    pub current: Option<f64>,

    /// Positive when the value went down; infinite when the prior was zero
    pub percent: Option<f64>,

    pub prior_text: String,
    pub current_text: String,
    pub delta_text: String,
    pub class: DeltaClass,
}

/// Comparison of one tool-key between two runs
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaReport {
    pub tool_key: String,
    pub kind: OutputKind,
    pub smaller_is_better: bool,
    pub lines: Vec<DeltaLine>,
}

impl DeltaReport {
    pub fn regressions(&self) -> usize {
        self.count(DeltaClass::Regressed)
    }

    pub fn improvements(&self) -> usize {
        self.count(DeltaClass::Improved)
    }

    fn count(&self, class: DeltaClass) -> usize {
        self.lines.iter().filter(|line| line.class == class).count()
    }
}

/// Build the report for one tool-key
///
/// **Public** - used by every tool that keeps a comparison
///
/// One line per key present on either side, in key order.
pub fn delta_report(
    tool_key: &str,
    kind: OutputKind,
    current: &MetricMap,
    prior: &MetricMap,
    smaller_is_better: bool,
) -> DeltaReport {
    let keys: BTreeSet<&String> = current.keys().chain(prior.keys()).collect();
    let lines = keys
        .into_iter()
        .map(|key| {
            delta_line(
                key,
                prior.get(key).copied(),
                current.get(key).copied(),
                kind,
                smaller_is_better,
            )
        })
        .collect();

    DeltaReport {
        tool_key: tool_key.to_string(),
        kind,
        smaller_is_better,
        lines,
    }
}

/// Compare one metric
///
/// # Arguments
/// * `prior` - value from the earlier run, if it had one
/// * `current` - value from this run, if it has one
/// * `smaller_is_better` - whether a decrease counts as an improvement
pub fn delta_line(
    key: &str,
    prior: Option<f64>,
    current: Option<f64>,
    kind: OutputKind,
    smaller_is_better: bool,
) -> DeltaLine {
    let prior_text = prior.map_or_else(|| VALUE_MISSING.to_string(), |v| kind.format_value(v));
    let current_text = current.map_or_else(|| VALUE_MISSING.to_string(), |v| kind.format_value(v));

    let (percent, delta_text) = match (prior, current) {
        (Some(prior), Some(current)) if !(prior == 0.0 && current == 0.0) => {
            let (percent, text) = percent_change(prior, current);
            (Some(percent), text)
        }
        _ => (None, DELTA_NOT_APPLICABLE.to_string()),
    };

    let class = match percent {
        None => DeltaClass::NotApplicable,
        Some(p) if p > 0.0 => {
            if smaller_is_better {
                DeltaClass::Improved
            } else {
                DeltaClass::Regressed
            }
        }
        Some(p) if p < 0.0 => {
            if smaller_is_better {
                DeltaClass::Regressed
            } else {
                DeltaClass::Improved
            }
        }
        Some(_) => DeltaClass::Unchanged,
    };

    DeltaLine {
        key: key.to_string(),
        prior,
        current,
        percent,
        prior_text,
        current_text,
        delta_text,
        class,
    }
}

/// Percent change from `prior` to `current`, positive when it shrank
fn percent_change(prior: f64, current: f64) -> (f64, String) {
    if prior > 0.0 {
        let percent = (prior - current) / prior * 100.0;
        let sign = if percent > 0.0 { "+" } else { "" };
        let text = if percent.abs() >= 100.0 {
            format!("{sign}{}%", percent.round() as i64)
        } else {
            // adding 0.0 turns -0.0 into 0.0
            format!("{sign}{:.2}%", truncate_to_place(percent, 2) + 0.0)
        };
        return (percent, text);
    }

    if current < prior {
        (f64::INFINITY, "+∞%".to_string())
    } else if current > prior {
        (f64::NEG_INFINITY, "-∞%".to_string())
    } else {
        (0.0, "∞%".to_string())
    }
}
