//! Group traces and events for the reporting tools.

use crate::parser::{TraceEvent, TraceFile};
use std::collections::BTreeMap;

/// Group trace files by target, keeping discovery order inside each group
pub fn group_by_target(traces: &[TraceFile]) -> BTreeMap<&str, Vec<&TraceFile>> {
    let mut groups: BTreeMap<&str, Vec<&TraceFile>> = BTreeMap::new();
    for trace in traces {
        groups.entry(trace.target()).or_default().push(trace);
    }
    groups
}

/// Sum event durations (µs) under the key returned by `key_of`
///
/// Events for which `key_of` returns `None` are ignored.
pub fn sum_durations_by<'a, F>(traces: &'a [TraceFile], mut key_of: F) -> BTreeMap<&'a str, i64>
where
    F: FnMut(&'a TraceFile, &'a TraceEvent) -> Option<&'a str>,
{
    let mut sums: BTreeMap<&str, i64> = BTreeMap::new();
    for trace in traces {
        for event in trace.events() {
            if let Some(key) = key_of(trace, event) {
                *sums.entry(key).or_insert(0) += event.duration();
            }
        }
    }
    sums
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Provenance;

    fn trace(path: &str, target: &str, totals: &[(&str, i64)]) -> TraceFile {
        let mut trace = TraceFile::new(path, Provenance::new(target, "P", "arm64"));
        let origin = trace.origin().clone();
        for (name, dur) in totals {
            trace.push(TraceEvent::new(*name, 0, *dur, 1, 1, &origin));
        }
        trace
    }

    #[test]
    fn test_group_by_target() {
        let traces = vec![
            trace("/a.json", "Core", &[]),
            trace("/b.json", "UI", &[]),
            trace("/c.json", "Core", &[]),
        ];
        let groups = group_by_target(&traces);
        assert_eq!(groups.len(), 2);
        let core: Vec<_> = groups["Core"].iter().map(|t| t.name()).collect();
        assert_eq!(core, vec!["a.json", "c.json"]);
    }

    #[test]
    fn test_sum_durations_by_category() {
        let traces = vec![
            trace("/a.json", "Core", &[("Total Frontend", 10), ("Total Backend", 5), ("Source", 99)]),
            trace("/b.json", "UI", &[("Total Frontend", 20)]),
        ];
        let sums = sum_durations_by(&traces, |_, event| event.short_total_name());
        assert_eq!(sums.get("Frontend"), Some(&30));
        assert_eq!(sums.get("Backend"), Some(&5));
        assert_eq!(sums.len(), 2);
    }
}
