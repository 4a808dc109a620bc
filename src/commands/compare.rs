//! Compare command implementation.
//! Prints the delta reports between two saved snapshots without scanning.

use super::models::CompareArgs;
use crate::diff::{render_delta_report, SummaryStore};
use crate::tools::{registry, AnalysisTool};
use anyhow::{Context, Result};
use colored::*;

/// Execute the compare command
pub fn execute_compare(args: CompareArgs) -> Result<()> {
    // Step 1: Load snapshots
    let current = SummaryStore::load(&args.current).context("Failed to read current snapshot")?;
    let prior = SummaryStore::load(&args.prior).context("Failed to read prior snapshot")?;

    // Step 2: Header
    let header = format!(
        "Comparing {} ({}) against {} ({})",
        args.current.display(),
        display_name(&current),
        args.prior.display(),
        display_name(&prior)
    );
    if args.use_color {
        println!("{}\n", header.bold());
    } else {
        println!("{header}\n");
    }

    // Step 3: One report per tool that keeps metrics
    for tool in registry() {
        if let Some(report) = tool.report_delta(&current, &prior) {
            println!("{}", render_delta_report(&report, args.use_color));
        }
    }

    Ok(())
}

fn display_name(store: &SummaryStore) -> &str {
    if store.name().is_empty() {
        "unnamed"
    } else {
        store.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_two_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        let current = dir.path().join("current.json");
        let prior = dir.path().join("prior.json");
        SummaryStore::new("new").save(&current).unwrap();
        SummaryStore::new("").save(&prior).unwrap();

        let args = CompareArgs {
            current,
            prior,
            use_color: false,
        };
        assert!(execute_compare(args).is_ok());
    }

    #[test]
    fn test_compare_missing_snapshot_fails() {
        let dir = tempfile::tempdir().unwrap();
        let args = CompareArgs {
            current: dir.path().join("missing.json"),
            prior: dir.path().join("missing.json"),
            use_color: false,
        };
        assert!(execute_compare(args).is_err());
    }
}
