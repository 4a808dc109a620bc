//! Plain-text report files written by the tools.
//!
//! Reports are conveniences; failing to write one must not stop the run.

use super::json::write_atomic;
use log::{info, warn};
use std::path::Path;

/// Write a report, warning instead of failing
///
/// Returns whether the file was written.
pub fn write_report(path: impl AsRef<Path>, contents: &str) -> bool {
    let path = path.as_ref();
    match write_atomic(path, contents.as_bytes()) {
        Ok(()) => {
            info!("Wrote to {}", path.display());
            true
        }
        Err(e) => {
            warn!("Could not write to {}: {}", path.display(), e);
            false
        }
    }
}

/// Section header shared by the per-target reports
pub(crate) fn section_header(title: &str, columns: &str) -> String {
    const RULE: &str = "----------------------------------------------------------------------------------------------------------------------------";
    format!("\n\n>>>>> {title}\n\n{RULE}\n{columns}\n{RULE}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_report_into_missing_dir_creates_it() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("sub/report.txt");
        assert!(write_report(&path, "hello\n"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "hello\n");
    }

    #[test]
    fn test_write_report_failure_is_soft() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(!write_report(temp_dir.path(), "x"));
    }

    #[test]
    fn test_section_header() {
        let header = section_header("Core", "   seconds  filename");
        assert!(header.starts_with("\n\n>>>>> Core\n\n---"));
        assert!(header.contains("\n   seconds  filename\n"));
    }
}
