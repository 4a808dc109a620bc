//! Discovery of trace files under the build folders.
//!
//! Build folders contain thousands of JSON files that are not traces, so
//! every candidate goes through three filters before it is parsed: file
//! name, path layout (see [`classify`]) and the optional target filter.

use crate::parser::{classify, TraceFile};
use crate::utils::config::{SKIPPED_FILE_SUFFIXES, TRACE_FILE_EXTENSION};
use crate::utils::error::ParseError;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Scan `folders` recursively and parse every trace found
///
/// **Public** - first step of the analyze command
///
/// # Arguments
/// * `folders` - roots to walk; duplicates differing only in case are
///   scanned once
/// * `targets` - keep only these targets (empty keeps everything)
///
/// # Errors
/// Returns the first fatal [`ParseError`]; every other parse failure only
/// skips its file.
pub fn scan_for_traces(folders: &[PathBuf], targets: &[String]) -> Result<Vec<TraceFile>, ParseError> {
    let mut traces = Vec::new();

    for folder in unique_folders(folders) {
        if !folder.is_dir() {
            warn!("Folder does not exist: {}", folder.display());
            continue;
        }

        info!("Scanning {}...", folder.display());
        let before = traces.len();

        for entry in WalkDir::new(&folder)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
        {
            let path = entry.path();
            if !is_candidate_file(path) {
                continue;
            }

            let Some(provenance) = classify(path) else {
                debug!("Skipping {} (not in a build folder layout)", path.display());
                continue;
            };

            if !matches_target_filter(&provenance.target, targets) {
                continue;
            }

            match TraceFile::read(path, provenance) {
                Ok(trace) => traces.push(trace),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) if e.is_quiet() => debug!("Skipping: {}", e),
                Err(e) => warn!("Skipping: {}", e),
            }
        }

        info!("Found {} trace files in {}", traces.len() - before, folder.display());
    }

    if traces.is_empty() {
        warn!(
            "No trace files were found. Make sure the project builds with \
             OTHER_CFLAGS = $(inherited) -ftime-trace"
        );
    } else {
        info!("Found {} trace files", traces.len());
    }

    Ok(traces)
}

/// Whether a target passes the `--target` filter
///
/// A filter matches its target exactly (ignoring case) or any platform
/// variant of it, e.g. `Core` matches `Core_iOS`.
pub fn matches_target_filter(target: &str, filters: &[String]) -> bool {
    if filters.is_empty() {
        return true;
    }
    let target = target.to_lowercase();
    filters.iter().any(|filter| {
        let filter = filter.to_lowercase();
        target == filter || target.starts_with(&format!("{filter}_"))
    })
}

fn is_candidate_file(path: &Path) -> bool {
    let has_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(TRACE_FILE_EXTENSION));
    if !has_extension {
        return false;
    }

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    !SKIPPED_FILE_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Folders sorted, with case-insensitive duplicates removed (first wins)
fn unique_folders(folders: &[PathBuf]) -> Vec<PathBuf> {
    let mut unique: BTreeMap<String, PathBuf> = BTreeMap::new();
    for folder in folders {
        unique
            .entry(folder.to_string_lossy().to_lowercase())
            .or_insert_with(|| folder.clone());
    }
    unique.into_values().collect()
}
