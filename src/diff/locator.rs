//! Finding the snapshot of an earlier run.
//!
//! Every run folder sits next to its predecessors under the same output
//! base, and folder names sort chronologically, so the newest prior run is
//! the first sibling in descending name order.

use super::summary::SummaryStore;
use crate::utils::error::SummaryError;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Where and how to look for the prior snapshot
#[derive(Debug, Clone)]
pub struct SnapshotQuery<'a> {
    /// Folder of the current run; never picked as its own baseline
    pub current_output: &'a Path,

    /// Snapshot file name inside each run folder
    pub file_name: &'a str,

    /// Snapshot file, or folder to search, given on the command line
    pub explicit: Option<&'a Path>,

    /// Only accept a snapshot whose stored name equals this
    pub name_filter: Option<&'a str>,
}

/// A snapshot together with the file it came from
#[derive(Debug, Clone)]
pub struct LocatedSnapshot {
    pub path: PathBuf,
    pub store: SummaryStore,
}

/// Resolve the prior snapshot for a run
///
/// **Public** - called once per run by the run context
///
/// Resolution order:
/// 1. an explicit file is loaded directly
/// 2. an explicit folder holding a snapshot is loaded directly, otherwise
///    it becomes the search root
/// 3. the parent of the current output folder is the search root (also used
///    when the explicit path does not exist)
///
/// With a name filter only a snapshot carrying that name is accepted.
///
/// # Returns
/// `Ok(None)` when no usable snapshot exists.
///
/// # Errors
/// * Any `SummaryError` from loading an explicitly named snapshot
/// * `SummaryError::ListFailed` - the search root cannot be listed
pub fn locate_prior(query: &SnapshotQuery<'_>) -> Result<Option<LocatedSnapshot>, SummaryError> {
    let search_root = match query.explicit {
        Some(explicit) if explicit.is_file() => {
            return load_explicit(explicit).map(Some);
        }
        Some(explicit) if explicit.is_dir() => {
            let inside = explicit.join(query.file_name);
            if inside.is_file() {
                return load_explicit(&inside).map(Some);
            }
            explicit.to_path_buf()
        }
        Some(explicit) => {
            warn!(
                "Comparison path {} does not exist; searching next to the output folder",
                explicit.display()
            );
            match default_root(query) {
                Some(root) => root,
                None => return Ok(None),
            }
        }
        None => match default_root(query) {
            Some(root) => root,
            None => return Ok(None),
        },
    };

    search(&search_root, query)
}

fn default_root(query: &SnapshotQuery<'_>) -> Option<PathBuf> {
    query.current_output.parent().map(Path::to_path_buf)
}

fn load_explicit(path: &Path) -> Result<LocatedSnapshot, SummaryError> {
    let store = SummaryStore::load(path)?;
    info!("Comparing against {}", path.display());
    Ok(LocatedSnapshot {
        path: path.to_path_buf(),
        store,
    })
}

fn search(root: &Path, query: &SnapshotQuery<'_>) -> Result<Option<LocatedSnapshot>, SummaryError> {
    if !root.is_dir() {
        debug!("No folder to search for comparisons at {}", root.display());
        return Ok(None);
    }

    let entries = fs::read_dir(root).map_err(|source| SummaryError::ListFailed {
        path: root.to_path_buf(),
        source,
    })?;

    let mut folders: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    folders.sort_by(|a, b| b.file_name().cmp(&a.file_name()));

    for folder in folders {
        if is_same_path(&folder, query.current_output) {
            continue;
        }

        let snapshot_path = folder.join(query.file_name);
        if !snapshot_path.is_file() {
            continue;
        }

        let store = match SummaryStore::load(&snapshot_path) {
            Ok(store) => store,
            Err(e) => {
                warn!("Skipping comparison candidate {}: {}", snapshot_path.display(), e);
                continue;
            }
        };

        let located = LocatedSnapshot {
            path: snapshot_path,
            store,
        };
        match query.name_filter {
            Some(name) if located.store.name() != name => {
                debug!(
                    "Skipping {} named '{}'",
                    located.path.display(),
                    located.store.name()
                );
            }
            _ => {
                info!("Comparing against {}", located.path.display());
                return Ok(Some(located));
            }
        }
    }

    if let Some(name) = query.name_filter {
        warn!("No comparison named '{}' found", name);
    }
    Ok(None)
}

fn is_same_path(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::summary::MetricMap;
    use crate::utils::config::DEFAULT_SNAPSHOT_FILE_NAME;

    fn save_snapshot(folder: &Path, name: &str, total: f64) {
        let mut store = SummaryStore::new(name);
        let metrics: MetricMap = [("Core".to_string(), total)].into_iter().collect();
        store.add("Target Times", metrics).unwrap();
        store.save(folder.join(DEFAULT_SNAPSHOT_FILE_NAME)).unwrap();
    }

    fn query<'a>(current: &'a Path, name_filter: Option<&'a str>) -> SnapshotQuery<'a> {
        SnapshotQuery {
            current_output: current,
            file_name: DEFAULT_SNAPSHOT_FILE_NAME,
            explicit: None,
            name_filter,
        }
    }

    #[test]
    fn test_picks_newest_sibling_and_skips_current() {
        let base = tempfile::tempdir().unwrap();
        let older = base.path().join("2024-01-01-10-00-00");
        let newer = base.path().join("2024-01-02-10-00-00");
        let current = base.path().join("2024-01-03-10-00-00");
        for dir in [&older, &newer, &current] {
            fs::create_dir_all(dir).unwrap();
        }
        save_snapshot(&older, "", 1.0);
        save_snapshot(&newer, "", 2.0);
        save_snapshot(&current, "", 3.0);

        let located = locate_prior(&query(&current, None)).unwrap().unwrap();
        assert_eq!(located.path, newer.join(DEFAULT_SNAPSHOT_FILE_NAME));
        assert_eq!(located.store.metrics("Target Times")["Core"], 2.0);
    }

    #[test]
    fn test_name_filter_only_accepts_matching_name() {
        let base = tempfile::tempdir().unwrap();
        let older = base.path().join("2024-01-01-10-00-00");
        let newer = base.path().join("2024-01-02-10-00-00");
        let current = base.path().join("2024-01-03-10-00-00");
        for dir in [&older, &newer, &current] {
            fs::create_dir_all(dir).unwrap();
        }
        save_snapshot(&older, "main", 1.0);
        save_snapshot(&newer, "branch", 2.0);

        let matched = locate_prior(&query(&current, Some("main"))).unwrap().unwrap();
        assert_eq!(matched.store.name(), "main");

        assert!(locate_prior(&query(&current, Some("release"))).unwrap().is_none());
    }

    #[test]
    fn test_missing_explicit_path_searches_next_to_output() {
        let base = tempfile::tempdir().unwrap();
        let sibling = base.path().join("2024-03-02-10-00-00");
        let current = base.path().join("2024-03-03-10-00-00");
        fs::create_dir_all(&sibling).unwrap();
        fs::create_dir_all(&current).unwrap();
        save_snapshot(&sibling, "", 4.0);

        let typo = base.path().join("typo");
        let mut missing = query(&current, None);
        missing.explicit = Some(&typo);
        let located = locate_prior(&missing).unwrap().unwrap();
        assert_eq!(located.path, sibling.join(DEFAULT_SNAPSHOT_FILE_NAME));
    }

    #[test]
    fn test_folders_without_snapshot_are_skipped() {
        let base = tempfile::tempdir().unwrap();
        let empty = base.path().join("2024-01-02-10-00-00");
        let older = base.path().join("2024-01-01-10-00-00");
        let current = base.path().join("2024-01-03-10-00-00");
        for dir in [&older, &empty, &current] {
            fs::create_dir_all(dir).unwrap();
        }
        save_snapshot(&older, "", 1.0);

        let located = locate_prior(&query(&current, None)).unwrap().unwrap();
        assert_eq!(located.path.parent(), Some(older.as_path()));
    }

    #[test]
    fn test_broken_candidate_is_skipped() {
        let base = tempfile::tempdir().unwrap();
        let older = base.path().join("2024-01-01-10-00-00");
        let broken = base.path().join("2024-01-02-10-00-00");
        let current = base.path().join("2024-01-03-10-00-00");
        for dir in [&older, &broken, &current] {
            fs::create_dir_all(dir).unwrap();
        }
        save_snapshot(&older, "", 1.0);
        fs::write(broken.join(DEFAULT_SNAPSHOT_FILE_NAME), "not json").unwrap();

        let located = locate_prior(&query(&current, None)).unwrap().unwrap();
        assert_eq!(located.path.parent(), Some(older.as_path()));
    }

    #[test]
    fn test_nothing_found() {
        let base = tempfile::tempdir().unwrap();
        let current = base.path().join("2024-01-03-10-00-00");
        fs::create_dir_all(&current).unwrap();
        assert!(locate_prior(&query(&current, None)).unwrap().is_none());
    }

    #[test]
    fn test_explicit_file_and_folder() {
        let base = tempfile::tempdir().unwrap();
        let pinned = base.path().join("pinned");
        let current = base.path().join("2024-01-03-10-00-00");
        fs::create_dir_all(&pinned).unwrap();
        fs::create_dir_all(&current).unwrap();
        save_snapshot(&pinned, "pinned", 5.0);

        let file = pinned.join(DEFAULT_SNAPSHOT_FILE_NAME);
        let mut by_file = query(&current, Some("ignored"));
        by_file.explicit = Some(&file);
        assert_eq!(locate_prior(&by_file).unwrap().unwrap().store.name(), "pinned");

        let mut by_folder = query(&current, None);
        by_folder.explicit = Some(&pinned);
        assert_eq!(locate_prior(&by_folder).unwrap().unwrap().path, file);
    }

    #[test]
    fn test_explicit_broken_file_is_an_error() {
        let base = tempfile::tempdir().unwrap();
        let file = base.path().join("bad.json");
        fs::write(&file, "[1, 2]").unwrap();
        let current = base.path().join("run");

        let mut broken = query(&current, None);
        broken.explicit = Some(&file);
        assert!(locate_prior(&broken).is_err());
    }
}
