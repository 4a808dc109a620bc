//! Copies of the raw traces next to the reports.
//!
//! Off unless `--tool-gather` is given. Traces from different targets or
//! platforms often share a file name, so copies get a `-2`, `-3`, ...
//! suffix on collision.

use super::AnalysisTool;
use crate::commands::models::AnalyzeArgs;
use crate::context::RunContext;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

const TRACES_FOLDER: &str = "traces";

#[derive(Debug, Clone, Copy, Default)]
pub struct GatherTraces {
    enabled: bool,
}

impl AnalysisTool for GatherTraces {
    fn name(&self) -> &'static str {
        "Trace File Gatherer"
    }

    fn id(&self) -> &'static str {
        "gather"
    }

    fn describe(&self) -> &'static str {
        "Copies every trace file of the run into its traces folder."
    }

    fn opt_in(&self) -> bool {
        true
    }

    fn configure(&mut self, args: &AnalyzeArgs) {
        self.enabled = args.gather_traces;
    }

    fn run(&mut self, context: &mut RunContext) -> Result<()> {
        if !self.enabled {
            debug!("Not gathering trace files (pass --tool-gather)");
            return Ok(());
        }

        let gather_path = context.output_file(TRACES_FOLDER);
        fs::create_dir_all(&gather_path)
            .with_context(|| format!("Failed to create {}", gather_path.display()))?;

        let mut copied = 0;
        for trace in context.trace_files() {
            let Some(destination) = free_destination(&gather_path, trace.path()) else {
                warn!("Failed to gather {} (no file name)", trace.path().display());
                continue;
            };
            debug!("Copying {} -> {}", trace.path().display(), destination.display());
            match fs::copy(trace.path(), &destination) {
                Ok(_) => copied += 1,
                Err(e) => warn!("Failed to gather {}: {}", trace.path().display(), e),
            }
        }

        info!("Collected {} files into {}", copied, gather_path.display());
        Ok(())
    }
}

/// First unused path in `folder` for a copy of `source`
///
/// `main.json`, then `main-2.json`, `main-3.json`, ...
fn free_destination(folder: &Path, source: &Path) -> Option<PathBuf> {
    let file_name = source.file_name()?;
    let candidate = folder.join(file_name);
    if !candidate.exists() {
        return Some(candidate);
    }

    let stem = source.file_stem()?.to_string_lossy();
    let extension = source
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    (2..)
        .map(|suffix| folder.join(format!("{stem}-{suffix}{extension}")))
        .find(|candidate| !candidate.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colliding_names_get_suffixes() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path();

        let mut names = Vec::new();
        for source in ["/iOS/Core.build/a/arm64/main.json", "/macOS/Core.build/a/x86_64/main.json", "/x/main.json"] {
            let destination = free_destination(folder, Path::new(source)).unwrap();
            fs::write(&destination, "{}").unwrap();
            names.push(destination.file_name().unwrap().to_string_lossy().to_string());
        }
        assert_eq!(names, vec!["main.json", "main-2.json", "main-3.json"]);
    }

    #[test]
    fn test_name_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("trace"), "").unwrap();
        let destination = free_destination(dir.path(), Path::new("/x/trace")).unwrap();
        assert_eq!(destination, dir.path().join("trace-2"));
    }
}
