//! Target / platform / architecture recovery from a trace file's location.
//!
//! Xcode writes `-ftime-trace` output next to the object files:
//!
//! ```text
//! <...>/<Platform>/<Target>.build/<ObjectDir>/<arch>/<file>.json
//! <...>/SharedPrecompiledHeaders/<hash>/<arch>/<file>.json
//! ```
//!
//! The object directory name varies with build settings (`Objects-normal`,
//! `Objects-normal-asan`, ...) so it is never inspected.

use crate::utils::config::{BUILD_DIR_SUFFIX, NOT_APPLICABLE, SHARED_PCH_FOLDER};
use std::fmt;
use std::path::Path;

/// Where a trace file came from in the build
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Provenance {
    pub target: String,
    pub platform: String,
    pub arch: String,
}

impl Provenance {
    pub fn new(target: impl Into<String>, platform: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            platform: platform.into(),
            arch: arch.into(),
        }
    }

    /// Provenance for synthetic traces (merged output) that belong to no target
    pub fn not_applicable() -> Self {
        Self::new(NOT_APPLICABLE, NOT_APPLICABLE, NOT_APPLICABLE)
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.target, self.platform, self.arch)
    }
}

/// Derive the provenance triple from a trace file path
///
/// **Public** - used by the scanner to label and filter candidates
///
/// # Returns
/// `None` when the path does not follow the build layout. Most JSON files
/// found while scanning are unrelated, so this is not an error.
pub fn classify(path: &Path) -> Option<Provenance> {
    let arch_dir = path.parent()?;
    let arch = dir_name(arch_dir)?;

    let object_dir = arch_dir.parent()?;
    dir_name(object_dir)?;

    let target_dir = object_dir.parent()?;
    let target_name = dir_name(target_dir)?;

    if let Some(target) = target_name.strip_suffix(BUILD_DIR_SUFFIX) {
        let platform = target_dir.parent().and_then(dir_name)?;
        Some(Provenance::new(target, platform, arch))
    } else if target_name == SHARED_PCH_FOLDER {
        Some(Provenance::new(SHARED_PCH_FOLDER, NOT_APPLICABLE, NOT_APPLICABLE))
    } else {
        None
    }
}

fn dir_name(path: &Path) -> Option<&str> {
    path.file_name()?.to_str()
}
