//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod analyze;
pub mod compare;
pub mod models;
pub mod scan;
pub mod utils;

// Re-export main command functions
pub use analyze::{execute_analyze, run_analysis, validate_args};
pub use compare::execute_compare;
pub use models::{AnalyzeArgs, CompareArgs};
pub use scan::{matches_target_filter, scan_for_traces};
pub use utils::{display_tools, display_version};
