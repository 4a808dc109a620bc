//! Aggregation of parsed traces.
//!
//! This module transforms many per-file traces into:
//! - One merged timeline (for chrome://tracing, Perfetto or speedscope)
//! - Per-target groupings used by the reporting tools

pub mod grouping;
pub mod merge;

// Re-export main functions
pub use grouping::{group_by_target, sum_durations_by};
pub use merge::{merge_all, merge_into};
