//! Run-over-run comparison.
//!
//! Every run stores its tool metrics in a [`SummaryStore`] snapshot. The next
//! run locates that snapshot and prints one delta report per tool.
//!
//! # Example
//! ```ignore
//! use build_trace_studio::diff::{delta_report, render_delta_report, OutputKind, SummaryStore};
//!
//! let current = SummaryStore::load("runs/2024-01-02-10-00-00/comparison.json")?;
//! let prior = SummaryStore::load("runs/2024-01-01-10-00-00/comparison.json")?;
//! let report = delta_report(
//!     "Target Times",
//!     OutputKind::TimeMilliseconds,
//!     current.metrics("Target Times"),
//!     prior.metrics("Target Times"),
//!     true,
//! );
//! println!("{}", render_delta_report(&report, true));
//! ```

mod delta;
mod locator;
mod output;
mod summary;
mod units;

// Public API exports
pub use delta::{delta_line, delta_report, DeltaClass, DeltaLine, DeltaReport, DELTA_NOT_APPLICABLE, VALUE_MISSING};
pub use locator::{locate_prior, LocatedSnapshot, SnapshotQuery};
pub use output::render_delta_report;
pub use summary::{MetricMap, SummaryStore};
pub use units::OutputKind;
