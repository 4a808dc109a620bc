//! Stitch many per-file traces into one timeline.
//!
//! Every compiled file starts its own trace at (roughly) zero. To view a
//! whole build as one flame chart we lay the files end to end: each file is
//! shifted by the combined total time of everything merged before it, and
//! all events are moved onto a single pid/tid so viewers draw one lane
//! instead of one per file.
//!
//! Example, merging A (total 100) then B (total 50):
//!
//! ```text
//! A: [0 ............ 100)
//! B:                 [100 ...... 150)
//! ```

use crate::parser::TraceFile;
use crate::utils::error::MergeError;
use log::debug;
use std::path::PathBuf;

/// Fold `source` into `accumulator`
///
/// **Public** - the merge engine
///
/// # Algorithm
/// 1. Find the source's total time (its `Total ExecuteCompiler` end time)
/// 2. Shift every source event by the accumulator's cumulative offset
/// 3. Force pid/tid to the accumulator's first event (or the source's
///    first event when the accumulator is empty)
/// 4. Append the events
/// 5. Advance the cumulative offset by the total from step 1
///
/// The source is left untouched.
///
/// # Errors
/// * `MergeError::MultipleTotals` - the source has more than one
///   `Total ExecuteCompiler` event; nothing is appended in that case
pub fn merge_into(accumulator: &mut TraceFile, source: &TraceFile) -> Result<(), MergeError> {
    let source_total = source.sentinel_total()?;
    let offset = accumulator.cumulative_offset();

    let anchor = accumulator
        .events()
        .first()
        .or_else(|| source.events().first())
        .map(|event| (event.pid(), event.tid()));

    if let Some((pid, tid)) = anchor {
        if accumulator.is_empty() {
            accumulator.set_beginning_of_time(source.beginning_of_time());
        }
        for event in source.events() {
            accumulator.push(event.relocated(offset, pid, tid));
        }
    }

    accumulator.advance_offset(source_total);

    debug!(
        "Merged {} ({} events, {}us) at offset {}us",
        source.name(),
        source.len(),
        source_total,
        offset
    );

    Ok(())
}

/// Merge `sources` in order into a new trace that will be written to `path`
///
/// **Public** - convenience wrapper used by the serializer tool
///
/// # Errors
/// * `MergeError::MultipleTotals` - see [`merge_into`]
pub fn merge_all<'a>(
    path: impl Into<PathBuf>,
    sources: impl IntoIterator<Item = &'a TraceFile>,
) -> Result<TraceFile, MergeError> {
    let mut accumulator = TraceFile::aggregate(path);
    for source in sources {
        merge_into(&mut accumulator, source)?;
    }
    Ok(accumulator)
}
