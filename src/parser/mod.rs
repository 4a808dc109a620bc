//! Trace parsing and provenance.
//!
//! This module handles:
//! - Deriving target/platform/arch from where a trace sits on disk
//! - Parsing raw `-ftime-trace` JSON into events
//! - Validating the trace schema

pub mod event;
pub mod provenance;
pub mod trace_file;

// Re-export main types
pub use event::{TraceEvent, TraceOrigin};
pub use provenance::{classify, Provenance};
pub use trace_file::TraceFile;
