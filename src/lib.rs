//! Build Trace Studio
//!
//! Build-time analysis for clang `-ftime-trace` output: finds the trace
//! files of a build, writes reports about expensive files, includes and
//! functions, merges everything into one timeline and compares each run
//! against the previous one.
//!
//! This crate provides the core implementation for the
//! `build-trace` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! build-trace analyze --folder ~/Library/Developer/Xcode/DerivedData/App --output /tmp/builds
//! build-trace compare runs/b/comparison.json runs/a/comparison.json
//! ```

pub mod aggregator;
pub mod commands;
pub mod context;
pub mod diff;
pub mod output;
pub mod parser;
pub mod tools;
pub mod utils;
