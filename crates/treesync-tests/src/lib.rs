//! treesync test suite
//!
//! Shared fixtures for the end-to-end tests in `tests/` and the benchmarks in
//! `benches/`.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Unified test utilities
///
/// Tree builders, timestamp helpers and instrumented filesystems used
/// across all test and benchmark files.
pub mod test_utils;
