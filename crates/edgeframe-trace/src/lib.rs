//! Capture I/O, frame artifacts, batch reporting and synthetic captures.
//!
//! This crate wraps the pure decoder in `edgeframe-core` with everything
//! that touches the filesystem:
//!
//! - `format`: the versioned capture envelope (`TraceFile`).
//! - `io`: CSV/JSON/CBOR readers and writers for `TraceFile`, plus TOML
//!   decode configs.
//! - `output`: `.frame` naming and writing.
//! - `report`: per-trace processing with failure isolation and the run
//!   summary.
//! - `generator`: deterministic synthetic captures for tests and benches.
//!
//! We intentionally avoid broad re-exports so callers use stable paths like
//! `edgeframe_trace::report::process_trace`.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]

/// Versioned single-channel capture envelope.
pub mod format;
/// Deterministic synthetic capture generator (for sims/tests).
pub mod generator;
/// CSV/JSON/CBOR I/O helpers for `TraceFile`, and TOML configs.
pub mod io;
/// `.frame` artifact naming and writing.
pub mod output;
/// Batch processing and the end-of-run report.
pub mod report;
