//! edgeframe-core: decode logic-analyzer captures into a verified repeating frame.
//!
//! This crate is the pure, I/O-free part of the workspace:
//! - canonical data types (`Sample`, `Run`, `Bitvector`, `Frame`, …),
//! - run-length building from raw samples,
//! - quantum (T0) estimation and discretization into a flat bitstream,
//! - the idle-delimited frame scanner and cross-verification,
//! - diagnostic alignment text for unreliable captures, and
//! - the [`Decoder`] façade tying the stages together.
//!
//! ```no_run
//! use edgeframe_core::{DecodeConfig, Decoder, Level, Sample};
//! # let samples: Vec<Sample> = vec![Sample::new(0.0, Level::High)];
//! let decoder = Decoder::new(DecodeConfig::default())?;
//! let decoded = decoder.decode_samples(&samples)?;
//! println!("{} ({} bits) x{}", decoded.frame, decoded.len(), decoded.occurrences);
//! # Ok::<(), edgeframe_core::DecodeError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![cfg_attr(not(test), warn(clippy::unwrap_used, clippy::expect_used))]
// Small, explicit allowlist to keep docs readable and APIs ergonomic.
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::doc_markdown
)]

/// Decode knobs with serde defaults.
pub mod config;
/// The end-to-end [`Decoder`].
pub mod decoder;
/// Alignment text for diagnosing mismatching frames.
pub mod diag;
/// Typed decode errors.
pub mod error;
/// Frame scanner automaton and verification.
pub mod frames;
/// Quantum estimation and bitvector construction.
pub mod quantum;
/// Transition extraction and run-length building.
pub mod runs;
/// Canonical core data types.
pub mod types;

// ---- Re-exports for workspace compatibility ----
pub use config::*;
pub use decoder::*;
pub use diag::{align_frames, Alignment};
pub use error::*;
pub use frames::{verify_frames, FrameMatch, FrameScanner};
pub use types::*;

/// Commonly-used items for quick imports.
///
/// ```rust
/// use edgeframe_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        config::DecodeConfig,
        decoder::{Decoded, Decoder},
        error::{DecodeError, DecodeResult},
        types::*,
    };
}
