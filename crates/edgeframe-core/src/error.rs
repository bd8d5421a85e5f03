//! Typed decode failures.
//!
//! Every variant is fatal to the trace being decoded and to nothing else;
//! batch callers catch them per trace and keep going.

use thiserror::Error;

use crate::diag::Alignment;
use crate::types::Frame;

/// Which side of the accepted length range a frame fell on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LengthClass {
    /// Shorter than accepted.
    TooShort,
    /// Longer than accepted.
    TooLong,
}

impl LengthClass {
    /// Lowercase word used in messages (`short` / `long`).
    #[must_use]
    pub const fn as_word(self) -> &'static str {
        match self {
            Self::TooShort => "short",
            Self::TooLong => "long",
        }
    }
}

/// Core decode errors.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The capture holds no samples at all.
    #[error("Empty trace: no samples")]
    EmptyTrace,

    /// Sample times went backwards (or are NaN/infinite).
    #[error("Non-monotonic time at sample {index}: {time} after {prev}")]
    NonMonotonicTime {
        /// Index of the offending sample.
        index: usize,
        /// Time of the preceding sample.
        prev: f64,
        /// Offending time.
        time: f64,
    },

    /// No usable quantum could be derived.
    #[error("Cannot estimate quantum: {0}")]
    DegenerateQuantum(String),

    /// Discretizing at T0 would produce more bits than allowed.
    #[error("Bitvector would exceed {limit} bits at T0 = {quantum:e} s")]
    BitvectorTooLong {
        /// Configured cap.
        limit: usize,
        /// Quantum used for the expansion.
        quantum: f64,
    },

    /// No idle-delimited frame closes anywhere in the bitvector.
    #[error("No frames found")]
    NoFramesFound,

    /// Candidate frames are not bit-identical.
    #[error("{mismatches} frames differ, unreliable capture")]
    UnreliableCapture {
        /// Number of frames that differ from the first one.
        mismatches: usize,
        /// The first (reference) frame.
        frame: Frame,
        /// Aligned view of all occurrences, present when diagnostics are on.
        alignment: Option<Box<Alignment>>,
    },

    /// The agreed frame is outside the accepted length range.
    #[error("Frame too {} ({len} bits), unreliable capture", .class.as_word())]
    FrameLength {
        /// Frame length in bits.
        len: usize,
        /// Short/long classification.
        class: LengthClass,
        /// The rejected frame.
        frame: Frame,
    },

    /// Configuration violates its own constraints.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl DecodeError {
    /// Stable kind name for reports.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::EmptyTrace => "EmptyTrace",
            Self::NonMonotonicTime { .. } => "NonMonotonicTime",
            Self::DegenerateQuantum(_) => "DegenerateQuantum",
            Self::BitvectorTooLong { .. } => "BitvectorTooLong",
            Self::NoFramesFound => "NoFramesFound",
            Self::UnreliableCapture { .. } => "UnreliableCapture",
            Self::FrameLength { .. } => "FrameLength",
            Self::InvalidConfig(_) => "InvalidConfig",
        }
    }

    /// The frame decoded before the failure, if decoding got that far.
    #[must_use]
    pub const fn partial_frame(&self) -> Option<&Frame> {
        match self {
            Self::UnreliableCapture { frame, .. } | Self::FrameLength { frame, .. } => Some(frame),
            _ => None,
        }
    }
}

/// Result alias for core decode operations.
pub type DecodeResult<T> = Result<T, DecodeError>;
