//! Capture envelope shared by the readers, writers and generator.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

use edgeframe_core::{Sample, Seconds};
use serde::{Deserialize, Serialize};

/// Current envelope version.
pub const TRACE_VERSION: u16 = 1;

/// Single-channel capture.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TraceFile {
    /// Format/version tag for forward-compat.
    pub version: u16,
    /// Samples in time order.
    pub samples: Vec<Sample>,
    /// Optional metadata (source device, channel, generator params…).
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
}

impl TraceFile {
    /// Wrap samples with the current version and no metadata.
    #[must_use]
    pub const fn new(samples: Vec<Sample>) -> Self {
        Self {
            version: TRACE_VERSION,
            samples,
            meta: None,
        }
    }

    /// Number of samples.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the capture has no samples.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Time between first and last sample (0 for fewer than two samples).
    #[must_use]
    pub fn duration(&self) -> Seconds {
        match (self.samples.first(), self.samples.last()) {
            (Some(a), Some(b)) => b.time - a.time,
            _ => 0.0,
        }
    }
}
