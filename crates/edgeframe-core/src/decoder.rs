//! End-to-end decode of one capture: samples -> runs -> bits -> verified frame.

use tracing::debug;

use crate::config::DecodeConfig;
use crate::error::{DecodeError, DecodeResult};
use crate::frames::{verify_frames, FrameMatch};
use crate::quantum::discretize;
use crate::runs::runs_from_samples;
use crate::types::{Bitvector, Frame, FramePosition, Run, Sample, Seconds};

/// A frame that repeated identically and passed the length check.
#[derive(Clone, Debug, PartialEq)]
pub struct Decoded {
    /// The repeating frame.
    pub frame: Frame,
    /// How many times it occurred.
    pub occurrences: usize,
    /// Where each occurrence sits in `bitvector`.
    pub positions: Vec<FramePosition>,
    /// T0 in seconds.
    pub quantum: Seconds,
    /// The (idle-trimmed) bitstream the frames were cut from.
    pub bitvector: Bitvector,
    /// Whether `occurrences` reached the persistence threshold.
    pub reliable: bool,
}

impl Decoded {
    /// Frame length in bits.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.frame.len()
    }

    /// Whether the frame is empty (never true for a decoded frame).
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frame.is_empty()
    }
}

/// Stateless decoder bound to one validated configuration.
#[derive(Clone, Debug, Default)]
pub struct Decoder {
    cfg: DecodeConfig,
}

impl Decoder {
    /// Validate `cfg` and build a decoder.
    ///
    /// # Errors
    /// [`DecodeError::InvalidConfig`] if the config is inconsistent.
    pub fn new(cfg: DecodeConfig) -> DecodeResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &DecodeConfig {
        &self.cfg
    }

    /// Decode a raw sample sequence.
    ///
    /// # Errors
    /// Any [`DecodeError`] raised along the pipeline.
    pub fn decode_samples(&self, samples: &[Sample]) -> DecodeResult<Decoded> {
        let runs = runs_from_samples(samples)?;
        self.decode_runs(&runs)
    }

    /// Decode an already run-length encoded capture.
    ///
    /// # Errors
    /// Any [`DecodeError`] raised along the pipeline.
    pub fn decode_runs(&self, runs: &[Run]) -> DecodeResult<Decoded> {
        if runs.is_empty() {
            return Err(DecodeError::EmptyTrace);
        }
        if tracing::enabled!(tracing::Level::DEBUG) {
            let listed: Vec<String> = runs.iter().map(ToString::to_string).collect();
            debug!("Runs: [{}]", listed.join(", "));
        }

        let d = discretize(runs, &self.cfg)?;
        let FrameMatch {
            frame,
            occurrences,
            positions,
        } = verify_frames(&d.bitvector, self.cfg.min_idle, self.cfg.debug)?;
        debug!(occurrences, len = frame.len(), "frames agree");

        self.check_length(&frame)?;

        Ok(Decoded {
            reliable: occurrences >= self.cfg.min_occurrences,
            frame,
            occurrences,
            positions,
            quantum: d.quantum,
            bitvector: d.bitvector,
        })
    }

    /// Reject frames outside the configured length range.
    ///
    /// # Errors
    /// [`DecodeError::FrameLength`] with a short/long classification.
    pub fn check_length(&self, frame: &Frame) -> DecodeResult<()> {
        let bound = self.cfg.frame_len;
        if bound.contains(frame.len()) {
            return Ok(());
        }
        Err(DecodeError::FrameLength {
            len: frame.len(),
            class: bound.classify(frame.len(), self.cfg.legacy_short_cutoff),
            frame: frame.clone(),
        })
    }
}
