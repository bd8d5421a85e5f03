//! Idle-delimited frame extraction and cross-verification.
//!
//! The scanner is a two-state automaton over an immutable bitvector:
//!
//! ```text
//!            '0' at cursor
//! SeekingZero ───────────────▶ FrameOpen { start }
//!      ▲                            │
//!      └────────────────────────────┘
//!        run of '1's >= min_idle (frame = bits[start..run_start])
//! ```
//!
//! A frame still open when the bits run out is dropped. [`FrameScanner`]
//! yields occurrences lazily; [`verify_frames`] collects and cross-checks them.

use tracing::warn;

use crate::diag::{align_frames, context_snippet, DEFAULT_CONTEXT_MARGIN};
use crate::error::{DecodeError, DecodeResult};
use crate::types::{Bitvector, Frame, FramePosition};

/// Scanner state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanState {
    /// Skipping `1`s until the first `0` of a frame.
    SeekingZero,
    /// Inside a frame that began at `start`.
    FrameOpen {
        /// Index of the frame's first bit.
        start: usize,
    },
}

/// Lazy iterator over `(Frame, FramePosition)` occurrences.
#[derive(Clone, Debug)]
pub struct FrameScanner<'a> {
    bits: &'a [u8],
    cursor: usize,
    state: ScanState,
    min_idle: usize,
}

impl<'a> FrameScanner<'a> {
    /// Scan `bits` with idle boundaries of at least `min_idle` ones.
    #[must_use]
    pub fn new(bits: &'a Bitvector, min_idle: usize) -> Self {
        Self::from_bytes(bits.as_bytes(), min_idle)
    }

    /// Scan raw `b'0'`/`b'1'` bytes.
    #[must_use]
    pub const fn from_bytes(bits: &'a [u8], min_idle: usize) -> Self {
        Self {
            bits,
            cursor: 0,
            state: ScanState::SeekingZero,
            min_idle,
        }
    }

    /// Current automaton state.
    #[must_use]
    pub const fn state(&self) -> ScanState {
        self.state
    }

    /// Current cursor position.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// `SeekingZero`: skip ones; open a frame at the first zero.
    fn seek_zero(&mut self) -> ScanState {
        while self.cursor < self.bits.len() && self.bits[self.cursor] == b'1' {
            self.cursor += 1;
        }
        if self.cursor < self.bits.len() {
            ScanState::FrameOpen { start: self.cursor }
        } else {
            ScanState::SeekingZero
        }
    }

    /// `FrameOpen`: consume up to and including the next run of ones.
    ///
    /// Returns the closing idle run's start if that run was long enough.
    fn consume_open(&mut self) -> Option<usize> {
        while self.cursor < self.bits.len() && self.bits[self.cursor] == b'0' {
            self.cursor += 1;
        }
        let run_start = self.cursor;
        while self.cursor < self.bits.len() && self.bits[self.cursor] == b'1' {
            self.cursor += 1;
        }
        (self.cursor - run_start >= self.min_idle && self.cursor > run_start).then_some(run_start)
    }

    fn at_end(&self) -> bool {
        self.cursor >= self.bits.len()
    }
}

impl Iterator for FrameScanner<'_> {
    type Item = (Frame, FramePosition);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.at_end() {
                return None;
            }
            match self.state {
                ScanState::SeekingZero => {
                    self.state = self.seek_zero();
                }
                ScanState::FrameOpen { start } => {
                    if let Some(end) = self.consume_open() {
                        self.state = ScanState::SeekingZero;
                        // Scanned bytes are ASCII digits.
                        let frame = String::from_utf8_lossy(&self.bits[start..end]).into_owned();
                        return Some((Frame::new(frame), FramePosition::new(start, end)));
                    }
                }
            }
        }
    }
}

/// Collect every frame occurrence.
#[must_use]
pub fn extract_frames(bits: &Bitvector, min_idle: usize) -> (Vec<Frame>, Vec<FramePosition>) {
    FrameScanner::new(bits, min_idle).unzip()
}

/// A verified, repeating frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameMatch {
    /// The common frame.
    pub frame: Frame,
    /// Number of occurrences found.
    pub occurrences: usize,
    /// Where each occurrence sits in the bitvector.
    pub positions: Vec<FramePosition>,
}

/// Extract all frames and require them to be identical.
///
/// With `diagnostics` set, a mismatch error carries the aligned view of all
/// occurrences.
///
/// # Errors
/// [`DecodeError::NoFramesFound`] if nothing closes;
/// [`DecodeError::UnreliableCapture`] if any frame differs from the first.
pub fn verify_frames(
    bits: &Bitvector,
    min_idle: usize,
    diagnostics: bool,
) -> DecodeResult<FrameMatch> {
    let (frames, positions) = extract_frames(bits, min_idle);
    let Some(first) = frames.first() else {
        return Err(DecodeError::NoFramesFound);
    };

    let mut mismatches = 0usize;
    for (idx, (f, pos)) in frames.iter().zip(&positions).enumerate().skip(1) {
        if f != first {
            let context = context_snippet(bits, *pos, DEFAULT_CONTEXT_MARGIN);
            warn!(index = idx, frame = %f, %context, "Frame {idx} differs");
            mismatches += 1;
        }
    }

    if mismatches > 0 {
        let alignment = diagnostics.then(|| Box::new(align_frames(first, bits, &positions)));
        return Err(DecodeError::UnreliableCapture {
            mismatches,
            frame: first.clone(),
            alignment,
        });
    }

    Ok(FrameMatch {
        frame: first.clone(),
        occurrences: frames.len(),
        positions,
    })
}
