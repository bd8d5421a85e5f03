//! Canonical data types shared across the edgeframe workspace.
//!
//! These are re-exported at the crate root so other crates can import via
//! `edgeframe_core::Sample`, `edgeframe_core::Run`, etc.
//!
//! Serialized forms stay conservative: levels travel as `0`/`1`, bit strings
//! as plain `'0'`/`'1'` text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Seconds since the start of the capture.
pub type Seconds = f64;

/// Binary logic level of the probed signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Level {
    /// Logic `0`.
    Low,
    /// Logic `1` (also the idle level between frames).
    High,
}

impl Level {
    /// ASCII digit used in bitvectors and frames.
    #[inline]
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Low => '0',
            Self::High => '1',
        }
    }
}

impl TryFrom<u8> for Level {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::Low),
            1 => Ok(Self::High),
            other => Err(format!("logic level must be 0 or 1, got {other}")),
        }
    }
}

impl From<Level> for u8 {
    #[inline]
    fn from(l: Level) -> Self {
        match l {
            Level::Low => 0,
            Level::High => 1,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

/// One logic-analyzer sample.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Timestamp in seconds (non-decreasing across a trace).
    pub time: Seconds,
    /// Observed level.
    pub level: Level,
}

impl Sample {
    /// Construct a sample.
    #[inline]
    #[must_use]
    pub const fn new(time: Seconds, level: Level) -> Self {
        Self { time, level }
    }
}

/// A sample at which the level changed (the first sample always counts).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    /// Time of the edge.
    pub time: Seconds,
    /// Level held from this edge on.
    pub level: Level,
}

impl From<Sample> for Transition {
    #[inline]
    fn from(s: Sample) -> Self {
        Self { time: s.time, level: s.level }
    }
}

/// Interval during which the signal held one level.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// Level held for the whole run.
    pub level: Level,
    /// Duration in seconds.
    pub duration: Seconds,
}

impl Run {
    /// Construct a run.
    #[inline]
    #[must_use]
    pub const fn new(level: Level, duration: Seconds) -> Self {
        Self { level, duration }
    }
}

impl fmt::Display for Run {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {:.2} ms)", self.level, self.duration * 1000.0)
    }
}

/// Flat `'0'`/`'1'` string, one digit per quantum of signal time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bitvector(String);

impl Bitvector {
    /// Empty bitvector with room for `cap` bits.
    #[must_use]
    pub fn with_capacity(cap: usize) -> Self {
        Self(String::with_capacity(cap))
    }

    /// Parse a `'0'`/`'1'` string. Returns `None` on any other character.
    #[must_use]
    pub fn from_bits(bits: &str) -> Option<Self> {
        bits.bytes()
            .all(|b| b == b'0' || b == b'1')
            .then(|| Self(bits.to_owned()))
    }

    /// Append `count` copies of `level`.
    pub fn push_run(&mut self, level: Level, count: usize) {
        self.0.extend(std::iter::repeat(level.as_char()).take(count));
    }

    /// Number of bits.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no bits at all.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The bits as text.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The bits as ASCII bytes (`b'0'` / `b'1'`).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for Bitvector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Payload bits found between two idle runs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Frame(String);

impl Frame {
    /// Wrap an already-validated bit string.
    #[must_use]
    pub fn new(bits: impl Into<String>) -> Self {
        Self(bits.into())
    }

    /// Length in bits.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the frame carries no bits.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The bits as text.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the underlying string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Half-open `[start, end)` location of one frame occurrence in the bitvector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FramePosition {
    /// Index of the first frame bit.
    pub start: usize,
    /// Index of the first bit of the closing idle run.
    pub end: usize,
}

impl FramePosition {
    /// Construct a position.
    #[inline]
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of bits covered.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the position covers no bits.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}
