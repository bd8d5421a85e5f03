//! Decode configuration.
//!
//! All fields have defaults so partial TOML/JSON documents deserialize; the
//! defaults describe the 30 to 34 bit protocol this tool was first built for.

use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, DecodeResult, LengthClass};
use crate::types::Level;

/// Default minimum run of `1`s that closes a frame.
pub const DEFAULT_MIN_IDLE: usize = 20;
/// Default leading-idle multiplier (in units of T0).
pub const DEFAULT_IDLE_TRIM_MULTIPLIER: f64 = 20.0;
/// Default minimum accepted frame length (inclusive).
pub const DEFAULT_FRAME_MIN: usize = 30;
/// Default maximum accepted frame length (inclusive).
pub const DEFAULT_FRAME_MAX: usize = 34;
/// Default occurrence count required before a frame is persisted.
pub const DEFAULT_MIN_OCCURRENCES: usize = 5;
/// Default cap on the discretized bitvector length (16 Mi bits).
pub const DEFAULT_MAX_BITS: usize = 1 << 24;

/// Which runs the quantum is estimated from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantumLevel {
    /// Shortest low run, falling back to the shortest run of any level.
    #[default]
    Low,
    /// Shortest high run, falling back to the shortest run of any level.
    High,
    /// Shortest run of any level.
    Any,
}

impl QuantumLevel {
    /// The preferred level, if any.
    #[must_use]
    pub const fn level(self) -> Option<Level> {
        match self {
            Self::Low => Some(Level::Low),
            Self::High => Some(Level::High),
            Self::Any => None,
        }
    }
}

/// Inclusive accepted frame length range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthBound {
    /// Minimum length in bits.
    pub min: usize,
    /// Maximum length in bits.
    pub max: usize,
}

impl Default for LengthBound {
    fn default() -> Self {
        Self {
            min: DEFAULT_FRAME_MIN,
            max: DEFAULT_FRAME_MAX,
        }
    }
}

impl LengthBound {
    /// Whether `len` is accepted.
    #[inline]
    #[must_use]
    pub const fn contains(&self, len: usize) -> bool {
        len >= self.min && len <= self.max
    }

    /// Classify an out-of-range length.
    ///
    /// With `short_cutoff = Some(c)` a length is "short" only when `< c`,
    /// regardless of `min`; otherwise it is "short" when `< min`.
    #[must_use]
    pub fn classify(&self, len: usize, short_cutoff: Option<usize>) -> LengthClass {
        if len < short_cutoff.unwrap_or(self.min) {
            LengthClass::TooShort
        } else {
            LengthClass::TooLong
        }
    }
}

/// Knobs consumed by [`crate::Decoder`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecodeConfig {
    /// Minimum run of `1`s that counts as an idle frame boundary.
    pub min_idle: usize,
    /// A leading run at least this many T0 long is trimmed with everything before it.
    pub idle_trim_multiplier: f64,
    /// Accepted frame length range.
    pub frame_len: LengthBound,
    /// Occurrences required before the frame is persisted.
    pub min_occurrences: usize,
    /// Level whose shortest run defines T0.
    pub quantum_level: QuantumLevel,
    /// Fixed T0 in seconds, bypassing estimation.
    pub quantum_override: Option<f64>,
    /// Legacy "too short" cutoff for length classification.
    pub legacy_short_cutoff: Option<usize>,
    /// Upper bound on the bitvector length; longer expansions are rejected.
    pub max_bits: usize,
    /// Produce diagnostic alignments on mismatch.
    pub debug: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            min_idle: DEFAULT_MIN_IDLE,
            idle_trim_multiplier: DEFAULT_IDLE_TRIM_MULTIPLIER,
            frame_len: LengthBound::default(),
            min_occurrences: DEFAULT_MIN_OCCURRENCES,
            quantum_level: QuantumLevel::default(),
            quantum_override: None,
            legacy_short_cutoff: None,
            max_bits: DEFAULT_MAX_BITS,
            debug: false,
        }
    }
}

impl DecodeConfig {
    /// Check internal consistency.
    ///
    /// # Errors
    /// Returns [`DecodeError::InvalidConfig`] naming the first violated constraint.
    pub fn validate(&self) -> DecodeResult<()> {
        if self.min_idle == 0 {
            return Err(DecodeError::InvalidConfig("min_idle must be >= 1".into()));
        }
        if self.max_bits == 0 {
            return Err(DecodeError::InvalidConfig("max_bits must be >= 1".into()));
        }
        if !(self.idle_trim_multiplier.is_finite() && self.idle_trim_multiplier > 0.0) {
            return Err(DecodeError::InvalidConfig(format!(
                "idle_trim_multiplier must be finite and > 0, got {}",
                self.idle_trim_multiplier
            )));
        }
        if self.frame_len.min > self.frame_len.max {
            return Err(DecodeError::InvalidConfig(format!(
                "frame_len.min ({}) > frame_len.max ({})",
                self.frame_len.min, self.frame_len.max
            )));
        }
        if let Some(q) = self.quantum_override {
            if !(q.is_finite() && q > 0.0) {
                return Err(DecodeError::InvalidConfig(format!(
                    "quantum_override must be finite and > 0, got {q}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let cfg = DecodeConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.min_idle, 20);
        assert!(cfg.frame_len.contains(30) && cfg.frame_len.contains(34));
        assert!(!cfg.frame_len.contains(29) && !cfg.frame_len.contains(35));
    }

    #[test]
    fn rejects_bad_knobs() {
        let cfg = DecodeConfig { min_idle: 0, ..DecodeConfig::default() };
        assert!(matches!(cfg.validate(), Err(DecodeError::InvalidConfig(_))));

        let cfg = DecodeConfig {
            frame_len: LengthBound { min: 10, max: 5 },
            ..DecodeConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = DecodeConfig { quantum_override: Some(0.0), ..DecodeConfig::default() };
        assert!(cfg.validate().is_err());

        let cfg = DecodeConfig { max_bits: 0, ..DecodeConfig::default() };
        assert!(matches!(cfg.validate(), Err(DecodeError::InvalidConfig(_))));
    }

    #[test]
    fn classify_against_min_or_legacy_cutoff() {
        let b = LengthBound::default();
        assert_eq!(b.classify(4, None), LengthClass::TooShort);
        assert_eq!(b.classify(40, None), LengthClass::TooLong);
        // Legacy cutoff reports anything >= 3 as long.
        assert_eq!(b.classify(4, Some(3)), LengthClass::TooLong);
        assert_eq!(b.classify(2, Some(3)), LengthClass::TooShort);
    }
}
