//! Quantum (T0) estimation and run-length discretization.
//!
//! T0 is the shortest run of the preferred level, which works for protocols
//! whose shortest pulses are reliably on one side. Each run then expands to
//! `round(duration / T0)` bits with ties to even. Quantization error is not
//! carried between runs, so long captures may drift by a bit here and there.

use tracing::debug;

use crate::config::{DecodeConfig, QuantumLevel};
use crate::error::{DecodeError, DecodeResult};
use crate::types::{Bitvector, Run, Seconds};

/// Shortest positive run duration, preferring runs at `pref`'s level.
///
/// # Errors
/// [`DecodeError::DegenerateQuantum`] if no run has a positive duration.
pub fn estimate_quantum(runs: &[Run], pref: QuantumLevel) -> DecodeResult<Seconds> {
    let shortest = |keep: &dyn Fn(&Run) -> bool| {
        runs.iter()
            .filter(|r| r.duration > 0.0 && keep(r))
            .map(|r| r.duration)
            .min_by(f64::total_cmp)
    };

    let preferred = pref
        .level()
        .and_then(|level| shortest(&|r: &Run| r.level == level));
    preferred
        .or_else(|| shortest(&|_: &Run| true))
        .ok_or_else(|| DecodeError::DegenerateQuantum("no run with positive duration".into()))
}

/// Number of bits a run of `duration` occupies at quantum `t0`.
///
/// Saturates at `usize::MAX`; [`expand_runs`] bounds the total.
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn run_bits(duration: Seconds, t0: Seconds) -> usize {
    let n = (duration / t0).round_ties_even();
    if n.is_finite() && n > 0.0 {
        n as usize
    } else {
        0
    }
}

/// Index of the first run lasting at least `multiplier * t0`, if any.
#[must_use]
pub fn find_leading_idle(runs: &[Run], t0: Seconds, multiplier: f64) -> Option<usize> {
    let threshold = multiplier * t0;
    runs.iter().position(|r| r.duration >= threshold)
}

/// Expand every run into `run_bits(duration, t0)` copies of its level.
///
/// The total is checked against `max_bits` before anything is allocated.
///
/// # Errors
/// [`DecodeError::BitvectorTooLong`] if the expansion exceeds `max_bits`.
pub fn expand_runs(runs: &[Run], t0: Seconds, max_bits: usize) -> DecodeResult<Bitvector> {
    let counts: Vec<usize> = runs.iter().map(|r| run_bits(r.duration, t0)).collect();
    let total = counts
        .iter()
        .try_fold(0usize, |acc, &n| acc.checked_add(n).filter(|&t| t <= max_bits))
        .ok_or(DecodeError::BitvectorTooLong {
            limit: max_bits,
            quantum: t0,
        })?;

    let mut bv = Bitvector::with_capacity(total);
    for (r, n) in runs.iter().zip(counts) {
        bv.push_run(r.level, n);
    }
    Ok(bv)
}

/// Result of discretizing one trace.
#[derive(Clone, Debug, PartialEq)]
pub struct Discretized {
    /// The flat bitstream.
    pub bitvector: Bitvector,
    /// T0 used for expansion, in seconds.
    pub quantum: Seconds,
    /// Number of leading runs dropped by the idle trim (0 if none).
    pub trimmed_runs: usize,
}

/// Estimate T0 (or take the override), trim leading idle, and expand.
///
/// # Errors
/// [`DecodeError::DegenerateQuantum`] if no quantum can be derived;
/// [`DecodeError::BitvectorTooLong`] if the expansion exceeds `cfg.max_bits`.
pub fn discretize(runs: &[Run], cfg: &DecodeConfig) -> DecodeResult<Discretized> {
    let quantum = match cfg.quantum_override {
        Some(q) if q.is_finite() && q > 0.0 => q,
        Some(q) => {
            return Err(DecodeError::DegenerateQuantum(format!(
                "override must be finite and > 0, got {q}"
            )))
        }
        None => estimate_quantum(runs, cfg.quantum_level)?,
    };
    debug!("Estimated T0 = {:.3} ms", quantum * 1000.0);

    let trimmed_runs = match find_leading_idle(runs, quantum, cfg.idle_trim_multiplier) {
        Some(i) => {
            debug!(
                "Trimming to start at run {} (val={}, dur={:.3} ms)",
                i + 1,
                runs[i].level,
                runs[i].duration * 1000.0
            );
            i + 1
        }
        None => 0,
    };

    let bitvector = expand_runs(&runs[trimmed_runs..], quantum, cfg.max_bits)?;
    debug!("Bitvector ({} bits):\n{}", bitvector.len(), bitvector);

    Ok(Discretized {
        bitvector,
        quantum,
        trimmed_runs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Level::{High, Low};

    #[test]
    fn prefers_low_runs_then_falls_back() {
        let runs = [Run::new(High, 0.5), Run::new(Low, 1.0), Run::new(High, 3.0)];
        assert_eq!(estimate_quantum(&runs, QuantumLevel::Low).unwrap(), 1.0);
        assert_eq!(estimate_quantum(&runs, QuantumLevel::Any).unwrap(), 0.5);
        assert_eq!(estimate_quantum(&runs, QuantumLevel::High).unwrap(), 0.5);

        let only_high = [Run::new(High, 2.0)];
        assert_eq!(estimate_quantum(&only_high, QuantumLevel::Low).unwrap(), 2.0);
    }

    #[test]
    fn zero_duration_runs_are_ignored() {
        let runs = [Run::new(Low, 0.0), Run::new(High, 0.3), Run::new(Low, 0.2)];
        assert_eq!(estimate_quantum(&runs, QuantumLevel::Low).unwrap(), 0.2);

        let degenerate = [Run::new(Low, 0.0)];
        assert!(matches!(
            estimate_quantum(&degenerate, QuantumLevel::Low),
            Err(DecodeError::DegenerateQuantum(_))
        ));
    }

    #[test]
    fn rounding_ties_go_to_even() {
        assert_eq!(run_bits(0.5, 1.0), 0);
        assert_eq!(run_bits(1.5, 1.0), 2);
        assert_eq!(run_bits(2.5, 1.0), 2);
        assert_eq!(run_bits(2.6, 1.0), 3);
    }

    #[test]
    fn trims_through_first_long_run() {
        let runs = [
            Run::new(Low, 1.0),
            Run::new(High, 30.0),
            Run::new(Low, 1.0),
            Run::new(High, 2.0),
        ];
        let d = discretize(&runs, &DecodeConfig::default()).unwrap();
        assert_eq!(d.quantum, 1.0);
        assert_eq!(d.trimmed_runs, 2);
        assert_eq!(d.bitvector.as_str(), "011");
    }

    #[test]
    fn no_long_run_means_no_trim() {
        let runs = [Run::new(Low, 1.0), Run::new(High, 2.0), Run::new(Low, 3.0)];
        let d = discretize(&runs, &DecodeConfig::default()).unwrap();
        assert_eq!(d.trimmed_runs, 0);
        assert_eq!(d.bitvector.as_str(), "011000");
    }

    #[test]
    fn override_replaces_estimate() {
        let runs = [Run::new(Low, 1.0), Run::new(High, 0.5)];
        let cfg = DecodeConfig {
            quantum_override: Some(0.5),
            ..DecodeConfig::default()
        };
        let d = discretize(&runs, &cfg).unwrap();
        assert_eq!(d.quantum, 0.5);
        assert_eq!(d.bitvector.as_str(), "001");
    }

    #[test]
    fn oversized_expansion_is_rejected_before_allocating() {
        // A near-zero glitch makes every other run saturate `run_bits`.
        let runs = [Run::new(Low, 1e-300), Run::new(High, 1.0), Run::new(Low, 1.0)];
        assert_eq!(run_bits(1.0, 1e-300), usize::MAX);
        assert!(matches!(
            expand_runs(&runs, 1e-300, usize::MAX),
            Err(DecodeError::BitvectorTooLong { limit: usize::MAX, .. })
        ));

        let runs = [Run::new(Low, 1.0), Run::new(High, 3.0)];
        assert_eq!(expand_runs(&runs, 1.0, 4).unwrap().as_str(), "0111");
        assert!(matches!(
            expand_runs(&runs, 1.0, 3),
            Err(DecodeError::BitvectorTooLong { limit: 3, .. })
        ));
    }
}
