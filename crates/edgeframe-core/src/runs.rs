//! Samples -> transitions -> runs.
//!
//! Runs alternate levels by construction: a transition is only kept when its
//! level differs from the previously kept one, so adjacent runs can never
//! share a level.

use crate::error::{DecodeError, DecodeResult};
use crate::types::{Run, Sample, Seconds, Transition};

/// Keep the first sample and every sample whose level differs from the last
/// kept one.
///
/// # Errors
/// [`DecodeError::EmptyTrace`] on no samples, [`DecodeError::NonMonotonicTime`]
/// if a time is not finite or smaller than its predecessor.
pub fn extract_transitions(samples: &[Sample]) -> DecodeResult<Vec<Transition>> {
    let (first, rest) = samples.split_first().ok_or(DecodeError::EmptyTrace)?;
    if !first.time.is_finite() {
        return Err(DecodeError::NonMonotonicTime {
            index: 0,
            prev: first.time,
            time: first.time,
        });
    }

    let mut out = vec![Transition::from(*first)];
    let mut prev_time = first.time;
    for (i, s) in rest.iter().enumerate() {
        if !s.time.is_finite() || s.time < prev_time {
            return Err(DecodeError::NonMonotonicTime {
                index: i + 1,
                prev: prev_time,
                time: s.time,
            });
        }
        prev_time = s.time;

        // `out` is never empty here.
        if out.last().is_some_and(|t| t.level != s.level) {
            out.push(Transition::from(*s));
        }
    }
    Ok(out)
}

/// Turn transitions into runs; the last run lasts until `end_time`.
///
/// Returns an empty list only when `transitions` is empty.
#[must_use]
pub fn build_runs(transitions: &[Transition], end_time: Seconds) -> Vec<Run> {
    let Some(last) = transitions.last() else {
        return Vec::new();
    };

    let mut runs: Vec<Run> = transitions
        .windows(2)
        .map(|w| Run::new(w[0].level, w[1].time - w[0].time))
        .collect();
    runs.push(Run::new(last.level, end_time - last.time));
    runs
}

/// Convenience: [`extract_transitions`] then [`build_runs`] up to the last sample.
///
/// # Errors
/// Same as [`extract_transitions`].
pub fn runs_from_samples(samples: &[Sample]) -> DecodeResult<Vec<Run>> {
    let transitions = extract_transitions(samples)?;
    let end = samples.last().map_or(0.0, |s| s.time);
    Ok(build_runs(&transitions, end))
}

/// Sum of run durations.
#[must_use]
pub fn total_duration(runs: &[Run]) -> Seconds {
    runs.iter().map(|r| r.duration).sum()
}
