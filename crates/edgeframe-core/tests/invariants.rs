//! Pipeline invariants over synthetic, perfectly quantized captures.
//!
//! Captures are built from bit strings: one sample per level change plus a
//! closing sample, with a bit time of 1 ms.

use edgeframe_core::{
    frames::{extract_frames, FrameScanner},
    quantum::{expand_runs, run_bits},
    runs::{runs_from_samples, total_duration},
    Bitvector, DecodeConfig, DecodeError, Decoder, Level, Run, Sample,
};
use proptest::prelude::*;

const BIT: f64 = 1e-3;

/// Samples for `bits` at `BIT` seconds per bit.
#[track_caller]
fn samples_from_bits(bits: &str) -> Vec<Sample> {
    let level = |b: u8| if b == b'0' { Level::Low } else { Level::High };
    let bytes = bits.as_bytes();
    assert!(!bytes.is_empty(), "need at least one bit");

    let mut out = vec![Sample::new(0.0, level(bytes[0]))];
    for i in 1..bytes.len() {
        if bytes[i] != bytes[i - 1] {
            out.push(Sample::new(i as f64 * BIT, level(bytes[i])));
        }
    }
    out.push(Sample::new(bytes.len() as f64 * BIT, level(bytes[bytes.len() - 1])));
    out
}

/// Leading idle, then `pattern` followed by an idle gap, `k` times.
fn tiled(pattern: &str, k: usize, idle: usize) -> String {
    let gap = "1".repeat(idle);
    let mut s = "1".repeat(40);
    for _ in 0..k {
        s.push_str(pattern);
        s.push_str(&gap);
    }
    s
}

/// Patterns that start `01`, end `0`, and never hold `1` for 10+ bits.
fn arb_pattern() -> impl Strategy<Value = String> {
    (30usize..=34)
        .prop_flat_map(|n| prop::collection::vec(any::<bool>(), n))
        .prop_map(|mut v| {
            let n = v.len();
            for (i, b) in v.iter_mut().enumerate() {
                if i % 10 == 0 || i == n - 1 {
                    *b = false;
                }
            }
            v[1] = true;
            v.iter().map(|&b| if b { '1' } else { '0' }).collect()
        })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64, // good CI/runtime balance
        .. ProptestConfig::default()
    })]

    #[test]
    fn run_durations_sum_to_trace_duration(
        levels in prop::collection::vec(any::<bool>(), 1..64),
        gaps in prop::collection::vec(1u32..1000, 64),
    ) {
        let mut t = 0.0f64;
        let samples: Vec<Sample> = levels
            .iter()
            .zip(&gaps)
            .map(|(&hi, &g)| {
                let s = Sample::new(t, if hi { Level::High } else { Level::Low });
                t += f64::from(g) * 1e-6;
                s
            })
            .collect();
        let runs = runs_from_samples(&samples).unwrap();
        let span = samples.last().unwrap().time - samples[0].time;
        prop_assert!((total_duration(&runs) - span).abs() < 1e-9);
        for w in runs.windows(2) {
            prop_assert_ne!(w[0].level, w[1].level);
        }
    }

    #[test]
    fn bitvector_length_is_sum_of_rounded_runs(
        durs in prop::collection::vec(1u32..500, 1..40),
        t0_us in 1u32..50,
    ) {
        let t0 = f64::from(t0_us) * 1e-6;
        let runs: Vec<Run> = durs
            .iter()
            .enumerate()
            .map(|(i, &d)| {
                let level = if i % 2 == 0 { Level::Low } else { Level::High };
                Run::new(level, f64::from(d) * 1e-6)
            })
            .collect();
        let bv = expand_runs(&runs, t0, usize::MAX).unwrap();
        let expected: usize = runs.iter().map(|r| run_bits(r.duration, t0)).sum();
        prop_assert_eq!(bv.len(), expected);
    }

    #[test]
    fn extraction_is_idempotent(pattern in arb_pattern()) {
        let bits = Bitvector::from_bits(&format!("{pattern}{}", "1".repeat(20))).unwrap();
        let (frames, positions) = extract_frames(&bits, 20);
        prop_assert_eq!(frames.len(), 1);
        prop_assert_eq!(frames[0].as_str(), pattern.as_str());

        let again = Bitvector::from_bits(&format!("{}{}", frames[0], "1".repeat(20))).unwrap();
        let second: Vec<_> = FrameScanner::new(&again, 20).collect();
        prop_assert_eq!(&second[0].0, &frames[0]);
        prop_assert_eq!(second[0].1, positions[0]);
    }

    #[test]
    fn tiled_pattern_round_trips(pattern in arb_pattern(), k in 5usize..9, idle in 20usize..40) {
        let samples = samples_from_bits(&tiled(&pattern, k, idle));
        let d = Decoder::default().decode_samples(&samples).unwrap();
        prop_assert_eq!(d.frame.as_str(), pattern.as_str());
        prop_assert_eq!(d.occurrences, k);
        prop_assert!(d.reliable);
        prop_assert!((d.quantum - BIT).abs() < 1e-9);
    }

    #[test]
    fn single_flipped_bit_is_one_mismatch(
        pattern in arb_pattern(),
        rep in 1usize..5,
        at in 2usize..29,
    ) {
        let gap = "1".repeat(25);
        let mut s = "1".repeat(40);
        for r in 0..5 {
            if r == rep {
                let mut p = pattern.clone().into_bytes();
                p[at] = if p[at] == b'0' { b'1' } else { b'0' };
                s.push_str(std::str::from_utf8(&p).unwrap());
            } else {
                s.push_str(&pattern);
            }
            s.push_str(&gap);
        }
        match Decoder::default().decode_samples(&samples_from_bits(&s)) {
            Err(DecodeError::UnreliableCapture { mismatches, .. }) => prop_assert_eq!(mismatches, 1),
            other => prop_assert!(false, "unexpected: {:?}", other),
        }
    }
}

#[test]
fn four_repetitions_decode_but_are_not_reliable() {
    let pattern = "0100110100011010010011010001101000";
    assert_eq!(pattern.len(), 34);
    let samples = samples_from_bits(&tiled(pattern, 4, 25));
    let d = Decoder::default().decode_samples(&samples).unwrap();
    assert_eq!(d.frame.as_str(), pattern);
    assert_eq!(d.occurrences, 4);
    assert!(!d.reliable);

    let five = Decoder::default()
        .decode_samples(&samples_from_bits(&tiled(pattern, 5, 25)))
        .unwrap();
    assert!(five.reliable);
}

#[test]
fn custom_threshold_changes_reliability() {
    let pattern = "010011010001101001001101000110100";
    let cfg = DecodeConfig {
        min_occurrences: 3,
        ..DecodeConfig::default()
    };
    let d = Decoder::new(cfg)
        .unwrap()
        .decode_samples(&samples_from_bits(&tiled(pattern, 3, 30)))
        .unwrap();
    assert!(d.reliable);
}
