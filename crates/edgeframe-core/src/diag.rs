//! Human-readable alignment of frame occurrences.
//!
//! Only used to help someone eyeball an unreliable capture; nothing here feeds
//! back into decoding.

use std::fmt;

use crate::types::{Bitvector, Frame, FramePosition};

/// One occurrence re-read at the reference frame's length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlignedLine {
    /// Start index in the bitvector.
    pub start: usize,
    /// `bits[start .. start + reference.len()]`, clamped to the bitvector end.
    pub bits: String,
    /// Whether `bits` equals the reference.
    pub matches: bool,
    /// The occurrence with [`DEFAULT_CONTEXT_MARGIN`] bits on each side.
    pub context: String,
}

impl AlignedLine {
    /// `OK` or `DIFF`.
    #[must_use]
    pub const fn marker(&self) -> &'static str {
        if self.matches {
            "OK"
        } else {
            "DIFF"
        }
    }
}

/// All occurrences aligned one per line under the reference frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alignment {
    /// The reference (first) frame.
    pub reference: Frame,
    /// One line per occurrence, in bitvector order.
    pub lines: Vec<AlignedLine>,
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Extracted Frame ===")?;
        writeln!(f, "{}", self.reference)?;
        writeln!(f, "=======================")?;
        writeln!(f)?;
        writeln!(f, "=== Bitvector with frames aligned ===")?;
        for line in &self.lines {
            if line.matches {
                writeln!(f, "{}   {}", line.bits, line.marker())?;
            } else {
                writeln!(f, "{}   {}   {}", line.bits, line.marker(), line.context)?;
            }
        }
        write!(f, "=======================")
    }
}

/// Re-read every position at the reference frame's length and mark it.
#[must_use]
pub fn align_frames(reference: &Frame, bits: &Bitvector, positions: &[FramePosition]) -> Alignment {
    let all = bits.as_str();
    let width = reference.len();
    let lines = positions
        .iter()
        .map(|p| {
            let start = p.start.min(all.len());
            let end = start.saturating_add(width).min(all.len());
            let line = &all[start..end];
            AlignedLine {
                start: p.start,
                bits: line.to_owned(),
                matches: line == reference.as_str(),
                context: context_snippet(bits, *p, DEFAULT_CONTEXT_MARGIN),
            }
        })
        .collect();
    Alignment {
        reference: reference.clone(),
        lines,
    }
}

/// Default context margin for [`context_snippet`].
pub const DEFAULT_CONTEXT_MARGIN: usize = 5;

/// `bits[start - margin .. end + margin]`, with `...` marking truncated sides.
#[must_use]
pub fn context_snippet(bits: &Bitvector, pos: FramePosition, margin: usize) -> String {
    let all = bits.as_str();
    let left = pos.start.saturating_sub(margin).min(all.len());
    let right = pos.end.saturating_add(margin).min(all.len()).max(left);
    let prefix = if left > 0 { "..." } else { "" };
    let suffix = if right < all.len() { "..." } else { "" };
    format!("{prefix}{}{suffix}", &all[left..right])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_matching_and_differing_lines() {
        let bits = Bitvector::from_bits("0100111101101111").unwrap();
        let reference = Frame::new("0100");
        let positions = [FramePosition::new(0, 4), FramePosition::new(8, 12)];
        let a = align_frames(&reference, &bits, &positions);
        assert_eq!(a.lines[0].marker(), "OK");
        assert_eq!(a.lines[1].bits, "0110");
        assert_eq!(a.lines[1].marker(), "DIFF");
        assert_eq!(a.lines[1].context, "...0111101101111");

        let text = a.to_string();
        assert!(text.starts_with("=== Extracted Frame ===\n0100\n"));
        assert!(text.contains("0100   OK\n0110   DIFF   ...0111101101111\n"), "{text}");
    }

    #[test]
    fn line_is_clamped_at_bitvector_end() {
        let bits = Bitvector::from_bits("0100111101").unwrap();
        let a = align_frames(&Frame::new("0100"), &bits, &[FramePosition::new(8, 10)]);
        assert_eq!(a.lines[0].bits, "01");
        assert!(!a.lines[0].matches);
    }

    #[test]
    fn snippet_marks_truncation() {
        let bits = Bitvector::from_bits("11111111110100111111111").unwrap();
        let s = context_snippet(&bits, FramePosition::new(10, 14), 2);
        assert_eq!(s, "...11010011...");
        let s = context_snippet(&bits, FramePosition::new(0, 4), DEFAULT_CONTEXT_MARGIN);
        assert_eq!(s, "111111111...");
    }
}
