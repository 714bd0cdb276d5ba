// src/highlight/mod.rs
//! Highlighting engine: partitions a mail body into an ordered sequence of
//! plain and tagged segments for human review.
//!
//! Pure and deterministic: same text + same reference name always yields the
//! same segmentation. Concatenating all segment texts in order reproduces the
//! input byte-for-byte.

pub mod patterns;

use serde::{Deserialize, Serialize};

use crate::highlight::patterns::{Pattern, PatternCategory, PatternSet};

/// A contiguous substring of the input, either plain or tagged with exactly
/// one recognized category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<PatternCategory>,
}

impl Segment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: None,
        }
    }

    pub fn tagged(text: impl Into<String>, category: PatternCategory) -> Self {
        Self {
            text: text.into(),
            category: Some(category),
        }
    }

    pub fn is_tagged(&self) -> bool {
        self.category.is_some()
    }
}

/// Segment `text` using the standard pattern library plus a sender-name rule
/// derived from `reference_name`.
pub fn segment(text: &str, reference_name: &str) -> Vec<Segment> {
    segment_with(text, &PatternSet::for_sender(reference_name))
}

/// Same as [`segment`] but with a caller-built `PatternSet`.
///
/// One rule at a time, in set order, over the current segment sequence.
/// Only still-plain segments are scanned; segments tagged by an earlier rule
/// are never re-entered, so the earlier rule wins on overlapping candidates.
pub fn segment_with(text: &str, set: &PatternSet) -> Vec<Segment> {
    let mut segments = vec![Segment::plain(text)];
    for pattern in set.iter() {
        let mut next = Vec::with_capacity(segments.len());
        for seg in segments {
            if seg.is_tagged() {
                next.push(seg);
            } else {
                split_plain(&seg.text, pattern, &mut next);
            }
        }
        segments = next;
    }
    segments
}

/// Split one plain stretch around the non-overlapping matches of `pattern`,
/// left to right. Never emits an empty sub-segment (except for empty input,
/// which stays a single empty plain segment).
fn split_plain(text: &str, pattern: &Pattern, out: &mut Vec<Segment>) {
    if text.is_empty() {
        out.push(Segment::plain(text));
        return;
    }

    let mut last = 0usize;
    for m in pattern.regex.find_iter(text) {
        if m.start() == m.end() {
            continue;
        }
        if m.start() > last {
            out.push(Segment::plain(&text[last..m.start()]));
        }
        out.push(Segment::tagged(m.as_str(), pattern.category));
        last = m.end();
    }
    if last < text.len() {
        out.push(Segment::plain(&text[last..]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concat(segments: &[Segment]) -> String {
        segments.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn empty_input_is_a_single_empty_plain_segment() {
        let segs = segment("", "Jean");
        assert_eq!(segs, vec![Segment::plain("")]);
    }

    #[test]
    fn text_without_matches_is_left_intact() {
        let body = "Rien de particulier dans ce message.";
        let segs = segment(body, "Zelda");
        assert_eq!(segs, vec![Segment::plain(body)]);
    }

    #[test]
    fn worked_example_from_the_roadmap() {
        let segs = segment("Contact: a@b.com on 5 mars", "Jean");
        assert_eq!(
            segs,
            vec![
                Segment::plain("Contact: "),
                Segment::tagged("a@b.com", PatternCategory::Contact),
                Segment::plain(" on "),
                Segment::tagged("5 mars", PatternCategory::Date),
            ]
        );
    }

    #[test]
    fn concatenation_reproduces_the_input() {
        let body = "Bonjour Sophie,\nle 25 février à 120,50 € — tel 06 12 34 56 78,\nsophie.lemaire@example.com";
        let segs = segment(body, "Sophie Lemaire");
        assert_eq!(concat(&segs), body);
        assert!(segs.iter().all(|s| !s.text.is_empty()));
    }

    #[test]
    fn earlier_rule_wins_on_overlap() {
        // The sender's first name occurs inside the address; the contact rule
        // runs first and the tagged span is never re-scanned.
        let segs = segment("jean.dupont@hotel.fr", "Jean Dupont");
        assert_eq!(
            segs,
            vec![Segment::tagged(
                "jean.dupont@hotel.fr",
                PatternCategory::Contact
            )]
        );
    }

    #[test]
    fn adjacent_matches_stay_separate_segments() {
        let segs = segment("5 mars 120 €", "Jean");
        let tagged: Vec<_> = segs.iter().filter(|s| s.is_tagged()).collect();
        assert_eq!(tagged.len(), 2);
        assert_eq!(concat(&segs), "5 mars 120 €");
    }

    #[test]
    fn no_segment_carries_more_than_one_category() {
        // `category` is an Option, so double tagging is unrepresentable; this
        // guards the scan loop against re-tagging an already tagged span.
        let body = "Sophie (sophie@ex.fr) le 12/03 pour 300 euros";
        let first = segment(body, "Sophie");
        let second = segment(body, "Sophie");
        assert_eq!(first, second, "segmentation must be repeatable");
    }
}
