//! # Tag Schemes
//!
//! Word-boundary labels for the character view, conversion of the corpus's
//! suffix-tagged NE labels (`PER_B`) into prefix BIO labels (`B-PER`), and
//! span extraction from BIO label sequences.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Word-boundary label for one character unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentTag {
    /// First character of a word.
    B,
    /// Any later character of the same word.
    I,
}

impl SegmentTag {
    /// Label for the character at `position` within its word.
    pub fn for_position(position: usize) -> Self {
        if position == 0 {
            SegmentTag::B
        } else {
            SegmentTag::I
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentTag::B => "B",
            SegmentTag::I => "I",
        }
    }
}

impl fmt::Display for SegmentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outside label in the BIO scheme.
pub const OUTSIDE: &str = "O";

/// Rewrite a corpus NE label from suffix form to prefix BIO form.
///
/// `LABEL_B` becomes `B-LABEL` and `LABEL_I` becomes `I-LABEL`. Anything
/// else, including `O` and placeholder tags, is returned unchanged.
///
/// ```
/// use thaitag_core::tags::normalize_span_label;
///
/// assert_eq!(normalize_span_label("PER_B"), "B-PER");
/// assert_eq!(normalize_span_label("ABB_DES_I"), "I-ABB_DES");
/// assert_eq!(normalize_span_label("O"), "O");
/// ```
pub fn normalize_span_label(tag: &str) -> Cow<'_, str> {
    if let Some(label) = tag.strip_suffix("_B") {
        Cow::Owned(format!("B-{label}"))
    } else if let Some(label) = tag.strip_suffix("_I") {
        Cow::Owned(format!("I-{label}"))
    } else {
        Cow::Borrowed(tag)
    }
}

/// Prefix of a BIO label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BioPrefix {
    Begin,
    Inside,
    Outside,
}

/// Split a prefix-BIO label into its prefix and entity label.
///
/// Labels that carry neither a `B-`/`I-` prefix nor equal `O` (for example
/// the `space` placeholder) are read as outside.
pub fn split_bio(tag: &str) -> (BioPrefix, Option<&str>) {
    if let Some(label) = tag.strip_prefix("B-") {
        (BioPrefix::Begin, Some(label))
    } else if let Some(label) = tag.strip_prefix("I-") {
        (BioPrefix::Inside, Some(label))
    } else {
        (BioPrefix::Outside, None)
    }
}

/// A labelled span over a token sequence. `end` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub label: String,
    pub start: usize,
    pub end: usize,
}

/// Extract spans from a prefix-BIO label sequence.
///
/// An `I-X` that does not continue an open `X` span starts a new one.
pub fn bio_to_spans<S: AsRef<str>>(tags: &[S]) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut active: Option<(&str, usize)> = None;

    for (i, tag) in tags.iter().enumerate() {
        let (prefix, label) = split_bio(tag.as_ref());
        match (prefix, label) {
            (BioPrefix::Inside, Some(label)) if active.is_some_and(|(l, _)| l == label) => {}
            (BioPrefix::Begin | BioPrefix::Inside, Some(label)) => {
                if let Some((l, start)) = active.take() {
                    spans.push(Span {
                        label: l.to_string(),
                        start,
                        end: i,
                    });
                }
                active = Some((label, i));
            }
            _ => {
                if let Some((l, start)) = active.take() {
                    spans.push(Span {
                        label: l.to_string(),
                        start,
                        end: i,
                    });
                }
            }
        }
    }

    if let Some((l, start)) = active {
        spans.push(Span {
            label: l.to_string(),
            start,
            end: tags.len(),
        });
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_suffix_labels() {
        assert_eq!(normalize_span_label("PER_B"), "B-PER");
        assert_eq!(normalize_span_label("PER_I"), "I-PER");
        assert_eq!(normalize_span_label("MEA_B"), "B-MEA");
    }

    #[test]
    fn test_normalize_passthrough() {
        assert_eq!(normalize_span_label("O"), "O");
        assert_eq!(normalize_span_label("space"), "space");
        assert_eq!(normalize_span_label("B-PER"), "B-PER");
        assert!(matches!(normalize_span_label("O"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_segment_tag_positions() {
        assert_eq!(SegmentTag::for_position(0), SegmentTag::B);
        assert_eq!(SegmentTag::for_position(3), SegmentTag::I);
        assert_eq!(SegmentTag::I.to_string(), "I");
    }

    #[test]
    fn test_bio_to_spans_basic() {
        let spans = bio_to_spans(&["B-PER", "I-PER", "O", "B-LOC"]);
        assert_eq!(
            spans,
            vec![
                Span {
                    label: "PER".into(),
                    start: 0,
                    end: 2
                },
                Span {
                    label: "LOC".into(),
                    start: 3,
                    end: 4
                },
            ]
        );
    }

    #[test]
    fn test_bio_to_spans_dangling_inside() {
        let spans = bio_to_spans(&["O", "I-ORG", "I-ORG", "I-PER"]);
        assert_eq!(spans.len(), 2);
        assert_eq!((spans[0].start, spans[0].end), (1, 3));
        assert_eq!(spans[1].label, "PER");
    }

    #[test]
    fn test_bio_to_spans_placeholders_are_outside() {
        let spans = bio_to_spans(&["B-PER", "space", "B-PER"]);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].end, 1);
    }

    #[test]
    fn test_bio_to_spans_adjacent_begins() {
        let spans = bio_to_spans(&["B-PER", "B-PER"]);
        assert_eq!(spans.len(), 2);
    }
}
