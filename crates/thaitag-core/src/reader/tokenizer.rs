//! # Character Tokenizer
//!
//! Splits word surfaces into character units for the character-level view.
//! Thai combining vowels and tone marks attach to their base consonant when
//! splitting by grapheme cluster, so `กิน` yields two units, not three.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// A word or character token with its position in the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The token text content
    pub text: String,
    /// Start offset in character units within the record
    pub start: usize,
    /// End offset (exclusive) in character units within the record
    pub end: usize,
    /// Token index in its sequence
    pub index: usize,
}

/// What counts as one character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CharUnit {
    /// Extended grapheme cluster.
    #[default]
    Grapheme,
    /// Unicode scalar value.
    CodePoint,
}

/// Splits surfaces into [`CharUnit`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharTokenizer {
    unit: CharUnit,
}

impl CharTokenizer {
    pub fn new(unit: CharUnit) -> Self {
        Self { unit }
    }

    /// Split `text` into character units, in order.
    ///
    /// # Examples
    /// ```
    /// use thaitag_core::reader::tokenizer::{CharTokenizer, CharUnit};
    ///
    /// let graphemes = CharTokenizer::new(CharUnit::Grapheme);
    /// assert_eq!(graphemes.split("กิน"), vec!["กิ", "น"]);
    ///
    /// let code_points = CharTokenizer::new(CharUnit::CodePoint);
    /// assert_eq!(code_points.split("กิน").len(), 3);
    /// ```
    pub fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        match self.unit {
            CharUnit::Grapheme => text.graphemes(true).collect(),
            CharUnit::CodePoint => text
                .char_indices()
                .map(|(idx, c)| &text[idx..idx + c.len_utf8()])
                .collect(),
        }
    }

    /// Number of character units in `text`.
    pub fn count(&self, text: &str) -> usize {
        match self.unit {
            CharUnit::Grapheme => text.graphemes(true).count(),
            CharUnit::CodePoint => text.chars().count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grapheme_split_thai() {
        let tokenizer = CharTokenizer::new(CharUnit::Grapheme);
        assert_eq!(tokenizer.split("แมว"), vec!["แ", "ม", "ว"]);
        assert_eq!(tokenizer.split("กิน"), vec!["กิ", "น"]);
        assert_eq!(tokenizer.split("ปลา"), vec!["ป", "ล", "า"]);
    }

    #[test]
    fn test_code_point_split() {
        let tokenizer = CharTokenizer::new(CharUnit::CodePoint);
        assert_eq!(tokenizer.split("กิน"), vec!["ก", "\u{0E34}", "น"]);
        assert_eq!(tokenizer.count("กิน"), 3);
    }

    #[test]
    fn test_count_matches_split() {
        for unit in [CharUnit::Grapheme, CharUnit::CodePoint] {
            let tokenizer = CharTokenizer::new(unit);
            for text in ["", " ", "\n", "มท.1", "ที่นี่", "a/b"] {
                assert_eq!(tokenizer.count(text), tokenizer.split(text).len());
            }
        }
    }

    #[test]
    fn test_empty_text() {
        let tokenizer = CharTokenizer::default();
        assert!(tokenizer.split("").is_empty());
    }
}
