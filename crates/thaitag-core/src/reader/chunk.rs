//! # Chunk Parser
//!
//! Turns one `|`-delimited chunk into a [`RawAnnotatedWord`]. Every input
//! resolves to a word; malformed chunks degrade to placeholder tokens.

use regex::Regex;

use crate::error::Result;
use crate::reader::cleaner::TextCleaner;
use crate::reader::config::{ReaderConfig, SPACE_TAG};
use crate::tags::{OUTSIDE, normalize_span_label};

/// Surface used for chunks that do not match the `surface/pos/ne` pattern.
pub const NEWLINE_PLACEHOLDER: &str = "\n";

/// One parsed chunk before assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAnnotatedWord {
    /// Word text; empty when the chunk marks a missing space
    pub surface: String,
    pub pos: String,
    pub ne: String,
}

impl RawAnnotatedWord {
    pub fn new(surface: impl Into<String>, pos: impl Into<String>, ne: impl Into<String>) -> Self {
        Self {
            surface: surface.into(),
            pos: pos.into(),
            ne: ne.into(),
        }
    }

    /// The word produced by two consecutive delimiters.
    pub fn gap() -> Self {
        Self::new("", SPACE_TAG, OUTSIDE)
    }

    /// Whether this word stands for a missing space and must be assembled
    /// as a synthetic `" "` token.
    pub fn is_gap(&self) -> bool {
        self.surface.is_empty()
    }
}

/// Parses cleaned chunks into words.
#[derive(Debug, Clone)]
pub struct ChunkParser {
    cleaner: TextCleaner,
    pattern: Regex,
    placeholder: (&'static str, &'static str),
    normalize_spans: bool,
}

impl ChunkParser {
    /// Build a parser for the given reader configuration.
    ///
    /// # Errors
    ///
    /// Returns `TaggingError::Regex` if a configured cleaning rule is invalid.
    pub fn new(config: &ReaderConfig) -> Result<Self> {
        Ok(Self {
            cleaner: TextCleaner::new(&config.effective_rules())?,
            // the last two slashes delimit the tags, the surface may contain '/'
            pattern: Regex::new(r"(.*)/(.*)/(.*)")?,
            placeholder: config.variant.placeholder_tags(),
            normalize_spans: config.span_normalization(),
        })
    }

    /// Parse one chunk.
    ///
    /// ```
    /// use thaitag_core::reader::{ChunkParser, ReaderConfig};
    ///
    /// let parser = ChunkParser::new(&ReaderConfig::default()).unwrap();
    /// let word = parser.parse("ก.ม./CL/MEA_BI");
    /// assert_eq!(word.surface, "ก.ม.");
    /// assert_eq!(word.ne, "B-MEA");
    /// ```
    pub fn parse(&self, chunk: &str) -> RawAnnotatedWord {
        let (pos, ne) = self.placeholder;
        let mut units = chunk.chars();
        match (units.next(), units.next()) {
            (None, _) => RawAnnotatedWord::gap(),
            (Some(_), None) => RawAnnotatedWord::new(chunk, pos, ne),
            _ => {
                let cleaned = self.cleaner.clean(chunk);
                match self.pattern.captures(&cleaned) {
                    Some(caps) => {
                        let ne = caps[3].trim();
                        let ne = if self.normalize_spans {
                            normalize_span_label(ne).into_owned()
                        } else {
                            ne.to_string()
                        };
                        RawAnnotatedWord::new(&caps[1], caps[2].trim(), ne)
                    }
                    // runs of newlines and other untagged leftovers collapse to one token
                    None => RawAnnotatedWord::new(NEWLINE_PLACEHOLDER, pos, ne),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::config::ReaderVariant;

    fn span_aware() -> ChunkParser {
        ChunkParser::new(&ReaderConfig::default()).unwrap()
    }

    fn legacy() -> ChunkParser {
        ChunkParser::new(&ReaderConfig::new().with_variant(ReaderVariant::Legacy)).unwrap()
    }

    #[test]
    fn test_well_formed_chunk() {
        let word = span_aware().parse("แมว/NN/O");
        assert_eq!(word, RawAnnotatedWord::new("แมว", "NN", "O"));
    }

    #[test]
    fn test_tags_are_trimmed() {
        let word = span_aware().parse("แมว/ NN / PER_B \n");
        assert_eq!(word.pos, "NN");
        assert_eq!(word.ne, "B-PER");
    }

    #[test]
    fn test_surface_may_contain_slash() {
        let word = span_aware().parse("1/2/NU/O");
        assert_eq!(word.surface, "1/2");
        assert_eq!(word.pos, "NU");
        assert_eq!(word.ne, "O");
    }

    #[test]
    fn test_leading_newline_is_skipped() {
        let word = span_aware().parse("\nแมว/NN/O");
        assert_eq!(word.surface, "แมว");
    }

    #[test]
    fn test_unmatched_chunk_becomes_newline_placeholder() {
        assert_eq!(
            span_aware().parse("\n\n\n"),
            RawAnnotatedWord::new("\n", "space", "O")
        );
        assert_eq!(
            legacy().parse("\n\n"),
            RawAnnotatedWord::new("\n", "space", "space")
        );
    }

    #[test]
    fn test_empty_chunk_is_gap() {
        for parser in [span_aware(), legacy()] {
            let word = parser.parse("");
            assert!(word.is_gap());
            assert_eq!(word.pos, "space");
            assert_eq!(word.ne, "O");
        }
    }

    #[test]
    fn test_single_character_chunk_is_kept() {
        assert_eq!(
            span_aware().parse("\n"),
            RawAnnotatedWord::new("\n", "space", "O")
        );
        assert_eq!(
            legacy().parse(" "),
            RawAnnotatedWord::new(" ", "space", "space")
        );
    }

    #[test]
    fn test_cleaning_happens_before_matching() {
        let word = span_aware().parse("คำ/NN//O");
        assert_eq!(word, RawAnnotatedWord::new("คำ", "NN", "O"));

        let word = span_aware().parse("มท.1/NR/__");
        assert_eq!(word.ne, "B-ABB_DES");
    }

    #[test]
    fn test_legacy_keeps_suffix_labels() {
        let word = legacy().parse("สมชาย/NR/PER_B");
        assert_eq!(word.ne, "PER_B");
    }

    #[test]
    fn test_empty_surface_match() {
        let word = span_aware().parse("/NN/O");
        assert!(word.is_gap());
        assert_eq!(word.pos, "NN");
    }
}
