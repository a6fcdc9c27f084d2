//! # Sentence Assembler
//!
//! Folds parsed words into a [`SentenceRecord`], deriving the character view
//! (characters, `B`/`I` boundaries, broadcast tags) from the word boundaries
//! the delimiters already give us.

use serde::{Deserialize, Serialize};

use crate::reader::chunk::RawAnnotatedWord;
use crate::reader::tokenizer::{CharTokenizer, Token};
use crate::tags::SegmentTag;

/// Surface emitted for a gap between two consecutive delimiters.
pub const SYNTHETIC_SPACE: &str = " ";

/// Character-level view of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharView {
    pub char_tokens: Vec<Token>,
    /// Word-boundary label per character
    pub char_label: Vec<SegmentTag>,
    pub char_pos_tags: Option<Vec<String>>,
    pub char_ne_tags: Option<Vec<String>>,
}

/// One sentence (or file) worth of tokens and labels.
///
/// `word_len[i]` is the number of character-view entries contributed by
/// `tokens[i]`, which lets consumers align the word and character views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceRecord {
    pub tokens: Vec<Token>,
    pub word_len: Vec<usize>,
    pub pos_tags: Option<Vec<String>>,
    pub ne_tags: Option<Vec<String>>,
    pub chars: Option<CharView>,
}

impl SentenceRecord {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Word surfaces in order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|t| t.text.as_str())
    }

    /// Check the parallel-array invariants, returning a description of the
    /// first violation.
    pub fn check_alignment(&self) -> std::result::Result<(), String> {
        let n = self.tokens.len();
        if self.word_len.len() != n {
            return Err(format!("word_len has {} entries for {n} tokens", self.word_len.len()));
        }
        for (name, tags) in [("pos_tags", &self.pos_tags), ("ne_tags", &self.ne_tags)] {
            if let Some(tags) = tags {
                if tags.len() != n {
                    return Err(format!("{name} has {} entries for {n} tokens", tags.len()));
                }
            }
        }
        for (i, token) in self.tokens.iter().enumerate() {
            if token.index != i || token.end.checked_sub(token.start) != Some(self.word_len[i]) {
                return Err(format!("token {i} offsets disagree with word_len"));
            }
        }

        let Some(chars) = &self.chars else {
            return Ok(());
        };
        let total: usize = self.word_len.iter().sum();
        if chars.char_tokens.len() != total || chars.char_label.len() != total {
            return Err(format!(
                "character view has {} tokens and {} labels, word_len sums to {total}",
                chars.char_tokens.len(),
                chars.char_label.len()
            ));
        }
        for (name, tags) in [
            ("char_pos_tags", &chars.char_pos_tags),
            ("char_ne_tags", &chars.char_ne_tags),
        ] {
            if let Some(tags) = tags {
                if tags.len() != total {
                    return Err(format!("{name} has {} entries for {total} characters", tags.len()));
                }
            }
        }

        let mut offset = 0;
        for (i, &len) in self.word_len.iter().enumerate() {
            for (j, label) in chars.char_label[offset..offset + len].iter().enumerate() {
                if *label != SegmentTag::for_position(j) {
                    return Err(format!("word {i} has boundary {label} at character {j}"));
                }
            }
            offset += len;
        }
        Ok(())
    }
}

/// Builds records from parsed words.
#[derive(Debug, Clone, Copy)]
pub struct SentenceAssembler {
    tokenizer: CharTokenizer,
    character_view: bool,
    labels: bool,
}

impl SentenceAssembler {
    pub fn new(tokenizer: CharTokenizer, character_view: bool, labels: bool) -> Self {
        Self {
            tokenizer,
            character_view,
            labels,
        }
    }

    /// Assemble `words`, in order, into one record.
    pub fn assemble<I>(&self, words: I) -> SentenceRecord
    where
        I: IntoIterator<Item = RawAnnotatedWord>,
    {
        let mut tokens = Vec::new();
        let mut word_len = Vec::new();
        let mut pos_tags = Vec::new();
        let mut ne_tags = Vec::new();

        let mut char_tokens = Vec::new();
        let mut char_label = Vec::new();
        let mut char_pos_tags = Vec::new();
        let mut char_ne_tags = Vec::new();

        let mut offset = 0;
        for word in words {
            let surface = if word.is_gap() {
                SYNTHETIC_SPACE
            } else {
                word.surface.as_str()
            };
            let units = self.tokenizer.split(surface);

            tokens.push(Token {
                text: surface.to_string(),
                start: offset,
                end: offset + units.len(),
                index: tokens.len(),
            });
            word_len.push(units.len());

            if self.character_view {
                for (position, unit) in units.iter().enumerate() {
                    char_tokens.push(Token {
                        text: unit.to_string(),
                        start: offset + position,
                        end: offset + position + 1,
                        index: char_tokens.len(),
                    });
                    char_label.push(SegmentTag::for_position(position));
                    if self.labels {
                        char_pos_tags.push(word.pos.clone());
                        char_ne_tags.push(word.ne.clone());
                    }
                }
            }

            offset += units.len();
            if self.labels {
                pos_tags.push(word.pos);
                ne_tags.push(word.ne);
            }
        }

        let labels = self.labels;
        SentenceRecord {
            tokens,
            word_len,
            pos_tags: labels.then_some(pos_tags),
            ne_tags: labels.then_some(ne_tags),
            chars: self.character_view.then(|| CharView {
                char_tokens,
                char_label,
                char_pos_tags: labels.then_some(char_pos_tags),
                char_ne_tags: labels.then_some(char_ne_tags),
            }),
        }
    }
}
