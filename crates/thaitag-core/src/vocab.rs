//! # Label Vocabulary
//!
//! Namespaced, bidirectional mapping between strings and dense ids. Token
//! namespaces reserve id 0 for padding and id 1 for unknown entries; label
//! namespaces have no reserved ids.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TaggingError};
use crate::reader::SentenceRecord;

pub const PADDING_TOKEN: &str = "@@PADDING@@";
pub const UNKNOWN_TOKEN: &str = "@@UNKNOWN@@";
pub const PADDING_INDEX: usize = 0;
pub const UNKNOWN_INDEX: usize = 1;

/// Independent id space for one kind of string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    Tokens,
    Characters,
    PosTags,
    NeTags,
    CharPosTags,
    CharNeTags,
    WsTags,
}

impl Namespace {
    /// Whether the namespace reserves padding and unknown ids.
    pub fn is_padded(&self) -> bool {
        matches!(self, Namespace::Tokens | Namespace::Characters)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Tokens => "tokens",
            Namespace::Characters => "characters",
            Namespace::PosTags => "pos_tags",
            Namespace::NeTags => "ne_tags",
            Namespace::CharPosTags => "char_pos_tags",
            Namespace::CharNeTags => "char_ne_tags",
            Namespace::WsTags => "ws_tags",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
struct Entries {
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl Entries {
    fn padded() -> Self {
        let mut entries = Self::default();
        entries.add(PADDING_TOKEN);
        entries.add(UNKNOWN_TOKEN);
        entries
    }

    fn add(&mut self, label: &str) -> usize {
        if let Some(&id) = self.index.get(label) {
            return id;
        }
        let id = self.labels.len();
        self.labels.push(label.to_string());
        self.index.insert(label.to_string(), id);
        id
    }
}

impl From<Vec<String>> for Entries {
    fn from(labels: Vec<String>) -> Self {
        let index = labels
            .iter()
            .enumerate()
            .map(|(id, label)| (label.clone(), id))
            .collect();
        Self { labels, index }
    }
}

impl From<Entries> for Vec<String> {
    fn from(entries: Entries) -> Self {
        entries.labels
    }
}

/// String <-> id mappings for every [`Namespace`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelVocabulary {
    namespaces: BTreeMap<Namespace, Entries>,
}

impl LabelVocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a vocabulary from every record in `records`.
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a SentenceRecord>,
    {
        let mut vocab = Self::new();
        for record in records {
            vocab.extend_from_record(record);
        }
        vocab
    }

    fn entries_mut(&mut self, namespace: Namespace) -> &mut Entries {
        self.namespaces.entry(namespace).or_insert_with(|| {
            if namespace.is_padded() {
                Entries::padded()
            } else {
                Entries::default()
            }
        })
    }

    /// Add `label` to `namespace`, returning its id.
    pub fn add(&mut self, namespace: Namespace, label: &str) -> usize {
        self.entries_mut(namespace).add(label)
    }

    /// Add every string a record carries to its namespace.
    pub fn extend_from_record(&mut self, record: &SentenceRecord) {
        for token in &record.tokens {
            self.add(Namespace::Tokens, &token.text);
        }
        let word_labels = [
            (Namespace::PosTags, &record.pos_tags),
            (Namespace::NeTags, &record.ne_tags),
        ];
        for (namespace, tags) in word_labels {
            for tag in tags.iter().flatten() {
                self.add(namespace, tag);
            }
        }

        let Some(chars) = &record.chars else {
            return;
        };
        for token in &chars.char_tokens {
            self.add(Namespace::Characters, &token.text);
        }
        for label in &chars.char_label {
            self.add(Namespace::WsTags, label.as_str());
        }
        let char_labels = [
            (Namespace::CharPosTags, &chars.char_pos_tags),
            (Namespace::CharNeTags, &chars.char_ne_tags),
        ];
        for (namespace, tags) in char_labels {
            for tag in tags.iter().flatten() {
                self.add(namespace, tag);
            }
        }
    }

    /// Id of `label`, if present.
    pub fn get_index(&self, namespace: Namespace, label: &str) -> Option<usize> {
        self.namespaces
            .get(&namespace)
            .and_then(|entries| entries.index.get(label).copied())
    }

    /// Id of `label`, falling back to the unknown id in padded namespaces.
    ///
    /// # Errors
    ///
    /// Returns `TaggingError::Vocabulary` for a missing label in a label namespace.
    pub fn index_of(&self, namespace: Namespace, label: &str) -> Result<usize> {
        match self.get_index(namespace, label) {
            Some(id) => Ok(id),
            None if namespace.is_padded() => Ok(UNKNOWN_INDEX),
            None => Err(TaggingError::Vocabulary {
                namespace: namespace.to_string(),
                label: label.to_string(),
            }),
        }
    }

    /// Label for `id`, if present.
    pub fn get_label(&self, namespace: Namespace, id: usize) -> Option<&str> {
        self.namespaces
            .get(&namespace)
            .and_then(|entries| entries.labels.get(id))
            .map(String::as_str)
    }

    /// All labels of `namespace`, ordered by id.
    pub fn labels(&self, namespace: Namespace) -> &[String] {
        self.namespaces
            .get(&namespace)
            .map(|entries| entries.labels.as_slice())
            .unwrap_or_default()
    }

    /// Number of ids in `namespace`, reserved ids included.
    pub fn size(&self, namespace: Namespace) -> usize {
        match self.namespaces.get(&namespace) {
            Some(entries) => entries.labels.len(),
            None if namespace.is_padded() => 2,
            None => 0,
        }
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| TaggingError::io(path, e))
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| TaggingError::io(path, e))?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{CorpusReader, ReaderConfig};

    fn record() -> SentenceRecord {
        let reader = CorpusReader::new(ReaderConfig::default()).unwrap();
        reader.parse_sentence("สม/NR/PER_B|ชาย/NR/PER_I|กิน/VV/O|ปลา/NN/O")
    }

    #[test]
    fn test_ids_are_dense_and_stable() {
        let mut vocab = LabelVocabulary::new();
        assert_eq!(vocab.add(Namespace::NeTags, "O"), 0);
        assert_eq!(vocab.add(Namespace::NeTags, "B-PER"), 1);
        assert_eq!(vocab.add(Namespace::NeTags, "O"), 0);
        assert_eq!(vocab.size(Namespace::NeTags), 2);
        assert_eq!(vocab.get_label(Namespace::NeTags, 1), Some("B-PER"));
    }

    #[test]
    fn test_padded_namespaces_reserve_ids() {
        let mut vocab = LabelVocabulary::new();
        assert_eq!(vocab.size(Namespace::Tokens), 2);
        assert_eq!(vocab.add(Namespace::Tokens, "แมว"), 2);
        assert_eq!(vocab.get_label(Namespace::Tokens, PADDING_INDEX), Some(PADDING_TOKEN));
        assert_eq!(vocab.index_of(Namespace::Tokens, "หมา").unwrap(), UNKNOWN_INDEX);
    }

    #[test]
    fn test_missing_label_is_an_error() {
        let vocab = LabelVocabulary::new();
        let err = vocab.index_of(Namespace::NeTags, "B-XYZ").unwrap_err();
        assert!(matches!(err, TaggingError::Vocabulary { .. }));
    }

    #[test]
    fn test_namespaces_are_independent() {
        let vocab = LabelVocabulary::from_records([&record()]);
        assert_eq!(vocab.labels(Namespace::NeTags), ["B-PER", "I-PER", "O"]);
        assert_eq!(vocab.labels(Namespace::PosTags), ["NR", "VV", "NN"]);
        assert_eq!(vocab.labels(Namespace::WsTags), ["B", "I"]);
        assert_eq!(vocab.size(Namespace::Tokens), 6);
        assert!(vocab.get_index(Namespace::CharNeTags, "B-PER").is_some());
        assert!(vocab.get_index(Namespace::PosTags, "B-PER").is_none());
    }

    #[test]
    fn test_json_round_trip() {
        let vocab = LabelVocabulary::from_records([&record()]);
        let json = serde_json::to_string(&vocab).unwrap();
        let back: LabelVocabulary = serde_json::from_str(&json).unwrap();
        assert_eq!(vocab, back);
        assert_eq!(back.get_index(Namespace::NeTags, "O"), Some(2));
    }
}
