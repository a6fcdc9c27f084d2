//! # Reader Configuration
//!
//! Selects the reader variant, cleaning rules, sentence granularity and which
//! views of each record are produced. Loadable from JSON; every field has a
//! default so a config file only needs the keys it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TaggingError};
use crate::reader::cleaner::{CleaningRule, RuleSet};
use crate::reader::tokenizer::CharUnit;
use crate::tags::OUTSIDE;

/// POS tag given to placeholder and synthetic space tokens.
pub const SPACE_TAG: &str = "space";

/// Which flavour of the BEST2010 reader to emulate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReaderVariant {
    /// Placeholders tagged `(space, space)`, NE labels kept in suffix form.
    Legacy,
    /// Placeholders tagged `(space, O)`, NE labels rewritten to prefix BIO.
    #[default]
    SpanAware,
}

impl ReaderVariant {
    pub fn rule_set(&self) -> RuleSet {
        match self {
            ReaderVariant::Legacy => RuleSet::Legacy,
            ReaderVariant::SpanAware => RuleSet::SpanAware,
        }
    }

    /// `(pos, ne)` for chunks that carry no usable annotation.
    pub fn placeholder_tags(&self) -> (&'static str, &'static str) {
        match self {
            ReaderVariant::Legacy => (SPACE_TAG, SPACE_TAG),
            ReaderVariant::SpanAware => (SPACE_TAG, OUTSIDE),
        }
    }

    pub fn normalizes_spans(&self) -> bool {
        matches!(self, ReaderVariant::SpanAware)
    }
}

/// How a file is divided into sentence records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SentenceBoundary {
    /// The whole file is one record.
    #[default]
    File,
    /// Whitespace-only lines separate records.
    BlankLine,
}

/// Configuration for [`CorpusReader`](crate::reader::CorpusReader).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Reader flavour; decides default rules, placeholder tags and span normalization
    pub variant: ReaderVariant,
    /// Explicit cleaning rules, replacing the variant's preset
    pub rules: Option<Vec<CleaningRule>>,
    /// Override for NE span normalization
    pub normalize_spans: Option<bool>,
    /// Sentence granularity within a file
    pub sentence_boundary: SentenceBoundary,
    /// Character unit for `word_len` and the character view
    pub char_unit: CharUnit,
    /// Whether to build the character-level view
    pub character_view: bool,
    /// Whether to emit label sequences (false for inference-only parsing)
    pub labels: bool,
    /// Chunk delimiter
    pub delimiter: char,
    /// File extension to read, without the dot
    pub extension: String,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            variant: ReaderVariant::default(),
            rules: None,
            normalize_spans: None,
            sentence_boundary: SentenceBoundary::default(),
            char_unit: CharUnit::default(),
            character_view: true,
            labels: true,
            delimiter: '|',
            extension: "txt".to_string(),
        }
    }
}

impl ReaderConfig {
    /// Create a new reader configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| TaggingError::io(path, e))?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_variant(mut self, variant: ReaderVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_rules(mut self, rules: Vec<CleaningRule>) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn with_span_normalization(mut self, enabled: bool) -> Self {
        self.normalize_spans = Some(enabled);
        self
    }

    pub fn with_sentence_boundary(mut self, boundary: SentenceBoundary) -> Self {
        self.sentence_boundary = boundary;
        self
    }

    pub fn with_char_unit(mut self, unit: CharUnit) -> Self {
        self.char_unit = unit;
        self
    }

    pub fn with_character_view(mut self, enabled: bool) -> Self {
        self.character_view = enabled;
        self
    }

    pub fn with_labels(mut self, enabled: bool) -> Self {
        self.labels = enabled;
        self
    }

    /// The cleaning rules in effect.
    pub fn effective_rules(&self) -> Vec<CleaningRule> {
        self.rules
            .clone()
            .unwrap_or_else(|| self.variant.rule_set().rules())
    }

    /// Whether NE tags are rewritten to prefix BIO form.
    pub fn span_normalization(&self) -> bool {
        self.normalize_spans
            .unwrap_or_else(|| self.variant.normalizes_spans())
    }

    /// The extension without any leading dot.
    pub fn file_extension(&self) -> &str {
        self.extension.trim_start_matches('.')
    }

    /// Reject settings the reader cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.delimiter == '/' {
            return Err(TaggingError::Config(
                "delimiter must differ from the '/' field separator".into(),
            ));
        }
        if self.file_extension().is_empty() {
            return Err(TaggingError::Config("file extension is empty".into()));
        }
        Ok(())
    }
}
