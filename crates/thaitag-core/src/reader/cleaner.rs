//! # Chunk Cleaner
//!
//! Repairs known annotation defects in raw `surface/pos/ne` chunks before
//! they are parsed. Rules are plain data applied in order, so corpus-specific
//! fixes can be shipped as a JSON file instead of code.

use std::borrow::Cow;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TaggingError};

/// One substitution: every match of `pattern` is replaced by `replacement`.
///
/// `pattern` uses `regex` crate syntax and `replacement` may reference
/// capture groups as `$1` or `${1}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningRule {
    pub pattern: String,
    pub replacement: String,
}

impl CleaningRule {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }
}

/// Built-in rule presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleSet {
    /// Corrections used by the word/POS reader.
    Legacy,
    /// Superset used by the span-aware NE reader.
    SpanAware,
}

impl RuleSet {
    /// The ordered rule list for this preset.
    pub fn rules(&self) -> Vec<CleaningRule> {
        let shared = [
            // doubled delimiter after common nouns and punctuation
            CleaningRule::new("/NN//", "/NN/"),
            CleaningRule::new("//PU/", "/PU/"),
        ];

        match self {
            RuleSet::Legacy => shared
                .into_iter()
                .chain([
                    CleaningRule::new("มท.1/NR/__", "มท.1/NR/ABB_DES_B"),
                    CleaningRule::new("MEA_BI", "MEA_B"),
                ])
                .collect(),
            RuleSet::SpanAware => shared
                .into_iter()
                .chain([
                    CleaningRule::new(r"มท\.([^/]*)/NR/__", "มท.${1}/NR/ABB_DES_B"),
                    CleaningRule::new("MEA_BI", "MEA_B"),
                    CleaningRule::new("ABB_BI", "ABB_B"),
                    CleaningRule::new("DES_BI", "DES_B"),
                    // POS and NE columns are swapped for this abbreviation
                    CleaningRule::new(
                        r"^(\s*)พ\.ศ\./ABB_B/NN(\s*)$",
                        "${1}พ.ศ./NN/ABB_B${2}",
                    ),
                ])
                .collect(),
        }
    }
}

/// Load an ordered rule list from a JSON array of `{pattern, replacement}`.
pub fn load_rules(path: impl AsRef<Path>) -> Result<Vec<CleaningRule>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| TaggingError::io(path, e))?;
    Ok(serde_json::from_str(&content)?)
}

/// Compiled, ordered chain of [`CleaningRule`]s.
#[derive(Debug, Clone)]
pub struct TextCleaner {
    rules: Vec<(Regex, String)>,
}

impl TextCleaner {
    /// Compile `rules` in order.
    ///
    /// # Errors
    ///
    /// Returns `TaggingError::Regex` if any pattern is invalid.
    pub fn new(rules: &[CleaningRule]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| -> Result<(Regex, String)> {
                Ok((Regex::new(&rule.pattern)?, rule.replacement.clone()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Compile one of the built-in presets.
    pub fn from_rule_set(rule_set: RuleSet) -> Result<Self> {
        Self::new(&rule_set.rules())
    }

    /// Apply every rule, in order, to `chunk`.
    ///
    /// # Examples
    /// ```
    /// use thaitag_core::reader::cleaner::{RuleSet, TextCleaner};
    ///
    /// let cleaner = TextCleaner::from_rule_set(RuleSet::Legacy).unwrap();
    /// assert_eq!(cleaner.clean("คำ/NN//"), "คำ/NN/");
    /// ```
    pub fn clean(&self, chunk: &str) -> String {
        let mut text = chunk.to_string();
        for (pattern, replacement) in &self.rules {
            let replaced = match pattern.replace_all(&text, replacement.as_str()) {
                Cow::Borrowed(_) => continue,
                Cow::Owned(replaced) => replaced,
            };
            text = replaced;
        }
        text
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
