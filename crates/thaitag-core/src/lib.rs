//! # thaitag Core
//!
//! Reader for BEST2010-style Thai annotation files (`surface/pos/ne` chunks
//! separated by `|`), plus the label vocabulary and span-based F1 metric used
//! by the tagging model.
//!
//! ## Quick Start
//!
//! ```rust
//! use thaitag_core::reader::{CorpusReader, ReaderConfig};
//!
//! let reader = CorpusReader::new(ReaderConfig::default()).unwrap();
//! let records = reader.parse_text("สมชาย/NR/PER_B|กิน/VV/O|ปลา/NN/O");
//!
//! assert_eq!(records[0].ne_tags.as_deref().unwrap(), ["B-PER", "O", "O"]);
//! ```
pub mod error;
pub mod metrics;
pub mod reader;
pub mod tags;
pub mod vocab;

// Re-export primary API
pub use error::{Result, TaggingError};
pub use metrics::SpanBasedF1;
pub use reader::{
    CharUnit, CorpusReader, ReaderConfig, ReaderVariant, SentenceBoundary, SentenceRecord, Token,
};
pub use tags::{SegmentTag, Span, bio_to_spans, normalize_span_label};
pub use vocab::{LabelVocabulary, Namespace};
