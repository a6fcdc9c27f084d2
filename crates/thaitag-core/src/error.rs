use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while configuring the corpus reader or building
/// label vocabularies.
///
/// Defects inside the corpus itself (malformed chunks, invalid UTF-8, missing
/// files) are recovered locally by the reader and never show up here.
#[derive(Debug, Error)]
pub enum TaggingError {
    /// A file needed for configuration or persistence could not be read or written.
    #[error("i/o error on {path:?}: {source}")]
    Io {
        /// The path that was being accessed.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A cleaning rule or built-in pattern failed to compile.
    #[error("regex compilation error: {0}")]
    Regex(#[from] regex::Error),

    /// A JSON config, rule list or vocabulary file is malformed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The reader configuration is inconsistent.
    #[error("invalid reader configuration: {0}")]
    Config(String),

    /// A label lookup failed in a namespace that has no unknown-label fallback.
    #[error("label {label:?} not found in namespace {namespace}")]
    Vocabulary {
        /// The namespace that was queried.
        namespace: String,
        /// The missing label.
        label: String,
    },
}

impl TaggingError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for thaitag core operations.
pub type Result<T> = std::result::Result<T, TaggingError>;
