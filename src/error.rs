use std::path::PathBuf;

use thiserror::Error;

use crate::mrkdwn::MarkupError;

/// Errors raised by the host side of the pipeline: reading settings and sources,
/// writing localized output, and compiling configured patterns.
///
/// Recoverable problems inside a single string (placeholder mismatches, malformed
/// rows) are never errors; they are logged and reported as warnings instead.
#[derive(Debug, Error)]
pub enum LoctoolError {
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON from '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid locale '{locale}'")]
    Locale { locale: String },

    #[error("Invalid row separator pattern '{pattern}': {source}")]
    RowSeparator {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid path pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Markup error in message '{key}': {source}")]
    Markup {
        key: String,
        #[source]
        source: MarkupError,
    },

    #[error("Failed to serialize output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Result type for loctool operations
pub type Result<T> = std::result::Result<T, LoctoolError>;
