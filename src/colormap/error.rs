//! Error types for colormap loading and label selection.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while parsing, applying or caching a colormap.
#[derive(Error, Debug)]
pub enum ColormapError {
    /// The label description file could not be opened or read
    #[error("Failed to read colormap file {path:?}: {source}")]
    Io {
        /// Path of the file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Fewer than two delimiter lines were present
    #[error("{file}: expected two delimiter lines, found {found}")]
    MissingDelimiter {
        /// Name of the file being parsed
        file: String,
        /// Number of delimiter lines that were found
        found: usize,
    },

    /// A label record has fewer tokens than required
    #[error("{file}:{line}: malformed label record: {reason}")]
    MalformedRecord {
        /// Name of the file being parsed
        file: String,
        /// 1-based line number
        line: usize,
        /// Description of the problem
        reason: String,
    },

    /// A numeric field holds a value that could not be parsed
    #[error("{file}:{line}: invalid {field} '{token}'")]
    InvalidToken {
        /// Name of the file being parsed
        file: String,
        /// 1-based line number
        line: usize,
        /// Which field the token belongs to
        field: &'static str,
        /// The offending token
        token: String,
    },

    /// The same label id appears twice (or re-uses the background id)
    #[error("{file}:{line}: duplicate label id {id}")]
    DuplicateLabel {
        /// Name of the file being parsed
        file: String,
        /// 1-based line number
        line: usize,
        /// The repeated id
        id: u32,
    },

    /// The chosen label is not part of the choice list
    #[error("Label '{value}' is not in the current choice list")]
    InvalidSelection {
        /// The rejected value
        value: String,
    },

    /// Copying the colormap to the cache slot failed
    #[error("Failed to cache colormap at {path:?}: {source}")]
    CacheWrite {
        /// Cache slot path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ColormapError {
    /// Create a malformed record error.
    pub fn malformed(file: impl Into<String>, line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            file: file.into(),
            line,
            reason: reason.into(),
        }
    }

    /// Create an invalid token error.
    pub fn invalid_token(
        file: impl Into<String>,
        line: usize,
        field: &'static str,
        token: impl Into<String>,
    ) -> Self {
        Self::InvalidToken {
            file: file.into(),
            line,
            field,
            token: token.into(),
        }
    }

    /// Whether this error came from the file contents rather than I/O or selection.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::MissingDelimiter { .. }
                | Self::MalformedRecord { .. }
                | Self::InvalidToken { .. }
                | Self::DuplicateLabel { .. }
        )
    }
}
