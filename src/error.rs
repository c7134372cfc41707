//! Error types for the docxtext library.

use std::io;
use thiserror::Error;

/// Result type alias for docxtext operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, laying out, or writing a document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The document model could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration file could not be read or written.
    #[error("Config error: {0}")]
    Config(String),

    /// The file format is recognized but not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Cell spans of a table do not tile its grid.
    #[error("Malformed table structure at row {row}, column {col}: {reason}")]
    MalformedTableStructure {
        /// Row of the offending cell
        row: usize,
        /// Column of the offending cell
        col: usize,
        /// What went wrong
        reason: String,
    },

    /// Nested tables go deeper than the configured maximum.
    #[error("Layout depth exceeded: nesting level {depth} is above the maximum of {max}")]
    LayoutDepthExceeded {
        /// Nesting level that was requested
        depth: usize,
        /// Configured maximum nesting level
        max: usize,
    },

    /// Invalid or malformed data in the document model.
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl Error {
    /// Build a `MalformedTableStructure` error.
    pub fn malformed(row: usize, col: usize, reason: impl Into<String>) -> Self {
        Error::MalformedTableStructure {
            row,
            col,
            reason: reason.into(),
        }
    }

    /// Whether this error only affects a single table and can be replaced by a
    /// placeholder in the output.
    pub fn is_table_local(&self) -> bool {
        matches!(
            self,
            Error::MalformedTableStructure { .. } | Error::LayoutDepthExceeded { .. }
        )
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Config(err.to_string())
    }
}
