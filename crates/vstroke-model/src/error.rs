//! Error types for the stroke codec.

use thiserror::Error;

/// Errors that can occur while reading or writing stroke files.
#[derive(Error, Debug)]
pub enum CodecError {
    /// I/O error reading or writing a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The first line is not the expected column header.
    #[error("unexpected header: {found:?}")]
    Format {
        /// The header line that was found (empty if the file was empty).
        found: String,
    },

    /// A row could not be parsed.
    #[error("parse error at line {line}, field `{field}`: {message}")]
    Parse {
        /// Line number (1-indexed, the header is line 1).
        line: usize,
        /// Column name of the offending field.
        field: &'static str,
        /// What went wrong.
        message: String,
    },
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
