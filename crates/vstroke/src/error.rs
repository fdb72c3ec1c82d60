//! Error types for vstroke.

use thiserror::Error;
use vstroke_model::CodecError;

/// Errors that can occur while capturing, loading or saving drawings.
#[derive(Error, Debug)]
pub enum Error {
    /// Reading or writing a stroke file failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// I/O error outside the stroke codec.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A settings value is out of range.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// A settings file could not be parsed.
    #[error("invalid config file: {0}")]
    Config(#[from] toml::de::Error),

    /// A background task ended without reporting a result.
    #[error("background task `{0}` stopped before finishing")]
    TaskAborted(String),

    /// The operation is not allowed in the current state.
    #[error("{0}")]
    InvalidState(String),
}

/// Result type for vstroke operations.
pub type Result<T> = std::result::Result<T, Error>;
