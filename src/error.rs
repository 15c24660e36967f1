//! Centralized error types for headertrace.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the headertrace library.
///
/// Parsing itself never fails: the splitter and the `Received` parser degrade
/// to best-effort results. These variants surface from file loading and from
/// the per-word decoding step, where the caller decides to keep the original
/// token instead.
#[derive(Error, Debug)]
pub enum HeaderError {
    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified file does not exist.
    #[error("Header file not found: {0}")]
    FileNotFound(PathBuf),

    /// The encoded-word names a transfer encoding other than `B` or `Q`.
    #[error("Unsupported encoded-word encoding: {0}")]
    UnsupportedEncoding(String),

    /// The encoded-word names a charset `encoding_rs` does not know.
    #[error("Unknown charset: {0}")]
    UnknownCharset(String),

    /// The encoded-word payload could not be decoded.
    #[error("Invalid encoded-word payload: {0}")]
    InvalidPayload(String),
}

/// Convenience alias for `Result<T, HeaderError>`.
pub type Result<T> = std::result::Result<T, HeaderError>;

impl HeaderError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<base64::DecodeError> for HeaderError {
    fn from(source: base64::DecodeError) -> Self {
        Self::InvalidPayload(source.to_string())
    }
}
