//! Error types for the wire protocol module.

use thiserror::Error;

/// Errors that can occur when encoding a message.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EncodeError {
    /// JSON encoding failed
    #[error("JSON encoding failed: {0}")]
    Json(String),

    /// Encoded message exceeds the maximum allowed size
    #[error("message too large: {size} bytes exceeds maximum {max} bytes")]
    MessageTooLarge {
        /// Actual size of the encoded message
        size: usize,
        /// Maximum allowed size
        max: usize,
    },

    /// I/O error while writing
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for EncodeError {
    fn from(err: serde_json::Error) -> Self {
        EncodeError::Json(err.to_string())
    }
}

impl From<std::io::Error> for EncodeError {
    fn from(err: std::io::Error) -> Self {
        EncodeError::Io(err.to_string())
    }
}

/// Errors that can occur when decoding a message.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// The line was not a valid message object
    #[error("message decode failed: {0}")]
    Json(String),

    /// Incoming line exceeds the maximum allowed size
    #[error("message too large: exceeds maximum {max} bytes")]
    MessageTooLarge {
        /// Maximum allowed size
        max: usize,
    },

    /// I/O error while reading
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::Json(err.to_string())
    }
}

impl From<std::io::Error> for DecodeError {
    fn from(err: std::io::Error) -> Self {
        DecodeError::Io(err.to_string())
    }
}
