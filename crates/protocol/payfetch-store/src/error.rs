//! Error types for the storage layer.

use payfetch_types::Cid;
use thiserror::Error;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Content not found in store.
    #[error("content not found: {0}")]
    ContentNotFound(Cid),

    /// Store was configured with an unusable chunk size.
    #[error("invalid chunk size: {0}")]
    InvalidChunkSize(usize),
}
