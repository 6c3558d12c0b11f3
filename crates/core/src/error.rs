//! Storage error types

use thiserror::Error;

/// Result type for raw storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Errors raised by a [`Storage`](crate::Storage) backend.
///
/// These never escape the [`CredentialStore`](crate::CredentialStore): it logs them and
/// reports the slot as absent.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing medium could not be read or written
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing medium holds data that is not a slot map
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend cannot be used at all (poisoned lock, no storage available)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    /// Create an unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}
