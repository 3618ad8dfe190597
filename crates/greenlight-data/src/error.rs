//! Error types for storage operations.

use thiserror::Error;

/// Result type for storage operations.
pub type DataResult<T> = Result<T, DataError>;

/// Errors returned by a [`MovieStore`](crate::MovieStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    /// No record matches the requested id.
    #[error("record not found")]
    RecordNotFound,

    /// The record changed since it was read.
    #[error("edit conflict")]
    EditConflict,

    /// The backing store failed.
    #[error("internal storage error: {0}")]
    Internal(String),
}

impl DataError {
    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}
