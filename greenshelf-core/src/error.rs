//! Core error types.
//!
//! Only lookup misses and malformed receiving data are errors. Missing
//! reference data degrades to a well-formed answer instead.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Batch not found: {0}")]
    UnknownBatch(String),

    #[error("Shelf not found: {0}")]
    UnknownShelf(String),

    #[error("Batch already received: {0}")]
    DuplicateBatch(String),

    #[error("Invalid batch {id}: {reason}")]
    InvalidBatch { id: String, reason: String },
}

impl CoreError {
    /// Lookup misses the caller can recover from by fixing the id.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::UnknownBatch(_) | CoreError::UnknownShelf(_))
    }
}

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
