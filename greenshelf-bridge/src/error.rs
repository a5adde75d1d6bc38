//! Bridge error types.

use greenshelf_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Invalid parameter for {op}: {reason}")]
    InvalidParameter { op: String, reason: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rejected: {0}")]
    Rejected(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<CoreError> for BridgeError {
    fn from(err: CoreError) -> Self {
        if err.is_not_found() {
            BridgeError::NotFound(err.to_string())
        } else {
            BridgeError::Rejected(err.to_string())
        }
    }
}

/// Result type alias for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_lookup_misses_become_not_found() {
        let err: BridgeError = CoreError::UnknownShelf("S9".into()).into();
        assert!(matches!(err, BridgeError::NotFound(ref m) if m.contains("S9")));

        let err: BridgeError = CoreError::DuplicateBatch("B1".into()).into();
        assert!(matches!(err, BridgeError::Rejected(_)));
    }
}
