//! Unified error handling for the dispatchd crate
//!
//! Domain-specific errors live with their modules ([`StoreError`] in
//! `store`, `ServerError` in `server`, `ConfigError` in `config`); this
//! module provides the crate-level [`Error`] enum that dispatch-path code
//! returns across module boundaries.

use thiserror::Error;

pub use crate::store::StoreError;

/// Unified error type for the dispatch path.
#[derive(Error, Debug)]
pub enum Error {
    /// Coordination store failures, including per-operation and task
    /// deadline expiries.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// JSON serialization failures. Unreachable for a validated task
    /// request, but surfaced rather than swallowed.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error is a deadline expiry rather than a hard fault.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Store(StoreError::OpTimeout(_)) | Self::Store(StoreError::ReceiveTimeout(_))
        )
    }
}

/// Result type alias using the unified [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_timeout_classification() {
        let err = Error::Store(StoreError::ReceiveTimeout(Duration::from_secs(30)));
        assert!(err.is_timeout());

        let err = Error::Store(StoreError::SubscriptionClosed);
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_store_error_conversion() {
        let err: Error = StoreError::SubscriptionClosed.into();
        assert!(matches!(err, Error::Store(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
