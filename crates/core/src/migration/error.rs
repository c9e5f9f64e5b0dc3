//! Run-level errors.

use thiserror::Error;

use crate::document::StoreError;
use crate::source::SourceError;

/// Boxed error returned by API implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that abort a migration run.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The QuickBooks API could not be reached or refused the request.
    #[error("QuickBooks API error: {0}")]
    Api(BoxError),

    /// QuickBooks answered with an unusable payload.
    #[error(transparent)]
    Payload(#[from] SourceError),

    /// Document or connector storage failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Another run holds the connector.
    #[error("A migration is already in progress")]
    AlreadyRunning,

    /// No QuickBooks tokens have been stored yet.
    #[error("QuickBooks is not connected")]
    NotConnected,
}

impl MigrationError {
    /// Wraps an API implementation error.
    pub fn api(err: impl Into<BoxError>) -> Self {
        Self::Api(err.into())
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Api(_) => "QUICKBOOKS_API_ERROR",
            Self::Payload(_) => "INVALID_PAYLOAD",
            Self::Store(err) => err.error_code(),
            Self::AlreadyRunning => "MIGRATION_IN_PROGRESS",
            Self::NotConnected => "NOT_CONNECTED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_keeps_message() {
        let err = MigrationError::api("token endpoint returned 500");
        assert_eq!(err.to_string(), "QuickBooks API error: token endpoint returned 500");
        assert_eq!(err.error_code(), "QUICKBOOKS_API_ERROR");
    }
}
