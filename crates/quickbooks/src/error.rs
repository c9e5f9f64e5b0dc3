//! QuickBooks client errors.

use serde_json::Value;
use tallybridge_core::document::StoreError;
use tallybridge_core::migration::MigrationError;
use thiserror::Error;

/// Errors raised talking to QuickBooks Online.
#[derive(Debug, Error)]
pub enum QuickBooksError {
    /// Transport failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API rejected the token again after a refresh.
    #[error("QuickBooks rejected the access token")]
    Unauthorized,

    /// The API answered with an error status.
    #[error("QuickBooks returned {status}: {message}")]
    Status {
        /// HTTP status.
        status: u16,
        /// Fault detail from the body.
        message: String,
    },

    /// The token endpoint refused a grant.
    #[error("Token request failed ({status}): {message}")]
    TokenRequest {
        /// HTTP status.
        status: u16,
        /// `error_description` or `error` from the body.
        message: String,
    },

    /// The response did not have the expected shape.
    #[error("Invalid QuickBooks response: {0}")]
    InvalidResponse(String),

    /// A configured endpoint is not a valid URL.
    #[error("Invalid endpoint {url}: {message}")]
    InvalidEndpoint {
        /// Offending URL.
        url: String,
        /// Parse failure.
        message: String,
    },

    /// No tokens or realm have been stored.
    #[error("QuickBooks is not connected")]
    NotConnected,

    /// Connector record persistence failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl QuickBooksError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Http(_) => "QUICKBOOKS_HTTP_ERROR",
            Self::Unauthorized => "QUICKBOOKS_UNAUTHORIZED",
            Self::Status { .. } => "QUICKBOOKS_API_ERROR",
            Self::TokenRequest { .. } => "TOKEN_REQUEST_FAILED",
            Self::InvalidResponse(_) => "INVALID_QUICKBOOKS_RESPONSE",
            Self::InvalidEndpoint { .. } => "INVALID_ENDPOINT",
            Self::NotConnected => "NOT_CONNECTED",
            Self::Store(err) => err.error_code(),
        }
    }
}

impl From<QuickBooksError> for MigrationError {
    fn from(err: QuickBooksError) -> Self {
        match err {
            QuickBooksError::NotConnected => Self::NotConnected,
            QuickBooksError::Store(err) => Self::Store(err),
            other => Self::api(other),
        }
    }
}

/// Best available error text of a QuickBooks error body.
pub(crate) fn fault_message(body: &Value, status: u16) -> String {
    body["Fault"]["Error"][0]["Detail"]
        .as_str()
        .or_else(|| body["Fault"]["Error"][0]["Message"].as_str())
        .or_else(|| body["fault"]["error"][0]["detail"].as_str())
        .or_else(|| body["error_description"].as_str())
        .or_else(|| body["error"].as_str())
        .map_or_else(|| format!("HTTP {status}"), str::to_string)
}
