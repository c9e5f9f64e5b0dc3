//! JSON error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tallybridge_core::document::StoreError;
use tallybridge_core::migration::MigrationError;
use tallybridge_quickbooks::QuickBooksError;
use tallybridge_shared::AppError;
use tracing::error;

/// An error rendered as `{"error": code, "message": text}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Creates an error with an explicit status and code.
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// HTTP status of the response.
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine readable code of the response.
    pub const fn code(&self) -> &'static str {
        self.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "error": self.code, "message": self.message })),
        )
            .into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, err.error_code(), err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        error!(error = %err, "Storage request failed");
        let code = err.error_code();
        let app = match err {
            StoreError::Backend(message) => AppError::Database(message),
            other => AppError::Validation(other.to_string()),
        };
        Self {
            code,
            ..Self::from(app)
        }
    }
}

impl From<MigrationError> for ApiError {
    fn from(err: MigrationError) -> Self {
        let code = err.error_code();
        let app = match &err {
            MigrationError::AlreadyRunning => AppError::Conflict(err.to_string()),
            MigrationError::NotConnected => AppError::Validation(err.to_string()),
            MigrationError::Api(_) => AppError::ExternalService(err.to_string()),
            MigrationError::Store(_) => AppError::Database(err.to_string()),
            MigrationError::Payload(_) => AppError::Internal(err.to_string()),
        };
        Self {
            code,
            ..Self::from(app)
        }
    }
}

impl From<QuickBooksError> for ApiError {
    fn from(err: QuickBooksError) -> Self {
        let code = err.error_code();
        let app = match &err {
            QuickBooksError::NotConnected => AppError::Validation(err.to_string()),
            QuickBooksError::Store(_) => AppError::Database(err.to_string()),
            QuickBooksError::InvalidEndpoint { .. } => AppError::Internal(err.to_string()),
            _ => AppError::ExternalService(err.to_string()),
        };
        Self {
            code,
            ..Self::from(app)
        }
    }
}
