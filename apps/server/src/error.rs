//! # API Error Types
//!
//! Maps domain and storage errors onto HTTP responses.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  CoreError / DbError / ApplyError                                   │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ApiError { code, message }                                         │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  HTTP status + JSON body:                                           │
//! │    { "code": "INSUFFICIENT_STOCK", "message": "..." }               │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use stockbook_core::CoreError;
use stockbook_db::{ApplyError, DbError};

// =============================================================================
// Error Codes
// =============================================================================

/// Machine-readable error codes for API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    #[serde(rename = "NOT_FOUND")]
    NotFound,
    #[serde(rename = "VALIDATION_ERROR")]
    ValidationError,
    #[serde(rename = "INSUFFICIENT_STOCK")]
    InsufficientStock,
    #[serde(rename = "EMPTY_TRANSACTION")]
    EmptyTransaction,
    #[serde(rename = "DUPLICATE")]
    Duplicate,
    #[serde(rename = "INVALID_DATE")]
    InvalidDate,
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError,
}

impl ErrorCode {
    fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError
            | ErrorCode::InsufficientStock
            | ErrorCode::EmptyTransaction
            | ErrorCode::InvalidDate
            | ErrorCode::Duplicate => StatusCode::BAD_REQUEST,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// =============================================================================
// API Error
// =============================================================================

/// The one error type every handler returns.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::NotFound, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn invalid_date(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::InvalidDate, message)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    code: ErrorCode,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status();

        if status.is_server_error() {
            error!(code = ?self.code, message = %self.message, "Request failed");
        }

        let body = ErrorBody {
            code: self.code,
            message: self.message,
        };

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::ProductNotFound(_) => ErrorCode::NotFound,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::EmptyTransaction => ErrorCode::EmptyTransaction,
            CoreError::Validation(_) => ErrorCode::ValidationError,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<stockbook_core::ValidationError> for ApiError {
    fn from(err: stockbook_core::ValidationError) -> Self {
        CoreError::from(err).into()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        let code = match &err {
            DbError::NotFound { .. } => ErrorCode::NotFound,
            DbError::UniqueViolation { .. } => ErrorCode::Duplicate,
            DbError::ForeignKeyViolation { .. } => ErrorCode::ValidationError,
            // Constraint backstops and infrastructure failures are not
            // the client's fault.
            _ => ErrorCode::InternalError,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<ApplyError> for ApiError {
    fn from(err: ApplyError) -> Self {
        match err {
            ApplyError::Core(e) => e.into(),
            ApplyError::Db(e) => e.into(),
        }
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ErrorCode::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::InsufficientStock.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ErrorCode::Duplicate.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_core_error_conversion() {
        let api: ApiError = CoreError::EmptyTransaction.into();
        assert_eq!(api.code, ErrorCode::EmptyTransaction);

        let api: ApiError = CoreError::ProductNotFound("p1".to_string()).into();
        assert_eq!(api.code, ErrorCode::NotFound);
    }
}
