//! API error handling
//!
//! This module converts service errors into HTTP responses with appropriate
//! status codes and error messages.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use release_registry_service::ServiceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{error, warn};

/// API error type that can be converted to HTTP responses
#[derive(Debug)]
pub struct ApiError {
    status_code: StatusCode,
    message: String,
    error_code: Option<String>,
}

impl ApiError {
    /// Create a new API error
    pub fn new(status_code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
            error_code: None,
        }
    }

    /// Create an API error with an error code
    pub fn with_code(
        status_code: StatusCode,
        message: impl Into<String>,
        error_code: impl Into<String>,
    ) -> Self {
        Self {
            status_code,
            message: message.into(),
            error_code: Some(error_code.into()),
        }
    }

    /// Create a bad request error (400)
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::BAD_REQUEST, message, "INVALID_INPUT")
    }

    /// Create a not found error (404)
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::NOT_FOUND, message, "NOT_FOUND")
    }

    /// Create an internal server error (500)
    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

/// Error response JSON structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP status code
    pub status: u16,

    /// Error message
    pub error: String,

    /// Optional error code for programmatic handling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Timestamp of the error
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_response = ErrorResponse {
            status: self.status_code.as_u16(),
            error: self.message,
            code: self.error_code,
            timestamp: chrono::Utc::now(),
        };

        (self.status_code, Json(error_response)).into_response()
    }
}

/// Convert ServiceError to ApiError
impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(msg) => ApiError::not_found(msg),
            ServiceError::CorruptRecord(msg) => {
                warn!("Serving 404 for unreadable record: {}", msg);
                ApiError::not_found(msg)
            }
            ServiceError::InvalidInput(msg) => ApiError::bad_request(msg),
            ServiceError::Inconsistent(msg) => {
                error!("Strict listing failed: {}", msg);
                ApiError::with_code(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Registry inconsistency: {}", msg),
                    "REGISTRY_INCONSISTENT",
                )
            }
            ServiceError::Storage(msg) => {
                error!("Storage error: {}", msg);
                ApiError::with_code(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Storage error: {}", msg),
                    "STORAGE_ERROR",
                )
            }
            ServiceError::Internal(msg) => {
                error!("Internal error: {}", msg);
                ApiError::with_code(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Internal error: {}", msg),
                    "INTERNAL_ERROR",
                )
            }
        }
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
