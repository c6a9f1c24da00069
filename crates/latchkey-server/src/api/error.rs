//! API error types and response handling.
//!
//! This module provides a unified error type for all API handlers
//! with automatic conversion to appropriate HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use latchkey_core::{LatchkeyError, RepositoryError, SchedulerError};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type.
///
/// Each variant maps to a specific HTTP status code and produces a
/// consistent JSON error response.
#[derive(Debug, Clone)]
pub enum ApiError {
    /// 400 Bad Request - Invalid input from client.
    BadRequest {
        /// Machine-readable error code.
        error_code: String,
        /// Human-readable error message.
        message: String,
    },

    /// 404 Not Found - Resource does not exist.
    NotFound {
        /// Machine-readable error code.
        error_code: String,
        /// Human-readable error message.
        message: String,
    },

    /// 409 Conflict - Operation cannot be completed due to current state.
    Conflict {
        /// Machine-readable error code.
        error_code: String,
        /// Human-readable error message.
        message: String,
    },

    /// 502 Bad Gateway - The access code provider failed.
    BadGateway {
        /// Machine-readable error code.
        error_code: String,
        /// Human-readable error message.
        message: String,
    },

    /// 500 Internal Server Error - Unexpected server-side error.
    InternalError {
        /// Machine-readable error code.
        error_code: String,
        /// Human-readable error message.
        message: String,
    },
}

/// Standard JSON error response body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": "slot_unavailable",
    "message": "requested time slot is not available on device 'front-door-lock'"
}))]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "slot_unavailable").
    #[schema(example = "slot_unavailable")]
    pub error: String,

    /// Human-readable error message.
    #[schema(example = "requested time slot is not available")]
    pub message: String,
}

impl ApiError {
    /// Convenience constructor for 400 responses.
    pub fn bad_request(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            Self::BadRequest {
                error_code,
                message,
            } => (StatusCode::BAD_REQUEST, error_code, message),

            Self::NotFound {
                error_code,
                message,
            } => (StatusCode::NOT_FOUND, error_code, message),

            Self::Conflict {
                error_code,
                message,
            } => (StatusCode::CONFLICT, error_code, message),

            Self::BadGateway {
                error_code,
                message,
            } => (StatusCode::BAD_GATEWAY, error_code, message),

            Self::InternalError {
                error_code,
                message,
            } => {
                tracing::error!(
                    error_code = %error_code,
                    message = %message,
                    "Internal server error"
                );
                (StatusCode::INTERNAL_SERVER_ERROR, error_code, message)
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: error_code,
                message,
            }),
        )
            .into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest { message, .. } => write!(f, "Bad Request: {message}"),
            Self::NotFound { message, .. } => write!(f, "Not Found: {message}"),
            Self::Conflict { message, .. } => write!(f, "Conflict: {message}"),
            Self::BadGateway { message, .. } => write!(f, "Bad Gateway: {message}"),
            Self::InternalError { message, .. } => write!(f, "Internal Error: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Convert from latchkey_core errors, mapping the core's HTTP status
/// classification onto response variants.
impl From<LatchkeyError> for ApiError {
    fn from(err: LatchkeyError) -> Self {
        let error_code = err.error_code().to_ascii_lowercase();
        let message = err.to_string();
        match err.http_status_code() {
            400 => Self::BadRequest {
                error_code,
                message,
            },
            404 => Self::NotFound {
                error_code,
                message,
            },
            409 => Self::Conflict {
                error_code,
                message,
            },
            502 => Self::BadGateway {
                error_code,
                message,
            },
            _ => Self::InternalError {
                error_code,
                message,
            },
        }
    }
}

impl From<SchedulerError> for ApiError {
    fn from(err: SchedulerError) -> Self {
        Self::from(LatchkeyError::from(err))
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        Self::from(LatchkeyError::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latchkey_core::ValidationError;

    #[test]
    fn test_display_messages() {
        let err = ApiError::bad_request("test_error", "Test message");
        assert!(err.to_string().contains("Bad Request"));
    }

    #[test]
    fn test_error_response_serialization() {
        let response = ErrorResponse {
            error: "test_error".to_string(),
            message: "Test message".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("test_error"));
    }

    #[test]
    fn test_scheduler_error_mapping() {
        let err: ApiError = SchedulerError::SlotUnavailable {
            device_id: "front-door-lock".to_owned(),
        }
        .into();
        assert!(matches!(err, ApiError::Conflict { .. }));

        let err: ApiError = SchedulerError::Validation(ValidationError::StartInPast).into();
        assert!(matches!(err, ApiError::BadRequest { .. }));

        let err: ApiError = SchedulerError::CancellationNotAllowed.into();
        assert!(matches!(err, ApiError::Conflict { .. }));
    }
}
