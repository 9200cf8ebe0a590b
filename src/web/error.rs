//! HTTP error responses.
//!
//! Every handler failure is rendered as a JSON body with a stable machine
//! code, a human message, and optional per-field details. Internal errors
//! are logged server-side and surfaced generically.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::RippleError;

/// Machine-readable error codes for API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    ValidationFailed,
    Conflict,
    AuthenticationFailed,
    NotFound,
    Expired,
    Unauthenticated,
    Internal,
}

/// An API error ready to be rendered as a response.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: ErrorCode,
    pub message: String,
    pub details: Vec<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: ErrorCode,
    message: &'a str,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    details: &'a [String],
}

impl ApiError {
    pub fn new(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn unauthenticated() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            ErrorCode::Unauthenticated,
            "authentication required",
        )
    }
}

impl From<RippleError> for ApiError {
    fn from(e: RippleError) -> Self {
        match e {
            RippleError::Validation(violations) => Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                code: ErrorCode::ValidationFailed,
                message: "validation failed".to_string(),
                details: violations,
            },
            RippleError::Conflict(message) => {
                Self::new(StatusCode::CONFLICT, ErrorCode::Conflict, message)
            }
            RippleError::Authentication(message) => Self::new(
                StatusCode::UNAUTHORIZED,
                ErrorCode::AuthenticationFailed,
                message,
            ),
            RippleError::NotFound(what) => Self::new(
                StatusCode::NOT_FOUND,
                ErrorCode::NotFound,
                format!("{what} not found"),
            ),
            RippleError::Expired(what) => Self::new(
                StatusCode::GONE,
                ErrorCode::Expired,
                format!("{what} expired"),
            ),
            RippleError::Unauthenticated => Self::unauthenticated(),
            other => {
                // Internals never leak to the client
                tracing::error!("Internal error: {other}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Internal,
                    "internal server error",
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code,
            message: &self.message,
            details: &self.details,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_422_with_details() {
        let err: ApiError =
            RippleError::Validation(vec!["Username is required".to_string()]).into();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.details, vec!["Username is required".to_string()]);
    }

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(RippleError, StatusCode)> = vec![
            (
                RippleError::Conflict("username already exists".to_string()),
                StatusCode::CONFLICT,
            ),
            (
                RippleError::Authentication("nope".to_string()),
                StatusCode::UNAUTHORIZED,
            ),
            (
                RippleError::NotFound("reset token".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                RippleError::Expired("reset token".to_string()),
                StatusCode::GONE,
            ),
            (RippleError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (
                RippleError::Database("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            let api: ApiError = err.into();
            assert_eq!(api.status, status);
        }
    }

    #[test]
    fn test_internal_errors_are_generic() {
        let err: ApiError = RippleError::Database("users table corrupt".to_string()).into();
        assert_eq!(err.message, "internal server error");
    }
}
