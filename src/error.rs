//! Error types for ripple.

use thiserror::Error;

/// Common error type for ripple.
#[derive(Error, Debug)]
pub enum RippleError {
    /// One or more input validation rules were violated.
    ///
    /// All violations for a request are collected and reported together
    /// rather than one at a time.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// A uniqueness constraint was violated (username or email taken).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Bad credentials.
    ///
    /// The message is identical whether the identity is unknown or the
    /// secret is wrong; callers must not be able to tell the two apart.
    #[error("{0}")]
    Authentication(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// A reset token exists but is past its expiry.
    #[error("{0}")]
    Expired(String),

    /// An authenticated session is required.
    #[error("authentication required")]
    Unauthenticated,

    /// Database error.
    ///
    /// Wraps errors from sqlx. Surfaced to users as a generic failure,
    /// never exposing internal detail.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl RippleError {
    /// Build a validation error from a list of violations.
    pub fn validation<I, S>(violations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        RippleError::Validation(violations.into_iter().map(|v| v.to_string()).collect())
    }
}

impl From<sqlx::Error> for RippleError {
    fn from(e: sqlx::Error) -> Self {
        RippleError::Database(e.to_string())
    }
}

/// Result type alias for ripple operations.
pub type Result<T> = std::result::Result<T, RippleError>;
