//! Error types for request handling.

use thiserror::Error;

/// Request-specific errors.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The method name is not one of the supported HTTP methods.
    #[error("unknown HTTP method: {0}")]
    UnknownMethod(String),

    /// The request body is not valid form data.
    #[error("invalid form body: {0}")]
    InvalidBody(String),
}

/// Result type alias for request operations.
pub type Result<T> = std::result::Result<T, HttpError>;
