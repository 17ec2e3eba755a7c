//! Error types for the server.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use codereview_engine::ProviderError;
use codereview_github::GitHubError;
use serde::Serialize;
use thiserror::Error;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request. The message is the rejection reason as shown to the client.
    #[error("{0}")]
    BadRequest(String),

    /// Webhook signature missing or wrong.
    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Upload with an extension outside the allow-list.
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// GitHub call failed.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Integration not configured.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::InvalidSignature => StatusCode::FORBIDDEN,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UnsupportedFileType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code string.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::InvalidSignature => "invalid_signature",
            Self::PayloadTooLarge(_) => "payload_too_large",
            Self::UnsupportedFileType(_) => "unsupported_file_type",
            Self::Validation(_) => "validation_error",
            Self::Upstream(_) => "upstream_error",
            Self::Unavailable(_) => "service_unavailable",
            Self::Internal(_) => "internal_error",
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for the server.
pub type AppResult<T> = Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Internal(error.to_string())
    }
}

impl From<ProviderError> for AppError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::InvalidRequest(reason) => Self::BadRequest(reason),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<GitHubError> for AppError {
    fn from(error: GitHubError) -> Self {
        match error {
            GitHubError::Signature(_) => Self::InvalidSignature,
            GitHubError::InvalidPayload(reason) => Self::BadRequest(reason),
            GitHubError::Auth(reason) => Self::Unavailable(reason),
            other => Self::Upstream(other.to_string()),
        }
    }
}
