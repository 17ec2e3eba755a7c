//! Error types for GitHub operations.

use codereview_common::Transient;
use thiserror::Error;

/// Result type alias for GitHub operations.
pub type Result<T> = std::result::Result<T, GitHubError>;

/// Errors that can occur while talking to GitHub or handling its webhooks.
#[derive(Error, Debug)]
pub enum GitHubError {
    /// No token configured for an operation that needs one.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Non-2xx response.
    #[error("GitHub API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Webhook or API payload missing required fields.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Signature verification failed: {0}")]
    Signature(String),
}

impl Transient for GitHubError {
    fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for GitHubError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GitHubError::Timeout(err.to_string())
        } else if err.is_decode() {
            GitHubError::InvalidPayload(err.to_string())
        } else {
            GitHubError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GitHubError {
    fn from(err: serde_json::Error) -> Self {
        GitHubError::InvalidPayload(err.to_string())
    }
}
