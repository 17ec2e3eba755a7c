//! Error types for the review engine.
//!
//! None of these reach the caller of [`crate::ReviewChain::analyze`]; they are
//! logged per provider and the chain moves on.

use codereview_common::Transient;
use thiserror::Error;

use crate::provider::ProviderKind;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Failure of a single provider attempt, or of request construction.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Required credential absent; the provider is skipped without a network call.
    #[error("{provider} is not configured")]
    Misconfigured { provider: ProviderKind },

    /// Server error, rate limit, or retries exhausted.
    #[error("{provider} unavailable: {message}")]
    Unavailable {
        provider: ProviderKind,
        message: String,
    },

    /// The backing model is still warming up; try the next model variant.
    #[error("Model {model} is loading")]
    ModelLoading { model: String },

    /// A 2xx response without any text we know how to extract.
    #[error("Unparseable response from {provider}: {message}")]
    Unparseable {
        provider: ProviderKind,
        message: String,
    },

    /// 4xx other than rate limiting; retrying will not help.
    #[error("{provider} rejected the request with status {status}")]
    ClientError { provider: ProviderKind, status: u16 },

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl Transient for ProviderError {
    fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Unavailable { .. } | Self::Transport(_) | Self::Timeout
        )
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err.to_string())
        }
    }
}
