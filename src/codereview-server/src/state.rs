//! Application state shared across request handlers.

use std::time::{Duration, Instant};

use codereview_engine::ReviewChain;
use codereview_github::GitHubClient;
use secrecy::{ExposeSecret, SecretString};

use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};

/// Application state shared across request handlers.
pub struct AppState {
    /// Server configuration.
    pub config: ServerConfig,
    /// Provider chain with scanner fallback.
    pub chain: ReviewChain,
    /// GitHub client for webhook-triggered reviews.
    pub github: GitHubClient,
    webhook_secret: Option<SecretString>,
    start_time: Instant,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("providers", &self.chain.configured_providers())
            .field("start_time", &self.start_time)
            .finish()
    }
}

impl AppState {
    /// Build the review chain and GitHub client from the configuration.
    pub fn new(config: ServerConfig) -> AppResult<Self> {
        let chain = ReviewChain::from_settings(config.provider_settings())
            .map_err(|e| AppError::Internal(e.to_string()))?;
        Self::with_chain(config, chain)
    }

    /// Use a prebuilt chain instead of the configured providers.
    pub fn with_chain(config: ServerConfig, chain: ReviewChain) -> AppResult<Self> {
        let github = GitHubClient::new(config.github.token.clone(), config.github.api_url.as_deref())
            .map_err(|e| AppError::Internal(e.to_string()))?
            .with_retry(config.retry.policy());

        let webhook_secret = config
            .github
            .webhook_secret
            .clone()
            .filter(|s| !s.is_empty())
            .map(|s| SecretString::new(s.into()));

        Ok(Self {
            config,
            chain,
            github,
            webhook_secret,
            start_time: Instant::now(),
        })
    }

    /// Webhook secret, if webhooks are enabled.
    pub fn webhook_secret(&self) -> Option<&[u8]> {
        self.webhook_secret
            .as_ref()
            .map(|s| s.expose_secret().as_bytes())
    }

    /// Get server uptime.
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}
