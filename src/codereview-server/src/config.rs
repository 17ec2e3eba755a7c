//! Server configuration.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use codereview_common::{PROVIDER_TIMEOUT, RetryPolicy};
use codereview_engine::language::is_allowed_file;
use codereview_engine::{ProviderDescriptor, ProviderSettings};
use serde::{Deserialize, Serialize};

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address (e.g., "0.0.0.0:8000").
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Review provider configuration.
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Retry policy for provider and GitHub calls.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Request size limits.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// GitHub integration.
    #[serde(default)]
    pub github: GitHubConfig,

    /// CORS origins (empty = allow all).
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Graceful shutdown timeout in seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout: u64,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_shutdown_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            providers: ProvidersConfig::default(),
            retry: RetryConfig::default(),
            limits: LimitsConfig::default(),
            github: GitHubConfig::default(),
            cors_origins: vec![],
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

/// One review provider.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderEntry {
    /// API key or token. Empty means the provider is skipped.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Override of the service base URL.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Model variants to try in order; empty keeps the defaults.
    #[serde(default)]
    pub models: Vec<String>,
}

impl fmt::Debug for ProviderEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderEntry")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("models", &self.models)
            .finish()
    }
}

impl ProviderEntry {
    fn apply(&self, descriptor: ProviderDescriptor, timeout: Duration) -> ProviderDescriptor {
        let descriptor = descriptor
            .with_models(self.models.clone())
            .with_timeout(timeout);
        match self.base_url.as_deref().filter(|u| !u.trim().is_empty()) {
            Some(url) => descriptor.with_base_url(url),
            None => descriptor,
        }
    }
}

/// Review providers, in fixed priority order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub huggingface: ProviderEntry,
    #[serde(default)]
    pub openai: ProviderEntry,
    #[serde(default)]
    pub anthropic: ProviderEntry,
    /// Per-request timeout in seconds, capped at 30.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

fn default_request_timeout() -> u64 {
    PROVIDER_TIMEOUT.as_secs()
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            huggingface: ProviderEntry::default(),
            openai: ProviderEntry::default(),
            anthropic: ProviderEntry::default(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// Retry policy in config-file units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds.
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Upper bound for any delay, in milliseconds.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    4_000
}

fn default_max_delay_ms() -> u64 {
    10_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
        }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum characters of pasted code.
    #[serde(default = "default_max_code_chars")]
    pub max_code_chars: usize,
    /// Maximum size of an uploaded file in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Restrict uploads to these extensions (without dot). Empty means every
    /// extension with a known file type.
    #[serde(default)]
    pub allowed_extensions: Vec<String>,
}

fn default_max_code_chars() -> usize {
    50_000
}

fn default_max_upload_bytes() -> usize {
    1024 * 1024 // 1MB
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_code_chars: default_max_code_chars(),
            max_upload_bytes: default_max_upload_bytes(),
            allowed_extensions: vec![],
        }
    }
}

impl LimitsConfig {
    /// Whether a file with this name may be uploaded.
    pub fn allows_file(&self, filename: &str) -> bool {
        if !is_allowed_file(filename) {
            return false;
        }
        if self.allowed_extensions.is_empty() {
            return true;
        }

        Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                self.allowed_extensions
                    .iter()
                    .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
            })
    }
}

/// GitHub integration.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Token for reading diffs and posting comments.
    #[serde(default)]
    pub token: Option<String>,
    /// API base URL (GitHub Enterprise: `https://host/api/v3`).
    #[serde(default)]
    pub api_url: Option<String>,
    /// Shared secret for webhook signatures. Without it the webhook is disabled.
    #[serde(default)]
    pub webhook_secret: Option<String>,
}

impl fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("api_url", &self.api_url)
            .field(
                "webhook_secret",
                &self.webhook_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from defaults plus whatever `lookup` returns for the known
    /// variable names. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(addr) = get("CODEREVIEW_LISTEN_ADDR") {
            config.listen_addr = addr;
        }

        config.providers.huggingface.api_key = get("HF_API_TOKEN");
        config.providers.huggingface.base_url = get("HF_API_BASE_URL");
        config.providers.openai.api_key = get("OPENAI_API_KEY");
        config.providers.openai.base_url = get("OPENAI_BASE_URL");
        config.providers.anthropic.api_key = get("ANTHROPIC_API_KEY");
        config.providers.anthropic.base_url = get("ANTHROPIC_BASE_URL");

        config.github.token = get("GITHUB_TOKEN");
        config.github.api_url = get("GITHUB_API_URL");
        config.github.webhook_secret = get("WEBHOOK_SECRET");

        if let Some(chars) = get("CODEREVIEW_MAX_CODE_CHARS") {
            config.limits.max_code_chars = chars
                .trim()
                .parse()
                .context("CODEREVIEW_MAX_CODE_CHARS must be a positive integer")?;
        }

        if let Some(bytes) = get("CODEREVIEW_MAX_UPLOAD_BYTES") {
            config.limits.max_upload_bytes = bytes
                .trim()
                .parse()
                .context("CODEREVIEW_MAX_UPLOAD_BYTES must be a positive integer")?;
        }

        Ok(config)
    }

    /// Provider descriptors and retry policy for the review chain.
    pub fn provider_settings(&self) -> ProviderSettings {
        let providers = &self.providers;
        let timeout = Duration::from_secs(providers.request_timeout);

        ProviderSettings {
            huggingface: providers.huggingface.apply(
                ProviderDescriptor::huggingface(providers.huggingface.api_key.clone()),
                timeout,
            ),
            openai: providers.openai.apply(
                ProviderDescriptor::openai(providers.openai.api_key.clone()),
                timeout,
            ),
            anthropic: providers.anthropic.apply(
                ProviderDescriptor::anthropic(providers.anthropic.api_key.clone()),
                timeout,
            ),
            retry: self.retry.policy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.limits.max_code_chars, 50_000);
        assert_eq!(config.limits.max_upload_bytes, 1024 * 1024);
        assert_eq!(config.retry.policy(), RetryPolicy::default());
        assert_eq!(config.providers.request_timeout, 30);
    }

    #[test]
    fn test_from_lookup() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("CODEREVIEW_LISTEN_ADDR", "127.0.0.1:9000"),
            ("OPENAI_API_KEY", "sk-test"),
            ("ANTHROPIC_API_KEY", ""),
            ("WEBHOOK_SECRET", "hush"),
            ("CODEREVIEW_MAX_CODE_CHARS", "1000"),
        ]))
        .unwrap();

        assert_eq!(config.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.providers.openai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.providers.anthropic.api_key, None);
        assert_eq!(config.github.webhook_secret.as_deref(), Some("hush"));
        assert_eq!(config.limits.max_code_chars, 1000);

        let settings = config.provider_settings();
        assert!(settings.openai.is_configured());
        assert!(!settings.anthropic.is_configured());
        assert!(!settings.huggingface.is_configured());
    }

    #[test]
    fn test_invalid_number() {
        let result = ServerConfig::from_lookup(lookup(&[("CODEREVIEW_MAX_UPLOAD_BYTES", "lots")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_partial_json() {
        let config: ServerConfig = serde_json::from_str(
            r#"{"providers": {"openai": {"api_key": "sk", "base_url": "http://localhost:1234/v1"}, "request_timeout": 90}}"#,
        )
        .unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:8000");

        let settings = config.provider_settings();
        assert_eq!(settings.openai.base_url, "http://localhost:1234/v1");
        assert_eq!(settings.openai.timeout, PROVIDER_TIMEOUT);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = ServerConfig::default();
        config.providers.openai.api_key = Some("sk-live".into());
        config.github.webhook_secret = Some("hush".into());

        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-live"));
        assert!(!debug.contains("hush"));
    }

    #[test]
    fn test_upload_extension_restriction() {
        let mut limits = LimitsConfig::default();
        assert!(limits.allows_file("main.py"));
        assert!(!limits.allows_file("photo.png"));

        limits.allowed_extensions = vec![".py".into()];
        assert!(limits.allows_file("main.PY"));
        assert!(!limits.allows_file("main.js"));
    }
}
