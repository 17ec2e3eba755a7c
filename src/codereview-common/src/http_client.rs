//! Centralized HTTP client factory.
//!
//! Every outbound call (review providers, GitHub) goes through a client built here so
//! that the user agent, pooling and timeout behaviour stay consistent:
//! - `create_default_client()` - standard 30s timeout
//! - `create_client_with_timeout(duration)` - custom timeout
//!
//! Provider calls are bounded by [`PROVIDER_TIMEOUT`]; configured values above it are
//! clamped down to it.

use reqwest::Client;
use std::time::Duration;

/// User-Agent string for all HTTP requests
pub const USER_AGENT: &str = concat!("codereview/", env!("CARGO_PKG_VERSION"));

/// Default timeout for standard API requests (30 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound for a single review-provider request (30 seconds)
pub const PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for GitHub REST calls (15 seconds)
pub const GITHUB_TIMEOUT: Duration = Duration::from_secs(15);

/// Connection pool idle timeout so DNS is re-resolved periodically.
pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Creates an HTTP client with default configuration (30s timeout).
pub fn create_default_client() -> Result<Client, String> {
    create_client_with_timeout(DEFAULT_TIMEOUT)
}

/// Creates an HTTP client with a custom timeout.
///
/// All clients include:
/// - User-Agent: `codereview/{version}`
/// - tcp_nodelay: true
/// - pool_idle_timeout: 60s
/// - the given total timeout, with a read timeout no longer than it
pub fn create_client_with_timeout(timeout: Duration) -> Result<Client, String> {
    let read_timeout = timeout.min(Duration::from_secs(60));

    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .read_timeout(read_timeout)
        .tcp_nodelay(true)
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .pool_max_idle_per_host(4)
        .build()
        .map_err(|e| format!("Failed to build HTTP client: {e}"))
}

/// Clamp a configured provider timeout to [`PROVIDER_TIMEOUT`].
///
/// A zero duration falls back to the bound itself.
pub fn provider_timeout(configured: Duration) -> Duration {
    if configured.is_zero() {
        PROVIDER_TIMEOUT
    } else {
        configured.min(PROVIDER_TIMEOUT)
    }
}
