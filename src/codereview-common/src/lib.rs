//! Common utilities shared across codereview crates.

pub mod http_client;
pub mod retry;

pub use http_client::{
    DEFAULT_TIMEOUT, GITHUB_TIMEOUT, PROVIDER_TIMEOUT, USER_AGENT, create_client_with_timeout,
    create_default_client, provider_timeout,
};
pub use retry::{Retry, RetryPolicy, Transient};
