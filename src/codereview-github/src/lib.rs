//! GitHub integration for codereview.
//!
//! - [`GitHubClient`]: fetch a pull request diff, post an issue comment
//! - [`parse_event`]: typed webhook payloads
//! - [`verify_signature`]: `X-Hub-Signature-256` checking

pub mod client;
pub mod error;
pub mod events;
pub mod signature;

pub use client::{DEFAULT_API_URL, GitHubClient};
pub use error::{GitHubError, Result};
pub use events::{GitHubEvent, PullRequestEvent, parse_event};
pub use signature::{EVENT_HEADER, SIGNATURE_HEADER, sign, verify_signature};
