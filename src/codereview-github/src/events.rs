//! GitHub webhook event parsing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GitHubError, Result};

/// Pull request actions that trigger a review.
const REVIEWABLE_ACTIONS: &[&str] = &["opened", "synchronize"];

/// GitHub event types.
#[derive(Debug, Clone)]
pub enum GitHubEvent {
    PullRequest(PullRequestEvent),
    /// Sent once when the webhook is created.
    Ping { zen: Option<String> },
    /// Unknown event type.
    Unknown(String),
}

/// Pull request event payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestEvent {
    /// Action (opened, closed, synchronize, etc.).
    pub action: String,
    pub number: u64,
    /// Repository owner login.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    pub title: String,
    pub head_sha: String,
    pub draft: bool,
}

impl PullRequestEvent {
    /// Whether this action should produce a review comment.
    pub fn is_reviewable(&self) -> bool {
        REVIEWABLE_ACTIONS.contains(&self.action.as_str())
    }
}

impl GitHubEvent {
    /// The pull request to review, if this event calls for one.
    pub fn reviewable_pull_request(&self) -> Option<&PullRequestEvent> {
        match self {
            Self::PullRequest(pr) if pr.is_reviewable() => Some(pr),
            _ => None,
        }
    }
}

/// Parse a GitHub event from its type header and JSON payload.
pub fn parse_event(event_type: &str, payload: &[u8]) -> Result<GitHubEvent> {
    match event_type {
        "pull_request" => {
            let value: Value = serde_json::from_slice(payload)?;
            parse_pull_request(&value)
        }
        "ping" => {
            let value: Value = serde_json::from_slice(payload)?;
            Ok(GitHubEvent::Ping {
                zen: value["zen"].as_str().map(String::from),
            })
        }
        _ => Ok(GitHubEvent::Unknown(event_type.to_string())),
    }
}

fn required_str<'a>(value: &'a Value, pointer: &str) -> Result<&'a str> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| GitHubError::InvalidPayload(format!("missing {pointer}")))
}

fn parse_pull_request(value: &Value) -> Result<GitHubEvent> {
    let action = value["action"].as_str().unwrap_or("unknown").to_string();

    let pr = &value["pull_request"];
    let number = pr["number"]
        .as_u64()
        .ok_or_else(|| GitHubError::InvalidPayload("missing /pull_request/number".into()))?;

    let event = PullRequestEvent {
        action,
        number,
        owner: required_str(value, "/repository/owner/login")?.to_string(),
        repo: required_str(value, "/repository/name")?.to_string(),
        title: pr["title"].as_str().unwrap_or("").to_string(),
        head_sha: pr["head"]["sha"].as_str().unwrap_or("").to_string(),
        draft: pr["draft"].as_bool().unwrap_or(false),
    };

    Ok(GitHubEvent::PullRequest(event))
}
