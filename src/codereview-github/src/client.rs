//! GitHub API client.
//!
//! Only the two calls the review flow needs: read a pull request as a unified
//! diff, and post the review as an issue comment. Both go through the shared
//! retry executor.

use codereview_common::{GITHUB_TIMEOUT, Retry, RetryPolicy, create_client_with_timeout};
use reqwest::Response;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{GitHubError, Result};

/// Public GitHub API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const DIFF_MEDIA_TYPE: &str = "application/vnd.github.v3.diff";
const JSON_MEDIA_TYPE: &str = "application/vnd.github.v3+json";

#[derive(Debug, Deserialize)]
struct GitHubComment {
    id: u64,
}

/// GitHub API client.
pub struct GitHubClient {
    client: reqwest::Client,
    token: Option<SecretString>,
    base_url: String,
    retry: Retry,
}

impl GitHubClient {
    /// Create a client. A blank token counts as none; `base_url` defaults to
    /// [`DEFAULT_API_URL`].
    pub fn new(token: Option<String>, base_url: Option<&str>) -> Result<Self> {
        let client = create_client_with_timeout(GITHUB_TIMEOUT)
            .map_err(|e| GitHubError::Network(format!("Failed to create HTTP client: {e}")))?;

        let token = token
            .filter(|t| !t.trim().is_empty())
            .map(|t| SecretString::new(t.into()));

        let base_url = base_url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            token,
            base_url,
            retry: Retry::default(),
        })
    }

    /// Override the retry policy used for every call.
    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Retry::new(policy);
        self
    }

    /// Get the base URL being used.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn token(&self, action: &str) -> Result<&str> {
        self.token
            .as_ref()
            .map(|t| t.expose_secret())
            .ok_or_else(|| GitHubError::Auth(format!("Authentication required to {action}")))
    }

    /// Fetch a pull request as unified diff text.
    pub async fn get_pull_request_diff(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<String> {
        let token = self.token("fetch pull request diffs")?;
        let url = format!("{}/repos/{}/{}/pulls/{}", self.base_url, owner, repo, number);
        let url = url.as_str();

        let diff = self
            .retry
            .execute("github.get_pull_request_diff", move || async move {
                let response = self
                    .client
                    .get(url)
                    .bearer_auth(token)
                    .header("Accept", DIFF_MEDIA_TYPE)
                    .send()
                    .await?;
                let response = check_status(response).await?;
                Ok::<_, GitHubError>(response.text().await?)
            })
            .await?;

        debug!(owner, repo, number, bytes = diff.len(), "Fetched pull request diff");
        Ok(diff)
    }

    /// Create a comment on an issue or pull request. Returns the comment id.
    pub async fn create_comment(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        body: &str,
    ) -> Result<u64> {
        let token = self.token("create comments")?;
        let url = format!(
            "{}/repos/{}/{}/issues/{}/comments",
            self.base_url, owner, repo, issue_number
        );
        let url = url.as_str();
        let payload = serde_json::json!({ "body": body });
        let payload = &payload;

        let comment: GitHubComment = self
            .retry
            .execute("github.create_comment", move || async move {
                let response = self
                    .client
                    .post(url)
                    .bearer_auth(token)
                    .header("Accept", JSON_MEDIA_TYPE)
                    .json(payload)
                    .send()
                    .await?;
                let response = check_status(response).await?;
                Ok::<_, GitHubError>(response.json().await?)
            })
            .await?;

        info!(owner, repo, issue_number, comment_id = comment.id, "Posted review comment");
        Ok(comment.id)
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(GitHubError::Api {
        status: status.as_u16(),
        body,
    })
}
