//! GitHub webhook: review pull requests when they are opened or updated.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use codereview_engine::AnalysisRequest;
use codereview_github::{EVENT_HEADER, SIGNATURE_HEADER, parse_event, verify_signature};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

use super::types::WebhookResponse;

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Verify, parse, and act on a webhook delivery.
pub async fn github_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<WebhookResponse>> {
    let secret = state
        .webhook_secret()
        .ok_or_else(|| AppError::Unavailable("Webhook secret is not configured".into()))?;

    if let Err(e) = verify_signature(secret, &body, header(&headers, SIGNATURE_HEADER)) {
        warn!(error = %e, "Rejected webhook delivery");
        return Err(AppError::InvalidSignature);
    }

    let event_type = header(&headers, EVENT_HEADER).unwrap_or_default();
    let event = parse_event(event_type, &body)?;

    let Some(pr) = event.reviewable_pull_request() else {
        debug!(event_type, "Ignoring webhook event");
        return Ok(Json(WebhookResponse::ignored()));
    };

    info!(owner = %pr.owner, repo = %pr.repo, number = pr.number, action = %pr.action, "Reviewing pull request");

    let diff = state
        .github
        .get_pull_request_diff(&pr.owner, &pr.repo, pr.number)
        .await?;

    if diff.trim().is_empty() {
        debug!(number = pr.number, "Pull request diff is empty");
        return Ok(Json(WebhookResponse::ignored()));
    }

    let request = AnalysisRequest::new(diff, None)?;
    let analysis = state.chain.analyze(&request).await;

    let comment_id = state
        .github
        .create_comment(&pr.owner, &pr.repo, pr.number, &analysis.markdown)
        .await?;

    Ok(Json(WebhookResponse::ok(comment_id)))
}
