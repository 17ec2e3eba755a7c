//! REST API routes and handlers.

mod analyze;
mod health;
mod upload;
mod webhook;
pub mod types;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

pub use types::{AnalyzeRequest, AnalyzeResponse, HealthResponse, WebhookResponse};

/// Routes mounted under `/api`.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/analyze", post(analyze::analyze_code))
        .route("/analyze/upload", post(upload::analyze_upload))
        .route("/webhook", post(webhook::github_webhook))
}

/// Routes mounted at the root.
pub fn root_routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health::health_check))
}
