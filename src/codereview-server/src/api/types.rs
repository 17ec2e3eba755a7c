//! API request and response types.

use codereview_engine::{AnalysisSource, ProviderKind};
use serde::{Deserialize, Serialize};

// ============================================================================
// Health
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    /// Providers that will be tried, in order.
    pub providers: Vec<ProviderKind>,
}

// ============================================================================
// Analysis
// ============================================================================

/// Pasted code to review.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub code: String,
    #[serde(default)]
    pub language: Option<String>,
}

/// Review feedback plus metadata about the submitted code.
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub markdown_feedback: String,
    pub source: AnalysisSource,
    pub language: Option<String>,
    pub characters: usize,
    pub lines: usize,
    /// Set for uploads only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

// ============================================================================
// Webhook
// ============================================================================

/// Webhook delivery outcome.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<u64>,
}

impl WebhookResponse {
    pub fn ok(comment_id: u64) -> Self {
        Self {
            status: "ok",
            comment_id: Some(comment_id),
        }
    }

    pub fn ignored() -> Self {
        Self {
            status: "ignored",
            comment_id: None,
        }
    }
}
