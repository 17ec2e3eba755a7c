//! Review of pasted code.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use codereview_engine::{AnalysisRequest, CodeMetrics};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

use super::types::{AnalyzeRequest, AnalyzeResponse};

/// Review code from a JSON body.
pub async fn analyze_code(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> AppResult<Json<AnalyzeResponse>> {
    let Json(input) = payload.map_err(json_error)?;
    let max = state.config.limits.max_code_chars;
    if input.code.chars().count() > max {
        return Err(AppError::BadRequest(format!(
            "Code too long (maximum {max} characters)"
        )));
    }

    let response = review(&state, input.code, input.language.as_deref(), None).await?;
    Ok(Json(response))
}

/// Well-formed JSON with the wrong fields is a validation failure; anything
/// else the extractor rejects is a bad request.
fn json_error(rejection: JsonRejection) -> AppError {
    if rejection.status() == StatusCode::UNPROCESSABLE_ENTITY {
        AppError::Validation(rejection.body_text())
    } else {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Run the chain and attach the code metadata. Blank code is rejected.
pub(super) async fn review(
    state: &AppState,
    code: String,
    language: Option<&str>,
    filename: Option<String>,
) -> AppResult<AnalyzeResponse> {
    let request = AnalysisRequest::new(code, language)?;
    let metrics = CodeMetrics::of(request.code());

    let analysis = state.chain.analyze(&request).await;
    info!(
        source = %analysis.source,
        characters = metrics.characters,
        lines = metrics.lines,
        "Analysis complete"
    );

    Ok(AnalyzeResponse {
        markdown_feedback: analysis.markdown,
        source: analysis.source,
        language: request.language().map(String::from),
        characters: metrics.characters,
        lines: metrics.lines,
        filename,
    })
}
