//! Review of an uploaded source file.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
};
use codereview_engine::language::detect_language;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

use super::analyze::review;
use super::types::AnalyzeResponse;

struct UploadedFile {
    name: String,
    data: Vec<u8>,
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(err.body_text())
    }
}

/// Review a file from a multipart form with a `file` part and an optional
/// `language` part.
pub async fn analyze_upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> AppResult<Json<AnalyzeResponse>> {
    let mut file = None;
    let mut language = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(str::to_owned);
        match field_name.as_deref() {
            Some("file") => {
                let name = field
                    .file_name()
                    .map(String::from)
                    .ok_or_else(|| AppError::BadRequest("File name is required".into()))?;
                let data = field.bytes().await.map_err(multipart_error)?.to_vec();
                file = Some(UploadedFile { name, data });
            }
            Some("language") => {
                language = Some(field.text().await.map_err(multipart_error)?);
            }
            other => debug!(field = ?other, "Ignoring unknown form field"),
        }
    }

    let file = file.ok_or_else(|| AppError::BadRequest("No file uploaded".into()))?;
    let limits = &state.config.limits;

    if !limits.allows_file(&file.name) {
        return Err(AppError::UnsupportedFileType(file.name));
    }

    if file.data.len() > limits.max_upload_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "File exceeds {} bytes",
            limits.max_upload_bytes
        )));
    }

    let code = String::from_utf8(file.data)
        .map_err(|_| AppError::BadRequest("File must be UTF-8 text".into()))?;

    let language = language
        .filter(|l| !l.trim().is_empty())
        .or_else(|| detect_language(&file.name).map(String::from));

    let response = review(&state, code, language.as_deref(), Some(file.name)).await?;
    Ok(Json(response))
}
