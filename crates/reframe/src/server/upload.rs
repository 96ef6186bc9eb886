//! The upload endpoint: validate, render, archive.

use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use reframe_core::pipeline::FailureEntry;
use reframe_core::{ImageSpec, PipelineError};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use super::error::ApiError;
use super::AppState;

/// Handle `POST /resizer/upload`.
///
/// Expects two multipart fields: `image` (the source file) and `imageSpecs`
/// (a JSON array of transform requests). Answers with a zip archive holding
/// every rendition that could be produced plus a manifest naming those that
/// could not.
pub(crate) async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut image: Option<(String, Vec<u8>)> = None;
    let mut specs_json: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        match field.name() {
            Some("image") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                image = Some((file_name, bytes.to_vec()));
            }
            Some("imageSpecs") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                specs_json = Some(text);
            }
            _ => {} // unknown fields are ignored
        }
    }

    let Some((file_name, bytes)) = image else {
        return Err(ApiError::BadRequest("File is required!".to_string()));
    };

    if let Err(err) = state.reframe.validator().validate(&file_name, &bytes) {
        tracing::debug!(file_name, error = %err, "Upload rejected");
        let message = match &err {
            PipelineError::UnsupportedFormat { .. } => "Invalid file type!".to_string(),
            other => other.to_string(),
        };
        return Err(ApiError::BadRequest(message));
    }

    // A missing imageSpecs field reads as empty text and fails the same way
    // unparseable JSON does.
    let specs = parse_specs(specs_json.as_deref().unwrap_or(""))?;

    tracing::info!(
        file_name,
        specs = specs.len(),
        bytes = bytes.len(),
        "Processing upload"
    );

    let deadline = Duration::from_millis(state.reframe.config().limits.request_deadline_ms);
    let outcome = match timeout(deadline, state.reframe.run(bytes, specs)).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(err)) => return Err(ApiError::from(err)),
        Err(_) => {
            return Err(ApiError::Internal(format!(
                "Request deadline of {}ms exceeded",
                deadline.as_millis()
            )))
        }
    };

    if outcome.is_total_failure() {
        let failures = outcome.failed.iter().map(FailureEntry::from).collect();
        return Err(ApiError::AllSpecsFailed(failures));
    }

    // Zip assembly is CPU-bound; keep it off the async workers.
    let reframe = Arc::clone(&state.reframe);
    let archive = tokio::task::spawn_blocking(move || reframe.write_archive(&outcome))
        .await
        .map_err(|e| ApiError::Internal(format!("archive task failed: {e}")))?
        .map_err(ApiError::from)?;

    let attachment = format!(
        "attachment; filename=\"{}\"",
        state.reframe.config().archive.file_name
    );
    let headers = [
        (header::CONTENT_TYPE, "application/zip".to_string()),
        (header::CONTENT_DISPOSITION, attachment),
    ];
    Ok((headers, archive).into_response())
}

/// Parse the `imageSpecs` field in two stages so malformed JSON and a wrong
/// shape fail with distinct messages.
fn parse_specs(text: &str) -> Result<Vec<ImageSpec>, ApiError> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|_| ApiError::BadRequest("Invalid JSON format".to_string()))?;
    serde_json::from_value(value)
        .map_err(|_| ApiError::BadRequest("Invalid Image Spec format".to_string()))
}
