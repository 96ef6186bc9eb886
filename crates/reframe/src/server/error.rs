//! Error responses for the HTTP boundary.
//!
//! Every error leaves the server as a JSON body shaped `{"error": "..."}`.
//! A batch where nothing rendered additionally carries the per-spec failure
//! list so clients can tell which specs to fix.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reframe_core::pipeline::FailureEntry;
use reframe_core::PipelineError;
use serde_json::json;

/// Errors a request handler can answer with.
#[derive(Debug)]
pub(crate) enum ApiError {
    /// The request itself is unusable: missing file, bad JSON, bad spec
    /// schema, or an unusable source image.
    BadRequest(String),

    /// Every spec in a non-empty batch failed.
    AllSpecsFailed(Vec<FailureEntry>),

    /// Infrastructure trouble: archive write, task join, deadline.
    Internal(String),
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            // The client sent something we cannot work with.
            PipelineError::Decode { .. }
            | PipelineError::SourceTooLarge { .. }
            | PipelineError::SourceDimensionsTooLarge { .. }
            | PipelineError::UnsupportedFormat { .. } => ApiError::BadRequest(err.to_string()),

            // Our side gave out.
            PipelineError::Timeout { .. }
            | PipelineError::Archive { .. }
            | PipelineError::Task { .. } => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": message })),
            )
                .into_response(),
            ApiError::AllSpecsFailed(failures) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "error": "All image specs failed",
                    "failures": failures,
                })),
            )
                .into_response(),
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": message })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_errors_are_client_errors() {
        let err = ApiError::from(PipelineError::Decode {
            message: "truncated".to_string(),
        });
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_oversized_source_is_a_client_error() {
        let err = ApiError::from(PipelineError::SourceTooLarge {
            size_mb: 40,
            max_mb: 10,
        });
        match err {
            ApiError::BadRequest(msg) => assert!(msg.contains("40MB")),
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[test]
    fn test_archive_errors_are_server_errors() {
        let err = ApiError::from(PipelineError::Archive {
            message: "disk full".to_string(),
        });
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[test]
    fn test_timeouts_are_server_errors() {
        let err = ApiError::from(PipelineError::Timeout {
            stage: "decode".to_string(),
            timeout_ms: 5000,
        });
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
