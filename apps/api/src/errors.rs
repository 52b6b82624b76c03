use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extraction::document::ExtractionError;
use crate::llm_client::LlmError;
use crate::schema::SchemaError;
use crate::session::models::TransitionError;
use crate::template::TemplateError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every failure is scoped to the action that raised it: the session it ran
/// against stays usable for the next request.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<TransitionError> for AppError {
    fn from(e: TransitionError) -> Self {
        AppError::Conflict(e.to_string())
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Template(e) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),
            AppError::Schema(e) => {
                tracing::error!("Schema error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SCHEMA_ERROR",
                    format!("Schema could not be loaded: {e}"),
                )
            }
            AppError::Extraction(e @ ExtractionError::EmptyText) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "EMPTY_TEXT", e.to_string())
            }
            AppError::Extraction(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EXTRACTION_ERROR",
                e.to_string(),
            ),
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                let code = match e {
                    LlmError::Request { .. } => "LLM_REQUEST_ERROR",
                    LlmError::Transport(_) => "LLM_TRANSPORT_ERROR",
                    LlmError::MalformedResponse(_) => "LLM_RESPONSE_ERROR",
                };
                // Upstream status and body are shown verbatim so the user can act on them.
                (StatusCode::BAD_GATEWAY, code, e.to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
