use anyhow::anyhow;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::pipeline::{run_extraction, ExtractionContext, ExtractionOutcome};
use crate::extraction::upload::{parse_upload, Upload};
use crate::interpret::Interpretation;
use crate::questions::generator::{generate_questions, QuestionOutcome};
use crate::session::models::{Session, SessionView};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TemplateUpdate {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub composed_prompt: String,
    pub result: Interpretation,
    pub session: SessionView,
}

#[derive(Debug, Serialize)]
pub struct QuestionsResponse {
    /// False when the session had no candidate record and nothing ran.
    pub performed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composed_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Interpretation>,
    pub session: SessionView,
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionView>) {
    let session = state.sessions.create().await;
    info!(session_id = %session.id, "Session started");
    (StatusCode::CREATED, Json(SessionView::from(&session)))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    Ok(Json(SessionView::from(&session)))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/sessions/:id/templates/extraction
pub async fn handle_update_extraction_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<TemplateUpdate>,
) -> Result<Json<SessionView>, AppError> {
    let session = state
        .sessions
        .transition(id, |s| s.with_extraction_template(req.text))
        .await?;
    Ok(Json(SessionView::from(&session)))
}

/// PUT /api/v1/sessions/:id/templates/questions
pub async fn handle_update_question_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<TemplateUpdate>,
) -> Result<Json<SessionView>, AppError> {
    let session = state
        .sessions
        .transition(id, |s| s.with_question_template(req.text))
        .await?;
    Ok(Json(SessionView::from(&session)))
}

/// POST /api/v1/sessions/:id/templates/reset
pub async fn handle_reset_templates(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = state
        .sessions
        .transition(id, Session::reset_templates)
        .await?;
    Ok(Json(SessionView::from(&session)))
}

/// POST /api/v1/sessions/:id/extract
///
/// Multipart upload with a `file` field. A completion that is not JSON is still
/// a 200: the raw text comes back and the question stage stays locked.
pub async fn handle_extract(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ExtractResponse>, AppError> {
    // Malformed uploads are rejected before the session changes stage.
    state.sessions.get(id).await?;
    let upload = parse_upload(multipart).await?;

    let session = state
        .sessions
        .transition(id, Session::begin_extraction)
        .await?;
    info!(session_id = %id, file = %upload.filename, bytes = upload.data.len(), "Extraction started");

    // Runs detached so the session leaves `ExtractionInFlight` even if the
    // client disconnects while the completion is pending.
    let task = tokio::spawn(extract_and_settle(state.clone(), session, upload));
    let (session, outcome) = match task.await {
        Ok(result) => result?,
        Err(e) => {
            state
                .sessions
                .transition(id, |s| Ok(s.finish_extraction(None)))
                .await?;
            return Err(anyhow!("Extraction task failed: {e}").into());
        }
    };

    info!(session_id = %id, stage = ?session.stage, "Extraction finished");
    Ok(Json(ExtractResponse {
        composed_prompt: outcome.composed_prompt,
        result: outcome.result,
        session: SessionView::from(&session),
    }))
}

/// Runs the pipeline for a session already in `ExtractionInFlight` and moves
/// it out again whatever the outcome.
async fn extract_and_settle(
    state: AppState,
    session: Session,
    upload: Upload,
) -> Result<(Session, ExtractionOutcome), AppError> {
    let outcome = run_extraction(
        ExtractionContext {
            schema_path: &state.config.schema_path,
            template: &session.extraction_template,
            current_year: Utc::now().year(),
        },
        upload,
        state.extractor.clone(),
        state.llm.as_ref(),
    )
    .await;

    let candidate = outcome
        .as_ref()
        .ok()
        .and_then(|o| o.result.parsed().cloned());
    let session = state
        .sessions
        .transition(session.id, |s| Ok(s.finish_extraction(candidate)))
        .await?;
    Ok((session, outcome?))
}

/// POST /api/v1/sessions/:id/questions
///
/// No-op unless the session holds a candidate record from a parsed extraction.
pub async fn handle_generate_questions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuestionsResponse>, AppError> {
    let current = state.sessions.get(id).await?;
    if !current.questions_unlocked() {
        return Ok(Json(QuestionsResponse {
            performed: false,
            composed_prompt: None,
            result: None,
            session: SessionView::from(&current),
        }));
    }

    let session = state
        .sessions
        .transition(id, Session::begin_questions)
        .await?;

    let task = tokio::spawn(questions_and_settle(state.clone(), session));
    let (session, outcome) = match task.await {
        Ok(result) => result?,
        Err(e) => {
            state
                .sessions
                .transition(id, |s| Ok(s.finish_questions(false)))
                .await?;
            return Err(anyhow!("Question task failed: {e}").into());
        }
    };

    info!(session_id = %id, parsed = outcome.result.parsed().is_some(), "Questions generated");
    Ok(Json(QuestionsResponse {
        performed: true,
        composed_prompt: Some(outcome.composed_prompt),
        result: Some(outcome.result),
        session: SessionView::from(&session),
    }))
}

async fn questions_and_settle(
    state: AppState,
    session: Session,
) -> Result<(Session, QuestionOutcome), AppError> {
    let candidate = session.candidate.clone().unwrap_or_default();
    let outcome = generate_questions(
        &candidate,
        &session.question_template,
        state.llm.as_ref(),
    )
    .await;

    let displayed = outcome.is_ok();
    let session = state
        .sessions
        .transition(session.id, |s| Ok(s.finish_questions(displayed)))
        .await?;
    Ok((session, outcome?))
}
