//! Question Generation, the second stage of the flow.
//!
//! Flow: candidate record → pretty JSON → compose question template →
//!       completion → interpretation.
//!
//! Runs only for sessions holding a parsed candidate record; the handler
//! enforces that before calling in.

use anyhow::Context;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extraction::pipeline::log_collisions;
use crate::interpret::{interpret, Interpretation};
use crate::llm_client::prompts::json_only;
use crate::llm_client::Completer;
use crate::questions::prompts::{QUESTION_PARAMS, QUESTION_SYSTEM};
use crate::template::{compose, Bindings, Placeholder};

#[derive(Debug, Clone, Serialize)]
pub struct QuestionOutcome {
    pub composed_prompt: String,
    /// Raw text is still shown when the model ignores the JSON format.
    pub result: Interpretation,
}

pub async fn generate_questions(
    candidate: &Value,
    template: &str,
    llm: &dyn Completer,
) -> Result<QuestionOutcome, AppError> {
    let candidate_json =
        serde_json::to_string_pretty(candidate).context("Failed to serialize candidate record")?;

    let bindings = Bindings::new().bind(Placeholder::CandidateJson, candidate_json);
    let composed = compose(template, &bindings)?;
    log_collisions(&composed.collisions);

    info!(prompt_chars = composed.text.len(), "Requesting interview questions");
    let completion = llm
        .complete(&json_only(QUESTION_SYSTEM), &composed.text, QUESTION_PARAMS)
        .await?;

    let result = interpret(&completion);
    if let Interpretation::Raw { error, .. } = &result {
        warn!("Question completion is not valid JSON: {error}");
    }

    Ok(QuestionOutcome {
        composed_prompt: composed.text,
        result,
    })
}
