use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extraction::document::{extract_text, is_pdf_filename, TextExtractor};
use crate::extraction::prompts::{EXTRACTION_PARAMS, EXTRACTION_SYSTEM};
use crate::extraction::upload::Upload;
use crate::interpret::{interpret, Interpretation};
use crate::llm_client::prompts::json_only;
use crate::llm_client::Completer;
use crate::template::{compose, Bindings, Collision, Placeholder};

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionOutcome {
    /// The exact user message that was sent.
    pub composed_prompt: String,
    pub result: Interpretation,
}

/// Inputs that come from the session rather than the upload.
pub struct ExtractionContext<'a> {
    pub schema_path: &'a Path,
    pub template: &'a str,
    pub current_year: i32,
}

/// Schema → PDF text → prompt → completion → interpretation.
///
/// Every check that can fail locally runs before the completion request, so a
/// bad schema, a non-PDF upload, a textless PDF or an unbound placeholder never
/// reach the network.
pub async fn run_extraction(
    ctx: ExtractionContext<'_>,
    upload: Upload,
    extractor: Arc<dyn TextExtractor>,
    llm: &dyn Completer,
) -> Result<ExtractionOutcome, AppError> {
    let schema = crate::schema::load_schema(ctx.schema_path).await?;

    if !is_pdf_filename(&upload.filename) {
        return Err(AppError::Validation(
            "Unsupported file type. Only .pdf files are supported.".to_string(),
        ));
    }

    let Upload { filename, data } = upload;
    let text = extract_text(extractor, data).await?;

    let bindings = Bindings::new()
        .bind(Placeholder::SchemaJson, schema.to_string())
        .bind(Placeholder::CurrentYear, ctx.current_year.to_string())
        .bind(Placeholder::ExtractedText, text);
    let composed = compose(ctx.template, &bindings)?;
    log_collisions(&composed.collisions);

    info!(file = %filename, prompt_chars = composed.text.len(), "Requesting extraction");
    let completion = llm
        .complete(&json_only(EXTRACTION_SYSTEM), &composed.text, EXTRACTION_PARAMS)
        .await?;

    let result = interpret(&completion);
    if let Interpretation::Raw { error, .. } = &result {
        warn!("Extraction completion is not valid JSON: {error}");
    }

    Ok(ExtractionOutcome {
        composed_prompt: composed.text,
        result,
    })
}

pub(crate) fn log_collisions(collisions: &[Collision]) {
    for c in collisions {
        warn!(
            "Value bound to {} contains the token {}; it was inserted verbatim",
            c.placeholder, c.contains
        );
    }
}
