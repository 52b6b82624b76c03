//! PDF text extraction.
//!
//! Pages are concatenated in order with no separator, so words at a page
//! boundary may run together. There is no OCR path: a document without a
//! text layer is rejected with [`ExtractionError::EmptyText`].

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Could not read the PDF: {0}")]
    Unreadable(String),

    #[error(
        "No text could be extracted from the PDF. Scanned or image-only documents are not \
         supported; please upload a PDF with a text layer."
    )]
    EmptyText,
}

/// Turns raw document bytes into plain text.
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// Production extractor backed by `pdf-extract`.
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        // pdf-extract panics on some malformed inputs instead of returning Err.
        let result = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
            .map_err(|_| {
                ExtractionError::Unreadable("the PDF parser aborted on this document".to_string())
            })?;

        result.map_err(|e| ExtractionError::Unreadable(e.to_string()))
    }
}

/// Only the filename suffix is checked; content is validated by the parser.
pub fn is_pdf_filename(filename: &str) -> bool {
    filename.to_ascii_lowercase().ends_with(".pdf")
}

/// Rejects text that is empty or whitespace-only.
pub fn require_text(text: String) -> Result<String, ExtractionError> {
    if text.trim().is_empty() {
        Err(ExtractionError::EmptyText)
    } else {
        Ok(text)
    }
}

/// Runs `extractor` on the blocking pool. The upload buffer is moved into the
/// task and dropped as soon as extraction finishes.
pub async fn extract_text(
    extractor: Arc<dyn TextExtractor>,
    data: Bytes,
) -> Result<String, ExtractionError> {
    let size = data.len();
    let text = tokio::task::spawn_blocking(move || extractor.extract_text(&data))
        .await
        .map_err(|e| ExtractionError::Unreadable(format!("extraction task failed: {e}")))??;

    debug!(bytes = size, chars = text.chars().count(), "PDF text extracted");
    require_text(text)
}
