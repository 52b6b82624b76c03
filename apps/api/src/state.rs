use std::sync::Arc;

use crate::config::Config;
use crate::extraction::document::TextExtractor;
use crate::llm_client::Completer;
use crate::session::store::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    /// Completion backend. Production: `LlmClient`.
    pub llm: Arc<dyn Completer>,
    /// Document text extractor. Production: `PdfTextExtractor`.
    pub extractor: Arc<dyn TextExtractor>,
    pub config: Config,
}
