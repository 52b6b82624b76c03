// Résumé extraction: PDF upload → text → composed prompt → completion → JSON.
// All completion calls go through llm_client::Completer.

pub mod document;
pub mod pipeline;
pub mod prompts;
pub mod upload;
