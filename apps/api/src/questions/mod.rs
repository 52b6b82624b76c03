// Interview-question generation from an extracted candidate record.
// All completion calls go through llm_client::Completer.

pub mod generator;
pub mod prompts;
