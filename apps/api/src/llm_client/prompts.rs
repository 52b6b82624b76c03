// Shared prompt fragments for chat-completion calls.
// Each pipeline keeps its own prompts.rs with templates and sampling settings.

/// Appended to every system prompt: the response is parsed as raw JSON.
pub const JSON_ONLY_INSTRUCTION: &str = "Respond with valid JSON only. \
    Do not wrap the JSON in ```json code fences. \
    Do not include explanations outside the JSON value.";

/// Builds a system prompt that ends with [`JSON_ONLY_INSTRUCTION`].
pub fn json_only(system: &str) -> String {
    format!("{}\n{}", system.trim_end(), JSON_ONLY_INSTRUCTION)
}
