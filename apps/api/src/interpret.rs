//! Turns a raw completion into structured JSON when possible.

use serde::Serialize;
use serde_json::Value;

/// Outcome of reading a completion as JSON.
///
/// `Raw` is not an error: the caller shows the text as-is and the user may
/// edit the prompt and try again.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Interpretation {
    Parsed { value: Value },
    Raw { text: String, error: String },
}

impl Interpretation {
    pub fn parsed(&self) -> Option<&Value> {
        match self {
            Interpretation::Parsed { value } => Some(value),
            Interpretation::Raw { .. } => None,
        }
    }
}

/// Strictly parses `raw` as JSON, ignoring surrounding whitespace and one
/// enclosing Markdown code fence. On failure the original text is returned
/// untouched together with the parser diagnostic.
pub fn interpret(raw: &str) -> Interpretation {
    match serde_json::from_str::<Value>(strip_json_fences(raw)) {
        Ok(value) => Interpretation::Parsed { value },
        Err(e) => Interpretation::Raw {
            text: raw.to_string(),
            error: e.to_string(),
        },
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start()),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_json_object() {
        let result = interpret(r#"{"seniority":"Senior"}"#);
        assert_eq!(
            result,
            Interpretation::Parsed {
                value: json!({"seniority": "Senior"})
            }
        );
    }

    #[test]
    fn test_parses_json_array() {
        let result = interpret(r#"[{"question": "What is ownership?"}]"#);
        assert_eq!(result.parsed().unwrap()[0]["question"], "What is ownership?");
    }

    #[test]
    fn test_non_json_falls_back_to_raw_text() {
        match interpret("not json") {
            Interpretation::Raw { text, error } => {
                assert_eq!(text, "not json");
                assert!(!error.is_empty());
            }
            other => panic!("expected raw fallback, got {other:?}"),
        }
    }

    #[test]
    fn test_raw_fallback_keeps_original_text() {
        let raw = "```json\n{\"broken\": \n```";
        match interpret(raw) {
            Interpretation::Raw { text, .. } => assert_eq!(text, raw),
            other => panic!("expected raw fallback, got {other:?}"),
        }
    }

    #[test]
    fn test_interpret_is_idempotent() {
        for raw in ["not json", r#"{"a": [1, 2, 3]}"#, "", "```\n[1]\n```"] {
            assert_eq!(interpret(raw), interpret(raw));
        }
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_unterminated() {
        assert_eq!(strip_json_fences("```json\n{\"key\": 1}"), "{\"key\": 1}");
        assert_eq!(interpret("```json\n{}"), Interpretation::Parsed { value: json!({}) });
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "  {\"key\": \"value\"}\n";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(interpret("nope")).unwrap();
        assert_eq!(value["kind"], "raw");
        assert_eq!(value["text"], "nope");

        let value = serde_json::to_value(interpret("{}")).unwrap();
        assert_eq!(value["kind"], "parsed");
        assert_eq!(value["value"], json!({}));
    }
}
