//! Prompt templates with a fixed set of placeholder tokens.
//!
//! A template is parsed once into literal and placeholder segments and then
//! rendered in a single pass. Bound values are copied verbatim and never
//! rescanned, so a value that happens to contain another token (a résumé
//! quoting `{current_year}`, say) cannot trigger a second substitution. Such
//! values are still reported as [`Collision`]s so callers can log them.
//!
//! Any brace text that is not one of the recognized tokens (the JSON examples
//! inside the default prompts) is treated as a literal.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A recognized placeholder token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Placeholder {
    SchemaJson,
    CurrentYear,
    ExtractedText,
    CandidateJson,
}

impl Placeholder {
    pub const ALL: [Placeholder; 4] = [
        Placeholder::SchemaJson,
        Placeholder::CurrentYear,
        Placeholder::ExtractedText,
        Placeholder::CandidateJson,
    ];

    /// The literal text that marks this placeholder inside a template.
    pub fn token(self) -> &'static str {
        match self {
            Placeholder::SchemaJson => "{schema_json}",
            Placeholder::CurrentYear => "{current_year}",
            Placeholder::ExtractedText => "{extracted_text}",
            Placeholder::CandidateJson => "{candidate_json}",
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Template contains placeholder(s) with no value at this step: {}", join_tokens(.0))]
    Unbound(Vec<Placeholder>),
}

fn join_tokens(placeholders: &[Placeholder]) -> String {
    placeholders
        .iter()
        .map(|p| p.token())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Values for the placeholders of one composition.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    values: HashMap<Placeholder, String>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, placeholder: Placeholder, value: impl Into<String>) -> Self {
        self.values.insert(placeholder, value.into());
        self
    }

    fn get(&self, placeholder: Placeholder) -> Option<&str> {
        self.values.get(&placeholder).map(String::as_str)
    }
}

/// A bound value for `placeholder` contained the token of `contains`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Collision {
    pub placeholder: Placeholder,
    pub contains: Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot(Placeholder),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composed {
    pub text: String,
    pub collisions: Vec<Collision>,
}

impl PromptTemplate {
    pub fn parse(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut segments = Vec::new();
        let mut literal_start = 0;
        let mut i = 0;

        while i < bytes.len() {
            // '{' is ASCII, so `i` is always a char boundary when we slice here.
            if bytes[i] == b'{' {
                let found = Placeholder::ALL
                    .iter()
                    .copied()
                    .find(|p| text[i..].starts_with(p.token()));
                if let Some(placeholder) = found {
                    if literal_start < i {
                        segments.push(Segment::Literal(text[literal_start..i].to_string()));
                    }
                    segments.push(Segment::Slot(placeholder));
                    i += placeholder.token().len();
                    literal_start = i;
                    continue;
                }
            }
            i += 1;
        }

        if literal_start < text.len() {
            segments.push(Segment::Literal(text[literal_start..].to_string()));
        }

        Self { segments }
    }

    /// Distinct placeholders in order of first appearance.
    pub fn placeholders(&self) -> Vec<Placeholder> {
        let mut seen = Vec::new();
        for segment in &self.segments {
            if let Segment::Slot(p) = segment {
                if !seen.contains(p) {
                    seen.push(*p);
                }
            }
        }
        seen
    }

    pub fn render(&self, bindings: &Bindings) -> Result<Composed, TemplateError> {
        let unbound: Vec<Placeholder> = self
            .placeholders()
            .into_iter()
            .filter(|p| bindings.get(*p).is_none())
            .collect();
        if !unbound.is_empty() {
            return Err(TemplateError::Unbound(unbound));
        }

        let mut text = String::new();
        let mut collisions = Vec::new();

        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => text.push_str(literal),
                Segment::Slot(placeholder) => {
                    let value = bindings.get(*placeholder).unwrap_or_default();
                    for other in Placeholder::ALL {
                        let collision = Collision {
                            placeholder: *placeholder,
                            contains: other,
                        };
                        if value.contains(other.token()) && !collisions.contains(&collision) {
                            collisions.push(collision);
                        }
                    }
                    text.push_str(value);
                }
            }
        }

        Ok(Composed { text, collisions })
    }
}

/// Parses `template` and renders it against `bindings` in one step.
pub fn compose(template: &str, bindings: &Bindings) -> Result<Composed, TemplateError> {
    PromptTemplate::parse(template).render(bindings)
}
