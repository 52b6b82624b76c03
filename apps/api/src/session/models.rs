use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::extraction::prompts::DEFAULT_EXTRACTION_TEMPLATE;
use crate::questions::prompts::DEFAULT_QUESTION_TEMPLATE;

/// Where a session is in the extract → questions flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    TemplateLoaded,
    ExtractionInFlight,
    Extracted,
    ExtractionFailed,
    QuestionsInFlight,
    QuestionsDisplayed,
}

impl Stage {
    pub fn is_in_flight(self) -> bool {
        matches!(self, Stage::ExtractionInFlight | Stage::QuestionsInFlight)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("A request is already in progress for this session")]
    InFlight,

    #[error("No extracted candidate record is available; run extraction first")]
    NoCandidate,
}

/// All state owned by one user session.
///
/// Transitions consume the session and return the next one; the store swaps
/// the new value in.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: Uuid,
    pub stage: Stage,
    pub extraction_template: String,
    pub question_template: String,
    /// Parsed result of the last successful extraction.
    pub candidate: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            stage: Stage::TemplateLoaded,
            extraction_template: DEFAULT_EXTRACTION_TEMPLATE.to_string(),
            question_template: DEFAULT_QUESTION_TEMPLATE.to_string(),
            candidate: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Question generation is offered only after a parsed extraction.
    pub fn questions_unlocked(&self) -> bool {
        self.candidate.is_some()
            && matches!(self.stage, Stage::Extracted | Stage::QuestionsDisplayed)
    }

    pub fn with_extraction_template(self, text: String) -> Result<Self, TransitionError> {
        let mut next = self.idle()?;
        next.extraction_template = text;
        Ok(next.touched())
    }

    pub fn with_question_template(self, text: String) -> Result<Self, TransitionError> {
        let mut next = self.idle()?;
        next.question_template = text;
        Ok(next.touched())
    }

    pub fn reset_templates(self) -> Result<Self, TransitionError> {
        let mut next = self.idle()?;
        next.extraction_template = DEFAULT_EXTRACTION_TEMPLATE.to_string();
        next.question_template = DEFAULT_QUESTION_TEMPLATE.to_string();
        Ok(next.touched())
    }

    /// A new upload invalidates whatever the previous one produced.
    pub fn begin_extraction(self) -> Result<Self, TransitionError> {
        let mut next = self.idle()?;
        next.stage = Stage::ExtractionInFlight;
        next.candidate = None;
        Ok(next.touched())
    }

    /// `candidate` is `Some` only when the completion parsed as JSON.
    pub fn finish_extraction(mut self, candidate: Option<Value>) -> Self {
        self.stage = if candidate.is_some() {
            Stage::Extracted
        } else {
            Stage::ExtractionFailed
        };
        self.candidate = candidate;
        self.touched()
    }

    pub fn begin_questions(self) -> Result<Self, TransitionError> {
        let mut next = self.idle()?;
        if !next.questions_unlocked() {
            return Err(TransitionError::NoCandidate);
        }
        next.stage = Stage::QuestionsInFlight;
        Ok(next.touched())
    }

    /// `displayed` is false when the call failed before producing any output.
    pub fn finish_questions(mut self, displayed: bool) -> Self {
        self.stage = if displayed {
            Stage::QuestionsDisplayed
        } else {
            Stage::Extracted
        };
        self.touched()
    }

    fn idle(self) -> Result<Self, TransitionError> {
        if self.stage.is_in_flight() {
            Err(TransitionError::InFlight)
        } else {
            Ok(self)
        }
    }

    fn touched(mut self) -> Self {
        self.updated_at = Utc::now();
        self
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialized form returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub stage: Stage,
    pub extraction_template: String,
    pub question_template: String,
    pub candidate: Option<Value>,
    pub questions_unlocked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Session> for SessionView {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id,
            stage: session.stage,
            extraction_template: session.extraction_template.clone(),
            question_template: session.question_template.clone(),
            candidate: session.candidate.clone(),
            questions_unlocked: session.questions_unlocked(),
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}
