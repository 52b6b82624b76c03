//! Fakes shared by unit tests across modules.

use std::io::Write;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::{Notify, Semaphore};

use crate::extraction::document::{ExtractionError, TextExtractor};
use crate::llm_client::{Completer, LlmError, SamplingParams};

/// Extractor that returns the same text for any input.
pub struct FixedText(pub &'static str);

impl TextExtractor for FixedText {
    fn extract_text(&self, _bytes: &[u8]) -> Result<String, ExtractionError> {
        Ok(self.0.to_string())
    }
}

/// Extractor that always fails like a corrupt PDF.
pub struct Unreadable;

impl TextExtractor for Unreadable {
    fn extract_text(&self, _bytes: &[u8]) -> Result<String, ExtractionError> {
        Err(ExtractionError::Unreadable("no xref table".to_string()))
    }
}

/// One recorded completion call: system prompt, user prompt, parameters.
pub type Call = (String, String, SamplingParams);

/// Completer with a fixed reply that records every call it receives.
pub struct Canned {
    reply: Result<&'static str, (u16, &'static str)>,
    calls: Mutex<Vec<Call>>,
}

impl Canned {
    pub fn ok(reply: &'static str) -> Self {
        Self {
            reply: Ok(reply),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn status(status: u16, body: &'static str) -> Self {
        Self {
            reply: Err((status, body)),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Completer for Canned {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        params: SamplingParams,
    ) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push((
            system_prompt.to_string(),
            user_prompt.to_string(),
            params,
        ));
        match self.reply {
            Ok(reply) => Ok(reply.to_string()),
            Err((status, body)) => Err(LlmError::Request {
                status,
                body: body.to_string(),
            }),
        }
    }
}

/// Completer that parks every call until [`Gated::release`] is called.
pub struct Gated {
    reply: &'static str,
    entered: Notify,
    gate: Semaphore,
}

impl Gated {
    pub fn new(reply: &'static str) -> Self {
        Self {
            reply,
            entered: Notify::new(),
            gate: Semaphore::new(0),
        }
    }

    /// Resolves once a call is parked on the gate.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.gate.add_permits(1);
    }
}

#[async_trait]
impl Completer for Gated {
    async fn complete(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
        _params: SamplingParams,
    ) -> Result<String, LlmError> {
        self.entered.notify_one();
        self.gate.acquire().await.unwrap().forget();
        Ok(self.reply.to_string())
    }
}

pub fn temp_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}
