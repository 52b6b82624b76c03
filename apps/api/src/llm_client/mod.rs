//! LLM Client: the single point of entry for all chat-completion calls.
//!
//! No other module may talk to the completion endpoint directly; handlers and
//! pipelines depend on the [`Completer`] trait so tests can swap the backend.
//!
//! Each call is exactly one HTTP attempt. Failures are reported to the user,
//! who decides whether to try again.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM request failed with status {status}: {body}")]
    Request { status: u16, body: String },

    #[error("LLM request could not be delivered: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("LLM response was malformed: {0}")]
    MalformedResponse(String),
}

/// Sampling parameters sent with every completion request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplingParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: [ChatMessage<'a>; 2],
    #[serde(flatten)]
    params: SamplingParams,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

impl ChatResponse {
    /// Content of the first choice, if the model returned any.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

/// Anything that can turn a system + user prompt into a completion string.
#[async_trait]
pub trait Completer: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        params: SamplingParams,
    ) -> Result<String, LlmError>;
}

/// Chat-completions client authenticated with a static `api-key` header.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl LlmClient {
    pub fn new(endpoint: String, api_key: String, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint,
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Completer for LlmClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        params: SamplingParams,
    ) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            params,
        };

        debug!(
            prompt_chars = user_prompt.len(),
            max_tokens = params.max_tokens,
            "Sending completion request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .header("api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!("LLM API returned {}: {}", status, body);
            return Err(LlmError::Request {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::MalformedResponse(format!("{e}: {body}")))?;

        let content = parsed.first_content().ok_or_else(|| {
            LlmError::MalformedResponse("response contained no completion content".to_string())
        })?;

        debug!(completion_chars = content.len(), "LLM call succeeded");
        Ok(content.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use axum::{http::HeaderMap, routing::post, Router};

    const PARAMS: SamplingParams = SamplingParams {
        max_tokens: 16000,
        temperature: 1.0,
        top_p: 0.25,
    };

    #[derive(Default)]
    struct Recorded {
        hits: AtomicUsize,
        requests: Mutex<Vec<(HeaderMap, String)>>,
    }

    /// Serves a canned response on `/chat` and records every request it sees.
    async fn spawn_mock(status: u16, body: &'static str) -> (String, Arc<Recorded>) {
        let recorded = Arc::new(Recorded::default());
        let seen = recorded.clone();
        let app = Router::new().route(
            "/chat",
            post(move |headers: HeaderMap, request: String| {
                let seen = seen.clone();
                async move {
                    seen.hits.fetch_add(1, Ordering::SeqCst);
                    seen.requests.lock().unwrap().push((headers, request));
                    (axum::http::StatusCode::from_u16(status).unwrap(), body)
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}/chat"), recorded)
    }

    fn client(endpoint: String) -> LlmClient {
        LlmClient::new(endpoint, "test-key".to_string(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_request_body_shape() {
        let body = ChatRequest {
            messages: [
                ChatMessage {
                    role: "system",
                    content: "sys",
                },
                ChatMessage {
                    role: "user",
                    content: "usr",
                },
            ],
            params: PARAMS,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "usr"}
                ],
                "max_tokens": 16000,
                "temperature": 1.0,
                "top_p": 0.25
            })
        );
    }

    #[test]
    fn test_first_content_missing_choices() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
        assert!(parsed.first_content().is_none());
    }

    #[tokio::test]
    async fn test_success_returns_first_choice_content() {
        let (endpoint, recorded) = spawn_mock(
            200,
            r#"{"choices":[{"message":{"content":"{\"seniority\":\"Senior\"}"}},{"message":{"content":"second"}}]}"#,
        )
        .await;

        let content = client(endpoint)
            .complete("system text", "user text", PARAMS)
            .await
            .unwrap();

        assert_eq!(content, r#"{"seniority":"Senior"}"#);
        assert_eq!(recorded.hits.load(Ordering::SeqCst), 1);

        let requests = recorded.requests.lock().unwrap();
        let (headers, body) = &requests[0];
        assert_eq!(headers.get("api-key").unwrap(), "test-key");
        assert_eq!(headers.get("content-type").unwrap(), "application/json");

        let body: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "system text");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "user text");
        assert_eq!(body["max_tokens"], 16000);
        assert_eq!(body["top_p"], 0.25);
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let (endpoint, recorded) = spawn_mock(500, "server error").await;

        let err = client(endpoint)
            .complete("s", "u", PARAMS)
            .await
            .unwrap_err();

        match &err {
            LlmError::Request { status, body } => {
                assert_eq!(*status, 500);
                assert_eq!(body, "server error");
            }
            other => panic!("expected Request error, got {other:?}"),
        }
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("server error"));
        assert_eq!(recorded.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_is_not_retried() {
        let (endpoint, recorded) = spawn_mock(429, "slow down").await;
        let err = client(endpoint).complete("s", "u", PARAMS).await.unwrap_err();
        assert!(matches!(err, LlmError::Request { status: 429, .. }));
        assert_eq!(recorded.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_non_200_success_status_is_request_error() {
        let (endpoint, _) = spawn_mock(202, "accepted").await;
        let err = client(endpoint).complete("s", "u", PARAMS).await.unwrap_err();
        assert!(matches!(err, LlmError::Request { status: 202, .. }));
    }

    #[tokio::test]
    async fn test_ok_without_choices_is_malformed() {
        let (endpoint, _) = spawn_mock(200, r#"{"choices":[]}"#).await;
        let err = client(endpoint).complete("s", "u", PARAMS).await.unwrap_err();
        assert!(matches!(err, LlmError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_ok_with_non_json_body_is_malformed() {
        let (endpoint, _) = spawn_mock(200, "<html>gateway</html>").await;
        let err = client(endpoint).complete("s", "u", PARAMS).await.unwrap_err();
        assert!(matches!(err, LlmError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(format!("http://{addr}/chat"))
            .complete("s", "u", PARAMS)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Transport(_)));
    }
}
