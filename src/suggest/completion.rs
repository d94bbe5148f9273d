use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Completion errors.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Transport(String),

    #[error("completion endpoint returned status {0}")]
    Status(u16),

    #[error("completion reply had no text content")]
    EmptyReply,
}

/// Capability that turns a prompt into a raw text reply. Injected into the
/// session so searches are testable without a model backend.
#[async_trait]
pub trait Completion: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

/// Completion over an Anthropic-style messages endpoint, normally the
/// local relay so the API key stays server-side.
pub struct RelayCompletion {
    endpoint: String,
    model: String,
    http: reqwest::Client,
}

impl RelayCompletion {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            http: reqwest::Client::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesReply {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl Completion for RelayCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let payload = MessagesRequest {
            model: &self.model,
            max_tokens: 2048,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CompletionError::Status(status.as_u16()));
        }

        let reply: MessagesReply = response
            .json()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        reply
            .content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or(CompletionError::EmptyReply)
    }
}
