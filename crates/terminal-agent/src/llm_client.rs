//! Completion client
//!
//! Sends the whole conversation to an OpenAI-compatible chat-completion
//! endpoint and returns the first choice's text. One request per call: no
//! retries, no streaming, no timeout beyond the transport default.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CompletionError;
use crate::memory::Message;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: &'a [Message],
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Anything that can turn a conversation into the next assistant reply.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(
        &self,
        messages: &[Message],
        model: &str,
        temperature: f32,
    ) -> Result<String, CompletionError>;
}

#[derive(Clone)]
pub struct HttpCompletionClient {
    url: String,
    api_key: String,
    http_client: reqwest::Client,
}

impl HttpCompletionClient {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CompletionBackend for HttpCompletionClient {
    async fn complete(
        &self,
        messages: &[Message],
        model: &str,
        temperature: f32,
    ) -> Result<String, CompletionError> {
        debug!(
            "Requesting completion from {} (model={}, temperature={}, messages={})",
            self.url,
            model,
            temperature,
            messages.len()
        );
        let request = ChatCompletionRequest {
            model,
            temperature,
            messages,
        };

        // The key is sent verbatim; users include any "Bearer " prefix themselves.
        let response = self
            .http_client
            .post(&self.url)
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Completion endpoint returned {}", status);
            return Err(CompletionError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        extract_reply(&body)
    }
}

/// Pulls `choices[0].message.content` out of a success body.
pub fn extract_reply(body: &str) -> Result<String, CompletionError> {
    let completion: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| CompletionError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| CompletionError::MalformedResponse("empty choices".to_string()))?;

    choice
        .message
        .and_then(|m| m.content)
        .ok_or_else(|| {
            CompletionError::MalformedResponse("choices[0].message.content missing".to_string())
        })
}
