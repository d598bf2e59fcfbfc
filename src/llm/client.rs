use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::llm::GenerationError;

/// One chat turn sent to the generative backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Thin client for the OpenAI-compatible generative backend. One blocking
/// network call per request; the shared reqwest client carries the timeout,
/// which surfaces here as a `Call` error instead of hanging.
pub struct LlmClient {
    pub(crate) http: reqwest::Client,
    pub(crate) config: LlmConfig,
}

impl LlmClient {
    pub fn new(http: reqwest::Client, config: LlmConfig) -> Self {
        Self { http, config }
    }

    /// `complete(messages) -> text`. Any backend failure (unreachable,
    /// non-2xx, timeout, empty choice list) is wrapped as a `Call` error
    /// carrying the underlying message.
    pub async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, GenerationError> {
        let url = format!("{}/v1/chat/completions", self.config.base_url);
        let req = ChatCompletionRequest {
            model: self.config.chat_model.clone(),
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&req)
            .send()
            .await
            .map_err(|e| GenerationError::Call(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Call(format!(
                "chat API returned {status}: {body}"
            )));
        }

        let body: ChatCompletionResponse = resp
            .json()
            .await
            .map_err(|e| GenerationError::Call(format!("malformed chat API response: {e}")))?;

        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| GenerationError::Call("chat API returned no choices".to_string()))
    }
}
