//! Groq client over the OpenAI-compatible chat-completions API.
//!
//! Any server speaking `POST /v1/chat/completions` works; the URL comes from `provider.apiUrl`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{self, ProviderConfig};

/// Client for one chat-completions endpoint with a bearer key.
#[derive(Clone)]
pub struct GroqClient {
    api_url: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("api error: {0}")]
    Api(String),
    #[error("unexpected response format: {0}")]
    Format(&'static str),
}

/// One completion: system persona plus the user's message.
#[derive(Debug, Clone)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub system: &'a str,
    pub user: &'a str,
    pub temperature: f32,
}

impl<'a> CompletionRequest<'a> {
    pub fn from_config(provider: &'a ProviderConfig, user: &'a str) -> Self {
        Self {
            model: &provider.model,
            system: &provider.system_prompt,
            user,
            temperature: provider.temperature,
        }
    }
}

impl GroqClient {
    /// `timeout` of `None` waits indefinitely.
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, CompletionError> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build()?;
        Ok(Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    /// URL and timeout from `provider`; `timeoutSecs` of 0 disables the timeout.
    pub fn from_config(
        provider: &ProviderConfig,
        api_key: impl Into<String>,
    ) -> Result<Self, CompletionError> {
        Self::new(
            provider.api_url.clone(),
            api_key,
            config::timeout_from_secs(provider.timeout_secs),
        )
    }

    /// POST chat/completions (non-streaming) and return the first choice's content, trimmed.
    pub async fn complete(&self, req: CompletionRequest<'_>) -> Result<String, CompletionError> {
        let body = OpenAiChatRequest {
            model: req.model,
            messages: vec![
                OpenAiMessage::System { content: req.system },
                OpenAiMessage::User { content: req.user },
            ],
            temperature: req.temperature,
        };
        let res = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(CompletionError::Api(format!("{} {}", status, body)));
        }
        let bytes = res.bytes().await?;
        let data: OpenAiChatResponse = serde_json::from_slice(&bytes)
            .map_err(|_| CompletionError::Format("body is not a chat completion"))?;
        first_choice_content(data)
    }
}

fn first_choice_content(data: OpenAiChatResponse) -> Result<String, CompletionError> {
    let message = data
        .choices
        .and_then(|c| c.into_iter().next())
        .ok_or(CompletionError::Format("no choices"))?
        .message
        .ok_or(CompletionError::Format("choice has no message"))?;
    let content = message
        .content
        .ok_or(CompletionError::Format("message has no content"))?;
    Ok(content.trim().to_string())
}

// --- OpenAI wire types ---

#[derive(Debug, Serialize)]
struct OpenAiChatRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
enum OpenAiMessage<'a> {
    System { content: &'a str },
    User { content: &'a str },
}

#[derive(Debug, Deserialize)]
struct OpenAiChatResponse {
    choices: Option<Vec<OpenAiChoice>>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: Option<OpenAiResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}
