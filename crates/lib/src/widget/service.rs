//! Chat service seam: one message out, one reply back.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::config::{self, Config};
use crate::protocol::{ChatRequest, ErrorBody};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("chat request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("chat service returned {status}{}", detail_suffix(.detail))]
    Status { status: u16, detail: Option<String> },
    #[error("chat reply is not valid JSON: {0}")]
    Decode(String),
    #[error("chat reply has no reply field")]
    MissingReply,
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(": {}", d))
        .unwrap_or_default()
}

impl ClientError {
    /// Short text for the transcript's error block.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Request(e) if e.is_timeout() => {
                "the server took too long to reply".to_string()
            }
            ClientError::Request(_) => "unable to reach server".to_string(),
            ClientError::Status {
                status,
                detail: Some(d),
            } => format!("server error {}: {}", status, d),
            ClientError::Status { status, detail: None } => format!("server error {}", status),
            ClientError::Decode(_) => "received an unreadable reply".to_string(),
            ClientError::MissingReply => "the server reply had no text".to_string(),
        }
    }
}

/// Sends one user message and returns the reply text.
#[async_trait]
pub trait ChatService: Send + Sync {
    async fn send(&self, message: &str) -> Result<String, ClientError>;
}

/// `POST {endpoint}` with `{"message": ...}` and read `{"reply": ...}`.
#[derive(Clone)]
pub struct HttpChatService {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpChatService {
    /// `timeout` of `None` waits indefinitely.
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(Self {
            endpoint: endpoint.into(),
            client: builder.build()?,
        })
    }

    /// Endpoint from SAKHI_ENDPOINT or `widget.endpoint`; timeout from `widget.timeoutSecs`.
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        Self::with_endpoint(config, config::resolve_endpoint(config))
    }

    /// Explicit endpoint (e.g. a command-line flag); timeout still from `widget.timeoutSecs`.
    pub fn with_endpoint(config: &Config, endpoint: impl Into<String>) -> Result<Self, ClientError> {
        Self::new(endpoint, config::timeout_from_secs(config.widget.timeout_secs))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatService for HttpChatService {
    async fn send(&self, message: &str) -> Result<String, ClientError> {
        let body = ChatRequest {
            message: message.to_string(),
        };
        let res = self.client.post(&self.endpoint).json(&body).send().await?;
        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .map(|b| b.detail);
            return Err(ClientError::Status {
                status: status.as_u16(),
                detail,
            });
        }
        let parsed: Value =
            serde_json::from_str(&text).map_err(|e| ClientError::Decode(e.to_string()))?;
        parsed
            .get("reply")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(ClientError::MissingReply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_message_includes_detail() {
        let e = ClientError::Status {
            status: 502,
            detail: Some("Unexpected response format from Groq API".to_string()),
        };
        assert_eq!(
            e.user_message(),
            "server error 502: Unexpected response format from Groq API"
        );
        assert_eq!(
            e.to_string(),
            "chat service returned 502: Unexpected response format from Groq API"
        );
        let e = ClientError::Status {
            status: 500,
            detail: None,
        };
        assert_eq!(e.to_string(), "chat service returned 500");
    }

    #[test]
    fn explicit_endpoint_is_used_verbatim() {
        let config = Config::default();
        let service = HttpChatService::with_endpoint(&config, "http://127.0.0.1:1/chat").unwrap();
        assert_eq!(service.endpoint(), "http://127.0.0.1:1/chat");
    }
}
