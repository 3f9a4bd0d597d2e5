//! HTTP error responses for the chat endpoint: status code plus `{"detail": ...}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::llm::CompletionError;
use crate::protocol::ErrorBody;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Message cannot be empty")]
    EmptyMessage,
    #[error("API key not configured")]
    MissingApiKey,
    #[error("Error communicating with Groq API: {0}")]
    Upstream(String),
    #[error("Unexpected response format from Groq API")]
    UnexpectedFormat,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::EmptyMessage => StatusCode::BAD_REQUEST,
            ApiError::MissingApiKey => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Upstream(_) | ApiError::UnexpectedFormat => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<CompletionError> for ApiError {
    fn from(e: CompletionError) -> Self {
        match e {
            CompletionError::Request(e) => ApiError::Upstream(e.to_string()),
            CompletionError::Api(s) => ApiError::Upstream(s),
            CompletionError::Format(_) => ApiError::UnexpectedFormat,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("chat: {}", self);
        } else {
            log::debug!("chat: {}", self);
        }
        (
            status,
            Json(ErrorBody {
                detail: self.to_string(),
            }),
        )
            .into_response()
    }
}
