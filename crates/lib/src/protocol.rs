//! Wire types shared by the chat server and the widget's HTTP client.

use serde::{Deserialize, Serialize};

/// `POST /chat` request body: `{ "message": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// `POST /chat` success body: `{ "reply": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Error body for non-2xx responses: `{ "detail": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// `GET /health` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub api_key_configured: bool,
}
