//! LLM provider client used by the chat server.
//!
//! Supports non-streaming chat completion against an OpenAI-compatible endpoint (Groq by default).

mod groq;

pub use groq::{CompletionError, CompletionRequest, GroqClient};
