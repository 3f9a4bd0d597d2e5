//! Chat server: the HTTP endpoint the widget talks to.
//!
//! `POST /chat` takes `{"message"}` and answers `{"reply"}` by asking the configured
//! chat-completions provider. `GET /` serves the browser widget; `GET /health` is for probes.

mod error;
mod http;

pub use error::ApiError;
pub use http::{router, run_server, ServerState};
