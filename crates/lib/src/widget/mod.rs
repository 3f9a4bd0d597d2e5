//! Chat widget core: input controller, transcript renderers, and the chat service client.
//!
//! Front ends (terminal, desktop) inject their input field and transcript container into a
//! [`ChatController`]; the controller never reaches for global state.

mod controller;
mod input;
mod message;
mod service;
mod terminal;
mod transcript;

pub use controller::{ChatController, Outcome, PendingReply, ResolvedReply, Submission};
pub use input::InputField;
pub use message::{Labels, Message, Role, WidgetError};
pub use service::{ChatService, ClientError, HttpChatService};
pub use terminal::{sanitize_for_terminal, TerminalTranscript};
pub use transcript::{Transcript, TranscriptBuffer};
