//! Transcript containers: append a labelled block and keep the newest one in view.

use super::message::Message;

/// A scrollable transcript container. Each append adds one block at the end and
/// scrolls so that block is visible. Text is always plain text, never markup.
pub trait Transcript {
    fn append(&mut self, message: Message);
}

/// In-memory transcript. The desktop view renders from it; appends leave a pending
/// scroll request that the view consumes once it has laid out the new block.
#[derive(Debug, Default)]
pub struct TranscriptBuffer {
    messages: Vec<Message>,
    scroll_requested: bool,
}

impl TranscriptBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// True once after each append (or run of appends).
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_requested)
    }
}

impl Transcript for TranscriptBuffer {
    fn append(&mut self, message: Message) {
        self.messages.push(message);
        self.scroll_requested = true;
    }
}
