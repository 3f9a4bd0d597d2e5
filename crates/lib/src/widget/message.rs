//! Transcript message: display label, raw text, and style role.

use std::fmt;

/// Style classifier for a transcript block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Bot,
    /// Bot-labelled block reporting a failed exchange.
    Error,
}

impl Role {
    /// Style class name for the block (`user`, `bot`, `error`).
    pub fn class_name(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Bot => "bot",
            Role::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WidgetError {
    #[error("message sender label must not be empty")]
    EmptySender,
}

/// One transcript entry. The sender label is never empty; the text is kept raw and
/// must be rendered as plain text by every transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    sender: String,
    text: String,
    role: Role,
}

impl Message {
    pub fn new(
        sender: impl Into<String>,
        text: impl Into<String>,
        role: Role,
    ) -> Result<Self, WidgetError> {
        let sender = sender.into();
        if sender.trim().is_empty() {
            return Err(WidgetError::EmptySender);
        }
        Ok(Self {
            sender,
            text: text.into(),
            role,
        })
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.sender, self.text)
    }
}

/// Display labels for the two sides of the conversation. Both are validated non-empty
/// at construction so the controller can build messages without failing later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    user: String,
    bot: String,
}

impl Labels {
    pub fn new(user: impl Into<String>, bot: impl Into<String>) -> Result<Self, WidgetError> {
        let user = user.into();
        let bot = bot.into();
        if user.trim().is_empty() || bot.trim().is_empty() {
            return Err(WidgetError::EmptySender);
        }
        Ok(Self { user, bot })
    }

    pub fn from_config(widget: &crate::config::WidgetConfig) -> Result<Self, WidgetError> {
        Self::new(widget.user_label.clone(), widget.bot_label.clone())
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn bot(&self) -> &str {
        &self.bot
    }

    pub(crate) fn message(&self, role: Role, text: impl Into<String>) -> Message {
        let sender = match role {
            Role::User => self.user.clone(),
            Role::Bot | Role::Error => self.bot.clone(),
        };
        Message {
            sender,
            text: text.into(),
            role,
        }
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            user: "You".to_string(),
            bot: "SakhiChat".to_string(),
        }
    }
}
