//! Line-oriented transcript for terminals.

use std::io::Write;

use super::message::{Message, Role};
use super::transcript::Transcript;

/// Writes each block as `Label: text` on its own line. A terminal scrolls on its own,
/// so appending is enough to keep the newest block in view.
pub struct TerminalTranscript<W: Write> {
    out: W,
}

impl<W: Write> TerminalTranscript<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Replace control characters (escape sequences, carriage returns, bells) so reply
/// text cannot drive the terminal. Newlines and tabs are kept.
pub fn sanitize_for_terminal(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_control() && c != '\n' && c != '\t' {
                char::REPLACEMENT_CHARACTER
            } else {
                c
            }
        })
        .collect()
}

impl<W: Write> Transcript for TerminalTranscript<W> {
    fn append(&mut self, message: Message) {
        let marker = if message.role() == Role::Error { "! " } else { "" };
        let line = format!(
            "{}{}: {}\n",
            marker,
            sanitize_for_terminal(message.sender()),
            sanitize_for_terminal(message.text())
        );
        if let Err(e) = self.out.write_all(line.as_bytes()).and_then(|_| self.out.flush()) {
            log::warn!("terminal transcript write failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_label_and_text_lines() {
        let mut t = TerminalTranscript::new(Vec::new());
        t.append(Message::new("You", "Hello", Role::User).unwrap());
        t.append(Message::new("SakhiChat", "Hi there!", Role::Bot).unwrap());
        t.append(Message::new("SakhiChat", "unable to reach server", Role::Error).unwrap());
        let out = String::from_utf8(t.into_inner()).unwrap();
        assert_eq!(
            out,
            "You: Hello\nSakhiChat: Hi there!\n! SakhiChat: unable to reach server\n"
        );
    }

    #[test]
    fn escape_sequences_are_neutralised() {
        assert_eq!(sanitize_for_terminal("a\x1b[2Jb\r"), "a\u{FFFD}[2Jb\u{FFFD}");
        assert_eq!(sanitize_for_terminal("line1\nline2\tx"), "line1\nline2\tx");
    }
}
