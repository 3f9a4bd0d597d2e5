//! Input controller: validate pending input, render the user's message, send it, render the reply.
//!
//! Only one request is in flight at a time. A submit while a reply is pending is refused
//! without touching the input, so replies always land in send order. Each request carries a
//! sequence number and `finish` drops replies that do not match the in-flight one.

use std::sync::Arc;

use super::input::InputField;
use super::message::{Labels, Role};
use super::service::{ChatService, ClientError};
use super::transcript::Transcript;

/// Result of [`ChatController::begin`].
pub enum Submission {
    /// Input was empty or whitespace-only; nothing happened.
    Ignored,
    /// A reply is still pending; nothing happened.
    Busy,
    /// The user's message was rendered and the input cleared; resolve the request next.
    Sent(PendingReply),
}

/// What a submit (or a finished reply) did to the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ignored,
    Busy,
    /// Reply rendered under the bot label.
    Replied,
    /// Error block rendered under the bot label.
    Failed,
    /// Reply did not belong to the in-flight request and was dropped.
    Stale,
}

/// An accepted message waiting to be sent. Runs on whatever executor the front end uses.
pub struct PendingReply {
    seq: u64,
    message: String,
    service: Arc<dyn ChatService>,
}

impl PendingReply {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// The raw (untrimmed) text that will be sent.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Issue exactly one request to the chat service.
    pub async fn resolve(self) -> ResolvedReply {
        log::debug!("chat request {} sending {} byte(s)", self.seq, self.message.len());
        let result = self.service.send(&self.message).await;
        ResolvedReply {
            seq: self.seq,
            result,
        }
    }
}

/// A finished request, to be handed back to [`ChatController::finish`].
pub struct ResolvedReply {
    seq: u64,
    result: Result<String, ClientError>,
}

impl ResolvedReply {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Chat widget controller. Input field, transcript, labels, and service are injected.
pub struct ChatController<I: InputField, T: Transcript> {
    input: I,
    transcript: T,
    labels: Labels,
    service: Arc<dyn ChatService>,
    next_seq: u64,
    in_flight: Option<u64>,
}

impl<I: InputField, T: Transcript> ChatController<I, T> {
    pub fn new(input: I, transcript: T, labels: Labels, service: Arc<dyn ChatService>) -> Self {
        Self {
            input,
            transcript,
            labels,
            service,
            next_seq: 1,
            in_flight: None,
        }
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn transcript(&self) -> &T {
        &self.transcript
    }

    pub fn transcript_mut(&mut self) -> &mut T {
        &mut self.transcript
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    /// Give back the injected input field and transcript.
    pub fn into_parts(self) -> (I, T) {
        (self.input, self.transcript)
    }

    /// True while a reply is outstanding; front ends disable sending.
    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Accept the current input: render it as the user's message and clear the field.
    pub fn begin(&mut self) -> Submission {
        if self.input.value().trim().is_empty() {
            return Submission::Ignored;
        }
        if self.in_flight.is_some() {
            log::debug!("chat submit refused: reply pending");
            return Submission::Busy;
        }
        let message = self.input.value().to_string();
        self.transcript
            .append(self.labels.message(Role::User, message.clone()));
        self.input.clear();

        let seq = self.next_seq;
        self.next_seq += 1;
        self.in_flight = Some(seq);
        Submission::Sent(PendingReply {
            seq,
            message,
            service: self.service.clone(),
        })
    }

    /// Render a finished request: the reply, or an error block explaining the failure.
    pub fn finish(&mut self, resolved: ResolvedReply) -> Outcome {
        if self.in_flight != Some(resolved.seq) {
            log::warn!("dropping reply for request {} (not in flight)", resolved.seq);
            return Outcome::Stale;
        }
        self.in_flight = None;
        match resolved.result {
            Ok(reply) => {
                self.transcript.append(self.labels.message(Role::Bot, reply));
                Outcome::Replied
            }
            Err(e) => {
                log::warn!("chat request {} failed: {}", resolved.seq, e);
                self.transcript
                    .append(self.labels.message(Role::Error, e.user_message()));
                Outcome::Failed
            }
        }
    }

    /// The in-flight request will never report back (its task died): release the slot and
    /// say so in the transcript. No-op when nothing is pending.
    pub fn abandon(&mut self) -> Outcome {
        let Some(seq) = self.in_flight.take() else {
            return Outcome::Ignored;
        };
        log::warn!("chat request {} abandoned without a reply", seq);
        self.transcript.append(
            self.labels
                .message(Role::Error, "the request was interrupted before a reply arrived"),
        );
        Outcome::Failed
    }

    /// `begin`, send, and `finish` in one call.
    pub async fn submit(&mut self) -> Outcome {
        match self.begin() {
            Submission::Ignored => Outcome::Ignored,
            Submission::Busy => Outcome::Busy,
            Submission::Sent(pending) => {
                let resolved = pending.resolve().await;
                self.finish(resolved)
            }
        }
    }
}
