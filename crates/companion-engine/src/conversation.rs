//! Conversation controller.
//!
//! Owns the ordered message log and the pending flag, and decides what is
//! appended when a reply arrives or fails. The log always starts with the
//! companion greeting and only grows, except for an explicit [`reset`].
//!
//! Submitting is split in two halves so a UI event loop can run the
//! network call in the background: [`begin_submit`] appends the user
//! message and hands back a [`PendingReply`]; [`complete`] applies the
//! result. Every pending reply carries the generation it was issued
//! under, and [`reset`] starts a new generation, so a reply that lands
//! after a reset is dropped instead of leaking into the fresh log.
//!
//! [`reset`]: Conversation::reset
//! [`begin_submit`]: Conversation::begin_submit
//! [`complete`]: Conversation::complete

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use crate::message::Message;
use crate::reply::{Reply, ReplyError, ReplyService};

/// Severity of a transient notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A transient, user-visible notification. Not part of the message log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
}

impl Notice {
    /// Raised when a reply could not be obtained.
    pub fn connection_issue() -> Self {
        Self {
            level: NoticeLevel::Error,
            title: "Connection issue".into(),
            description: "Please check your internet connection and try again.".into(),
        }
    }

    /// Raised when the conversation is reset.
    pub fn new_conversation() -> Self {
        Self {
            level: NoticeLevel::Info,
            title: "New conversation started".into(),
            description: "Ready to listen whenever you are.".into(),
        }
    }
}

/// An outstanding reply request issued by [`Conversation::begin_submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReply {
    /// Generation the request belongs to.
    pub generation: u64,
    /// Trimmed user message.
    pub message: String,
    /// History lines, ending with the user message just appended.
    pub history: Vec<String>,
}

/// What [`Conversation::complete`] did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// A companion reply was appended.
    Replied,
    /// The fallback message was appended and a notice raised.
    Failed,
    /// Nothing was waiting for the result, so it was discarded. Either it
    /// belongs to an earlier generation or its request was already completed.
    Stale,
}

/// In-memory conversation state.
#[derive(Debug)]
pub struct Conversation {
    messages: Vec<Message>,
    pending: bool,
    generation: u64,
    notices: VecDeque<Notice>,
}

impl Conversation {
    /// Create a conversation seeded with the greeting.
    pub fn new() -> Self {
        Self {
            messages: vec![Message::greeting()],
            pending: false,
            generation: 0,
            notices: VecDeque::new(),
        }
    }

    /// Messages in display order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The most recent message.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Whether a reply request is outstanding.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Current generation token.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// History lines for every message currently in the log.
    pub fn history(&self) -> Vec<String> {
        self.messages.iter().map(Message::history_line).collect()
    }

    /// Drain notices raised since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    /// Whether `text` would be accepted by [`begin_submit`](Self::begin_submit).
    pub fn can_submit(&self, text: &str) -> bool {
        !self.pending && !text.trim().is_empty()
    }

    /// Append the user's message and mark a reply as pending.
    ///
    /// Returns `None` without touching any state if the text is blank or a
    /// reply is already pending.
    pub fn begin_submit(&mut self, text: &str) -> Option<PendingReply> {
        if self.pending {
            debug!("submission dropped: reply already pending");
            return None;
        }
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }

        self.messages.push(Message::user(trimmed));
        self.pending = true;

        let pending = PendingReply {
            generation: self.generation,
            message: trimmed.to_string(),
            history: self.history(),
        };
        debug!(
            generation = pending.generation,
            history_len = pending.history.len(),
            "reply requested"
        );
        Some(pending)
    }

    /// Apply the outcome of a reply request issued under `generation`.
    pub fn complete(&mut self, generation: u64, result: Result<Reply, ReplyError>) -> Completion {
        if generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                "discarding reply from an earlier conversation"
            );
            return Completion::Stale;
        }
        if !self.pending {
            debug!(generation, "discarding reply: no request outstanding");
            return Completion::Stale;
        }

        let completion = match result {
            Ok(reply) => {
                self.messages
                    .push(Message::companion(reply.text, reply.emotion));
                Completion::Replied
            }
            Err(err) => {
                warn!(error = %err, "reply failed, appending fallback");
                self.messages.push(Message::fallback());
                self.notices.push_back(Notice::connection_issue());
                Completion::Failed
            }
        };
        self.pending = false;
        completion
    }

    /// Submit `text` and wait for the reply.
    ///
    /// Returns `None` when the submission was skipped. If the returned
    /// future is dropped before the reply arrives, the request is completed
    /// as a network failure so the conversation is not left pending.
    pub async fn submit<S>(&mut self, service: &S, text: &str) -> Option<Completion>
    where
        S: ReplyService + ?Sized,
    {
        let request = self.begin_submit(text)?;
        let in_flight = InFlight {
            conversation: self,
            generation: request.generation,
            armed: true,
        };
        let result = service.reply(&request.message, &request.history).await;
        Some(in_flight.finish(result))
    }

    /// Start over with only the greeting.
    ///
    /// Any outstanding reply is orphaned: its generation no longer matches.
    pub fn reset(&mut self) {
        self.messages = vec![Message::greeting()];
        self.generation = self.generation.wrapping_add(1);
        self.pending = false;
        self.notices.push_back(Notice::new_conversation());
        info!(generation = self.generation, "new conversation started");
    }
}

/// Completes a request when the future awaiting its reply is dropped.
struct InFlight<'a> {
    conversation: &'a mut Conversation,
    generation: u64,
    armed: bool,
}

impl InFlight<'_> {
    fn finish(mut self, result: Result<Reply, ReplyError>) -> Completion {
        self.armed = false;
        self.conversation.complete(self.generation, result)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.conversation.complete(
                self.generation,
                Err(ReplyError::Network("request cancelled".into())),
            );
        }
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
