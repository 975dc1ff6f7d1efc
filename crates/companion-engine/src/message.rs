//! Message types for companion conversations.
//!
//! A conversation is an ordered log of [`Message`]s. Insertion order is
//! display order (oldest first).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Greeting that seeds every conversation.
pub const GREETING: &str =
    "Hello there. I'm here to listen and support you. How are you feeling today?";

/// Reply text used when the service answers without any text.
pub const DEFAULT_REPLY: &str = "I'm here for you.";

/// Companion message appended when the reply service cannot be reached.
pub const FALLBACK_REPLY: &str = "I'm having trouble connecting right now, but I'm still here with you. Could you try sending again?";

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Typed by the person using the client.
    #[serde(rename = "user")]
    User,
    /// Authored by the reply service.
    #[serde(rename = "bot")]
    Companion,
}

impl Role {
    /// Label used on the wire and in history lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Companion => "bot",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry in the conversation log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message author.
    pub role: Role,
    /// Message text.
    pub text: String,
    /// Inferred affect label (companion messages only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
    /// When the message entered the log.
    pub sent_at: DateTime<Utc>,
}

impl Message {
    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            emotion: None,
            sent_at: Utc::now(),
        }
    }

    /// Create a companion message.
    ///
    /// Blank emotion labels are dropped.
    pub fn companion(text: impl Into<String>, emotion: Option<String>) -> Self {
        Self {
            role: Role::Companion,
            text: text.into(),
            emotion: normalize_emotion(emotion),
            sent_at: Utc::now(),
        }
    }

    /// The fixed greeting that opens a conversation.
    pub fn greeting() -> Self {
        Self::companion(GREETING, None)
    }

    /// The fixed fallback shown when a reply could not be obtained.
    pub fn fallback() -> Self {
        Self::companion(FALLBACK_REPLY, None)
    }

    /// Whether the message was typed by the user.
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// Flattened `"<role>: <text>"` form sent as history context.
    pub fn history_line(&self) -> String {
        format!("{}: {}", self.role, self.text)
    }
}

/// Trim an emotion label, mapping blank labels to `None`.
pub(crate) fn normalize_emotion(emotion: Option<String>) -> Option<String> {
    emotion
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
}
