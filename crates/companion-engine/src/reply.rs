//! Reply service boundary.
//!
//! The remote service is opaque: it takes the user's message plus a
//! flattened history and answers with an optional reply text and an
//! optional emotion label. Everything it returns is validated here before
//! the conversation sees it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::message::{normalize_emotion, DEFAULT_REPLY};

/// A validated reply from the companion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Reply text (never empty).
    pub text: String,
    /// Inferred affect label, if the service supplied a non-blank one.
    pub emotion: Option<String>,
}

impl Reply {
    /// Create a reply, applying the default text for an empty reply.
    pub fn new(text: impl Into<String>, emotion: Option<String>) -> Self {
        let text = text.into();
        let text = if text.is_empty() {
            DEFAULT_REPLY.to_string()
        } else {
            text
        };
        Self {
            text,
            emotion: normalize_emotion(emotion),
        }
    }
}

/// Request body for `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRequest {
    /// The trimmed user message.
    pub message: String,
    /// `"<role>: <text>"` lines, oldest first.
    pub history: Vec<String>,
}

/// Raw response body for `POST /chat`. Both fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub reply: Option<String>,
    #[serde(default)]
    pub emotion: Option<String>,
}

impl ChatResponse {
    /// Convert the wire body into a validated [`Reply`].
    pub fn into_reply(self) -> Reply {
        Reply::new(self.reply.unwrap_or_default(), self.emotion)
    }
}

/// Parse and validate a `/chat` response body.
///
/// The body must be a JSON object; `reply` and `emotion`, when present and
/// non-null, must be strings.
pub fn parse_reply_body(body: &str) -> Result<Reply, ReplyError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ReplyError::Malformed(e.to_string()))?;

    if !value.is_object() {
        return Err(ReplyError::Malformed(format!(
            "expected a JSON object, got {}",
            json_kind(&value)
        )));
    }

    let response: ChatResponse =
        serde_json::from_value(value).map_err(|e| ReplyError::Malformed(e.to_string()))?;
    Ok(response.into_reply())
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Something that can produce companion replies.
#[async_trait]
pub trait ReplyService: Send + Sync {
    /// Ask for a reply to `message` given the flattened `history`.
    async fn reply(&self, message: &str, history: &[String]) -> Result<Reply, ReplyError>;
}

/// Failure to obtain a usable reply.
///
/// Every variant is handled the same way by the conversation: fallback
/// message plus a connection notice.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplyError {
    /// The service could not be reached.
    #[error("request failed: {0}")]
    Network(String),

    /// The service answered with a non-success status.
    #[error("service returned HTTP {0}")]
    Status(u16),

    /// The response body could not be interpreted.
    #[error("malformed response: {0}")]
    Malformed(String),
}
