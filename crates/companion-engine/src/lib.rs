//! companion-engine: Headless engine for the companion chat client
//!
//! This crate provides the core conversation logic, including:
//! - The message log and its wire encoding
//! - The conversation controller (submit, reset, pending guard)
//! - The reply service boundary and its HTTP implementation
//! - Configuration loading and validation

pub mod client;
pub mod config;
pub mod conversation;
pub mod message;
pub mod reply;

// Re-export commonly used types
pub use client::HttpReplyClient;
pub use config::{Config, ConfigError, BACKEND_URL_ENV, DEFAULT_BACKEND_URL};
pub use conversation::{Completion, Conversation, Notice, NoticeLevel, PendingReply};
pub use message::{Message, Role, DEFAULT_REPLY, FALLBACK_REPLY, GREETING};
pub use reply::{parse_reply_body, ChatRequest, ChatResponse, Reply, ReplyError, ReplyService};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_version() {
        let version = engine_version();
        assert!(!version.is_empty());
        assert!(version.starts_with("0."));
    }
}
