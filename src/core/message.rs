//! # Messages
//!
//! The conversation data model: who said what, and when.
//!
//! ```text
//! Message
//! ├── id: MessageId            // UUID v4
//! ├── content: String          // raw text, line breaks preserved
//! ├── sender: Sender           // User | Assistant
//! ├── created_at: DateTime     // creation time (UTC)
//! └── is_error: bool           // inline error bubble from a failed reply
//! ```
//!
//! Messages are immutable once created. The only way to "change" the
//! conversation is to append a new one or replace the whole sequence.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
}

/// Unique message identifier.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifier of a conversation (chat). Every chat, including the first one
/// of a process, gets a UUID; `Default` is a placeholder for props and tests.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    pub const DEFAULT: &'static str = "default";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh, random conversation id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub content: String,
    pub sender: Sender,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl Message {
    fn new(sender: Sender, content: String, is_error: bool) -> Self {
        Self {
            id: MessageId::new(),
            content,
            sender,
            created_at: Utc::now(),
            is_error,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Sender::User, content.into(), false)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Sender::Assistant, content.into(), false)
    }

    /// An assistant-side bubble describing a failed reply.
    pub fn error(content: impl Into<String>) -> Self {
        Self::new(Sender::Assistant, content.into(), true)
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_sender() {
        assert_eq!(Message::user("hi").sender, Sender::User);
        assert_eq!(Message::assistant("hello").sender, Sender::Assistant);

        let err = Message::error("timed out");
        assert_eq!(err.sender, Sender::Assistant);
        assert!(err.is_error);
    }

    #[test]
    fn test_message_ids_are_unique() {
        let a = Message::user("same");
        let b = Message::user("same");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_generated_conversation_ids_differ_from_default() {
        let id = ConversationId::generate();
        assert_ne!(id, ConversationId::default());
        assert_eq!(ConversationId::default().as_str(), "default");
    }

    #[test]
    fn test_serde_uses_lowercase_sender_and_skips_false_error_flag() {
        let json = serde_json::to_string(&Message::user("hey")).unwrap();
        assert!(json.contains("\"sender\":\"user\""));
        assert!(!json.contains("is_error"));

        let parsed: Message = serde_json::from_str(&json).unwrap();
        assert!(!parsed.is_error);
        assert_eq!(parsed.content, "hey");
    }
}
