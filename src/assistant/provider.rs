use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::core::message::{ConversationId, Message};
use crate::core::state::ReplyTicket;

/// Errors that can occur while waiting for an assistant reply.
/// None of them are retried automatically; the user re-submits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantError {
    /// The backend is not reachable or not configured.
    Unavailable(String),
    /// Transport-level failure (connection reset, DNS, ...).
    Network(String),
    /// No reply within the configured timeout.
    Timeout(Duration),
}

impl fmt::Display for AssistantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssistantError::Unavailable(msg) => write!(f, "assistant unavailable: {msg}"),
            AssistantError::Network(msg) => write!(f, "network error: {msg}"),
            AssistantError::Timeout(after) => {
                write!(f, "no reply after {}s", after.as_secs_f32())
            }
        }
    }
}

impl std::error::Error for AssistantError {}

/// Everything a provider needs to produce a reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyRequest {
    /// Identifies this request; replies carrying a stale ticket are dropped.
    pub ticket: ReplyTicket,
    pub conversation_id: ConversationId,
    /// Full message history, ending with the user message being answered.
    pub history: Vec<Message>,
}

impl ReplyRequest {
    /// The user message this request answers.
    pub fn prompt(&self) -> Option<&Message> {
        self.history.iter().rev().find(|m| m.is_user())
    }
}

#[async_trait]
pub trait AssistantProvider: Send + Sync {
    /// Returns the name of the provider.
    fn name(&self) -> &str;

    /// Produces the content of the next assistant message.
    async fn reply(&self, request: &ReplyRequest) -> Result<String, AssistantError>;
}
