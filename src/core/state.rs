//! # Application State
//!
//! Core chat state. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App                                   (the chat container)
//! ├── provider: Arc<dyn AssistantProvider>
//! ├── reply_timeout: Duration
//! ├── session: Session
//! │   ├── active_conversation_id
//! │   ├── messages: Vec<Message>        // append-only, creation order
//! │   ├── pending_reply: bool           // waiting for the assistant
//! │   ├── reply_ticket: ReplyTicket     // identifies the in-flight request
//! │   └── entitlement: Entitlement      // premium gating
//! ├── history: Vec<ConversationSummary> // history panel contents
//! ├── sidebar_open: bool                // history overlay / focus
//! ├── greetings: Greetings
//! └── status_message: String
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::sync::Arc;
use std::time::Duration;

use crate::assistant::{AssistantProvider, DEFAULT_REPLY_TIMEOUT};
use crate::core::config::ResolvedConfig;
use crate::core::entitlement::Entitlement;
use crate::core::history::ConversationSummary;
use crate::core::message::{ConversationId, Message};

pub const DEFAULT_GREETING: &str = "Hello! I'm your AI coding assistant. \
    I can help you with programming questions, debug code, explain concepts, and much more. \
    What would you like to work on today?";

pub const DEFAULT_NEW_CHAT_GREETING: &str =
    "Hello! I'm your AI coding assistant. What would you like to work on in this new chat?";

/// Identifies one reply request. Every new request gets the next ticket,
/// and every session reset skips one, so a late reply never matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ReplyTicket(u64);

impl ReplyTicket {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Greeting texts shown as the first assistant message.
#[derive(Debug, Clone, PartialEq)]
pub struct Greetings {
    /// First chat after startup.
    pub initial: String,
    /// Every chat started with "new chat".
    pub new_chat: String,
}

impl Default for Greetings {
    fn default() -> Self {
        Self {
            initial: DEFAULT_GREETING.to_string(),
            new_chat: DEFAULT_NEW_CHAT_GREETING.to_string(),
        }
    }
}

/// One open conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub active_conversation_id: ConversationId,
    pub messages: Vec<Message>,
    pub pending_reply: bool,
    pub reply_ticket: ReplyTicket,
    pub entitlement: Entitlement,
}

impl Session {
    pub fn new(
        active_conversation_id: ConversationId,
        greeting: &str,
        entitlement: Entitlement,
    ) -> Self {
        Self {
            active_conversation_id,
            messages: vec![Message::assistant(greeting)],
            pending_reply: false,
            reply_ticket: ReplyTicket::default(),
            entitlement,
        }
    }

    pub fn is_premium_user(&self) -> bool {
        self.entitlement.is_premium()
    }
}

pub struct App {
    pub provider: Arc<dyn AssistantProvider>,
    pub reply_timeout: Duration,
    pub session: Session,
    pub history: Vec<ConversationSummary>,
    pub sidebar_open: bool,
    pub greetings: Greetings,
    pub status_message: String,
}

impl App {
    pub fn new(
        provider: Arc<dyn AssistantProvider>,
        entitlement: Entitlement,
        greetings: Greetings,
    ) -> Self {
        let session = Session::new(ConversationId::generate(), &greetings.initial, entitlement);
        Self {
            provider,
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
            session,
            history: Vec::new(),
            sidebar_open: false,
            greetings,
            status_message: String::new(),
        }
    }

    pub fn from_config(provider: Arc<dyn AssistantProvider>, config: &ResolvedConfig) -> Self {
        let greetings = Greetings {
            initial: config.greeting.clone(),
            new_chat: config.new_chat_greeting.clone(),
        };
        let mut app = Self::new(
            provider,
            Entitlement::from_premium_flag(config.premium),
            greetings,
        );
        app.reply_timeout = config.reply_timeout;
        app
    }

    pub fn entitlement(&self) -> Entitlement {
        self.session.entitlement
    }

    pub fn is_loading(&self) -> bool {
        self.session.pending_reply
    }
}
