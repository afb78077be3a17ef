//! # Actions
//!
//! Everything that can happen in the chat becomes an `Action`.
//! User presses Enter? That's `Action::SendMessage(text)`.
//! The assistant answers? That's `Action::ReplyReceived { .. }`.
//!
//! The `update()` function takes the current state and an action, mutates
//! the state, and returns the `Effect` the caller must perform. No I/O
//! happens here: spawning requests and touching storage is the adapter's job.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```

use log::{debug, info};

use crate::assistant::{AssistantError, ReplyRequest};
use crate::core::history::ConversationSummary;
use crate::core::message::{ConversationId, Message};
use crate::core::state::{App, ReplyTicket, Session};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// User submitted text from the composer.
    SendMessage(String),
    /// The assistant request with `ticket` finished.
    ReplyReceived {
        ticket: ReplyTicket,
        result: Result<String, AssistantError>,
    },
    /// Start a fresh conversation.
    NewChat,
    /// Switch to a conversation from the history panel.
    SelectChat(ConversationId),
    /// Messages of a selected conversation arrived from the history store.
    ConversationLoaded {
        id: ConversationId,
        messages: Vec<Message>,
    },
    /// Summaries for the history panel.
    HistoryLoaded(Vec<ConversationSummary>),
    ToggleSidebar,
    CloseSidebar,
    Quit,
}

/// Side effect requested by `update()`.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Quit,
    /// Ask the assistant provider for a reply.
    RequestReply(ReplyRequest),
    /// Fetch the messages of a conversation from the history store.
    LoadConversation(ConversationId),
    /// Persist a conversation and refresh the panel.
    SaveConversation(ConversationSnapshot),
    /// Perform each effect in order.
    Batch(Vec<Effect>),
}

/// A conversation as it should be written to the history store.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationSnapshot {
    pub id: ConversationId,
    pub messages: Vec<Message>,
    pub premium: bool,
}

impl ConversationSnapshot {
    fn of(session: &Session) -> Self {
        Self {
            id: session.active_conversation_id.clone(),
            messages: session.messages.clone(),
            premium: session.is_premium_user(),
        }
    }
}

/// Save for a session that is left while its reply is still pending.
/// Completed exchanges were already saved when the reply arrived.
fn save_interrupted(session: &Session) -> Option<Effect> {
    session
        .pending_reply
        .then(|| Effect::SaveConversation(ConversationSnapshot::of(session)))
}

const PENDING_STATUS: &str = "Thinking...";

pub fn update(app: &mut App, action: Action) -> Effect {
    debug!("update: {:?}", action);
    match action {
        Action::SendMessage(text) => send_message(app, text),
        Action::ReplyReceived { ticket, result } => receive_reply(app, ticket, result),
        Action::NewChat => {
            let save = save_interrupted(&app.session);
            new_chat(app);
            save.unwrap_or(Effect::None)
        }
        Action::SelectChat(id) => {
            info!("Selecting conversation {}", id);
            let save = save_interrupted(&app.session);
            app.session.active_conversation_id = id.clone();
            app.sidebar_open = false;
            let load = Effect::LoadConversation(id);
            match save {
                Some(save) => Effect::Batch(vec![save, load]),
                None => load,
            }
        }
        Action::ConversationLoaded { id, messages } => {
            if id != app.session.active_conversation_id {
                debug!("Ignoring messages for inactive conversation {}", id);
                return Effect::None;
            }
            let ticket = app.session.reply_ticket.next();
            app.session.messages = messages;
            app.session.pending_reply = false;
            app.session.reply_ticket = ticket;
            app.status_message.clear();
            Effect::None
        }
        Action::HistoryLoaded(summaries) => {
            app.history = summaries;
            Effect::None
        }
        Action::ToggleSidebar => {
            app.sidebar_open = !app.sidebar_open;
            Effect::None
        }
        Action::CloseSidebar => {
            app.sidebar_open = false;
            Effect::None
        }
        Action::Quit => Effect::Quit,
    }
}

fn send_message(app: &mut App, text: String) -> Effect {
    if text.trim().is_empty() {
        return Effect::None;
    }
    if app.session.pending_reply {
        debug!("Reply already pending, ignoring submission");
        return Effect::None;
    }

    app.session.messages.push(Message::user(text));
    let ticket = app.session.reply_ticket.next();
    app.session.reply_ticket = ticket;
    app.session.pending_reply = true;
    app.status_message = PENDING_STATUS.to_string();

    Effect::RequestReply(ReplyRequest {
        ticket,
        conversation_id: app.session.active_conversation_id.clone(),
        history: app.session.messages.clone(),
    })
}

fn receive_reply(
    app: &mut App,
    ticket: ReplyTicket,
    result: Result<String, AssistantError>,
) -> Effect {
    if !app.session.pending_reply || ticket != app.session.reply_ticket {
        debug!("Dropping stale reply {:?}", ticket);
        return Effect::None;
    }

    let message = match result {
        Ok(content) => Message::assistant(content),
        Err(e) => Message::error(format!(
            "Sorry, I couldn't get a response ({e}). Please try sending your message again."
        )),
    };
    app.session.messages.push(message);
    app.session.pending_reply = false;
    app.status_message.clear();
    Effect::SaveConversation(ConversationSnapshot::of(&app.session))
}

fn new_chat(app: &mut App) {
    let previous = app.session.active_conversation_id.clone();
    let mut id = ConversationId::generate();
    while id == previous {
        id = ConversationId::generate();
    }
    info!("New chat {} (was {})", id, previous);

    let ticket = app.session.reply_ticket.next();
    app.session = Session {
        reply_ticket: ticket,
        ..Session::new(id, &app.greetings.new_chat, app.session.entitlement)
    };
    app.sidebar_open = false;
    app.status_message.clear();
}
