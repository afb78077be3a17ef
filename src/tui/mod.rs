//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! translates keyboard events into `core::Action` values and performs the
//! `Effect`s that `update()` returns (spawning replies, touching the
//! history store).
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! The event loop uses conditional redraw to avoid unnecessary work:
//!
//! - **Waiting for a reply**: draws every ~80ms so the typing spinner moves.
//! - **Idle**: sleeps up to 500ms, only redraws on events, replies or resize.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call, making blinking cursors appear erratic during continuous redraws.

mod component;
pub mod components;
pub mod event;
pub mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;

use crate::assistant::{SimulatedAssistant, spawn_reply};
use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::entitlement::Entitlement;
use crate::core::history::{HistoryStore, JsonHistoryStore, MemoryHistoryStore};
use crate::core::message::ConversationId;
use crate::core::state::App;
use crate::tui::component::EventHandler;
use crate::tui::components::{
    Composer, ComposerEvent, HistoryEvent, HistoryPanelState, MessageListState,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

const ANIMATION_TICK: Duration = Duration::from_millis(80);
const IDLE_TICK: Duration = Duration::from_millis(500);

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    // Persistent component states
    pub message_list: MessageListState,
    pub composer: Composer,
    pub history_panel: HistoryPanelState,
    /// Conversation the message list state belongs to
    shown_conversation: ConversationId,
}

impl TuiState {
    pub fn new(entitlement: Entitlement) -> Self {
        Self {
            message_list: MessageListState::new(),
            composer: Composer::new(entitlement),
            history_panel: HistoryPanelState::new(),
            shown_conversation: ConversationId::default(),
        }
    }

    /// Copy the props the components read from `App`, and reset the
    /// scroll state when another conversation became active.
    pub fn sync_props(&mut self, app: &App) {
        self.composer.is_loading = app.is_loading();
        self.composer.entitlement = app.entitlement();
        self.composer.focused = !app.sidebar_open;
        self.history_panel.sync(&app.history);

        if self.shown_conversation != app.session.active_conversation_id {
            debug!(
                "Active conversation changed to {}, resetting message list",
                app.session.active_conversation_id
            );
            self.shown_conversation = app.session.active_conversation_id.clone();
            self.message_list = MessageListState::new();
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Enable Kitty keyboard protocol unconditionally (allows Shift+Enter detection)
        // The protocol is ignored by terminals that don't support it
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

/// Pick the history store for this run. Falls back to memory if the
/// chats directory cannot be used.
pub fn build_history_store(config: &ResolvedConfig) -> Arc<dyn HistoryStore> {
    if config.persist_history {
        match JsonHistoryStore::default_dir().map(JsonHistoryStore::open) {
            Some(Ok(store)) => {
                info!("Persisting history to disk");
                return Arc::new(store);
            }
            Some(Err(e)) => warn!("Cannot open history directory, keeping history in memory: {}", e),
            None => warn!("No home directory, keeping history in memory"),
        }
    }
    Arc::new(MemoryHistoryStore::seeded(config.seed_summaries()))
}

/// Refresh `App::history` from the store.
fn reload_history(app: &mut App, store: &dyn HistoryStore) {
    match store.list() {
        Ok(summaries) => {
            update(app, Action::HistoryLoaded(summaries));
        }
        Err(e) => {
            warn!("Failed to list conversations: {}", e);
            app.status_message = "Could not load chat history".to_string();
        }
    }
}

/// Execute an `Effect` returned by `update()`. Effects that produce a new
/// `Action` synchronously (loading, saving) feed it straight back into
/// `update`. Returns `true` if the app should quit.
pub fn perform_effect(
    effect: Effect,
    app: &mut App,
    store: &dyn HistoryStore,
    tx: &mpsc::Sender<Action>,
) -> bool {
    debug!("perform: {:?}", effect);
    match effect {
        Effect::None => false,
        Effect::Quit => true,
        Effect::RequestReply(request) => {
            spawn_reply(app.provider.clone(), request, app.reply_timeout, tx.clone());
            false
        }
        Effect::LoadConversation(id) => {
            let messages = match store.load(&id) {
                Ok(Some(messages)) => messages,
                Ok(None) => {
                    debug!("No saved messages for conversation {}", id);
                    Vec::new()
                }
                Err(e) => {
                    warn!("Failed to load conversation {}: {}", id, e);
                    Vec::new()
                }
            };
            let next = update(app, Action::ConversationLoaded { id, messages });
            perform_effect(next, app, store, tx)
        }
        Effect::SaveConversation(snapshot) => {
            if let Err(e) = store.save(&snapshot.id, &snapshot.messages, snapshot.premium) {
                warn!("Failed to save conversation {}: {}", snapshot.id, e);
                app.status_message = "Could not save this chat".to_string();
            }
            reload_history(app, store);
            false
        }
        Effect::Batch(effects) => effects
            .into_iter()
            .fold(false, |quit, effect| perform_effect(effect, app, store, tx) || quit),
    }
}

/// Translate one input event into actions. Returns `true` if the app should quit.
fn handle_event(
    event: TuiEvent,
    app: &mut App,
    tui: &mut TuiState,
    store: &dyn HistoryStore,
    tx: &mpsc::Sender<Action>,
) -> bool {
    let action = match event {
        TuiEvent::Resize => return false,
        TuiEvent::ForceQuit => Some(Action::Quit),
        TuiEvent::NewChat => Some(Action::NewChat),
        // Tab moves focus between the composer and the panel, same as the menu toggle
        TuiEvent::ToggleSidebar | TuiEvent::FocusNext => {
            if !app.sidebar_open {
                tui.history_panel.focus_on(&app.session.active_conversation_id);
            }
            Some(Action::ToggleSidebar)
        }
        TuiEvent::ScrollUp
        | TuiEvent::ScrollDown
        | TuiEvent::ScrollPageUp
        | TuiEvent::ScrollPageDown => {
            tui.message_list.handle_event(&event);
            None
        }
        _ if app.sidebar_open => {
            tui.history_panel
                .handle_event(&event)
                .map(|history_event| match history_event {
                    HistoryEvent::Select(id) => Action::SelectChat(id),
                    HistoryEvent::NewChat => Action::NewChat,
                    HistoryEvent::Dismiss => Action::CloseSidebar,
                })
        }
        _ => match tui.composer.handle_event(&event) {
            Some(ComposerEvent::Submit(text)) => Some(Action::SendMessage(text)),
            Some(ComposerEvent::ContentChanged) | None => None,
        },
    };

    match action {
        Some(action) => {
            let effect = update(app, action);
            perform_effect(effect, app, store, tx)
        }
        None => false,
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let provider = Arc::new(SimulatedAssistant::new(
        config.reply_delay,
        config.placeholder.clone(),
    ));
    let store = build_history_store(&config);
    let mut app = App::from_config(provider, &config);
    let mut tui = TuiState::new(app.entitlement());
    reload_history(&mut app, store.as_ref());

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();

    let start_time = Instant::now();
    let mut needs_redraw = true; // Force first frame

    loop {
        tui.sync_props(&app);

        let animating = app.is_loading();
        if animating {
            needs_redraw = true;
        }

        // Only draw when something changed
        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        let timeout = if animating { ANIMATION_TICK } else { IDLE_TICK };
        let first_event = poll_event_timeout(timeout);

        // Process first event + drain ALL pending events before next draw
        let mut should_quit = false;
        if first_event.is_some() {
            needs_redraw = true;
        }
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if handle_event(event, &mut app, &mut tui, store.as_ref(), &tx) {
                should_quit = true;
                break;
            }
            // Props may change between events (e.g. loading after a submit)
            tui.sync_props(&app);
        }

        if should_quit {
            break;
        }

        // Handle background task actions (assistant replies)
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            let effect = update(&mut app, action);
            if perform_effect(effect, &mut app, store.as_ref(), &tx) {
                should_quit = true;
            }
        }

        if should_quit {
            break;
        }
    }

    info!("Shutting down");
    ratatui::restore();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::ConversationSnapshot;
    use crate::core::config::{CliOverrides, CodebotConfig, SeedEntry, resolve};
    use crate::core::message::Message;
    use crate::test_support::test_app;

    fn empty_store() -> MemoryHistoryStore {
        MemoryHistoryStore::new()
    }

    #[test]
    fn test_save_effect_persists_and_refreshes_history() {
        let mut app = test_app();
        let store = empty_store();
        let (tx, _rx) = mpsc::channel();
        app.session.messages.push(Message::user("How do I sort a Vec?"));
        let snapshot = ConversationSnapshot {
            id: app.session.active_conversation_id.clone(),
            messages: app.session.messages.clone(),
            premium: false,
        };

        let quit = perform_effect(Effect::SaveConversation(snapshot), &mut app, &store, &tx);

        assert!(!quit);
        assert_eq!(app.history.len(), 1);
        assert_eq!(app.history[0].title, "How do I sort a Vec?");
    }

    #[test]
    fn test_switching_away_mid_reply_saves_the_question() {
        let mut app = test_app();
        let store = empty_store();
        let (tx, _rx) = mpsc::channel();
        let first_id = app.session.active_conversation_id.clone();
        update(&mut app, Action::SendMessage("Why is my loop slow?".into()));

        let effect = update(&mut app, Action::SelectChat(ConversationId::new("42")));
        perform_effect(effect, &mut app, &store, &tx);

        assert_eq!(app.history.len(), 1);
        assert_eq!(app.history[0].id, first_id);
        assert_eq!(app.history[0].title, "Why is my loop slow?");
        assert_eq!(app.session.active_conversation_id, ConversationId::new("42"));
        assert!(app.session.messages.is_empty());
        assert!(!app.is_loading());
    }

    #[test]
    fn test_load_effect_of_unknown_conversation_shows_empty_list() {
        let mut app = test_app();
        let store = empty_store();
        let (tx, _rx) = mpsc::channel();
        let id = ConversationId::new("42");

        let effect = update(&mut app, Action::SelectChat(id.clone()));
        perform_effect(effect, &mut app, &store, &tx);

        assert_eq!(app.session.active_conversation_id, id);
        assert!(app.session.messages.is_empty());
    }

    #[test]
    fn test_quit_effect() {
        let mut app = test_app();
        let (tx, _rx) = mpsc::channel();
        assert!(perform_effect(Effect::Quit, &mut app, &empty_store(), &tx));
    }

    #[test]
    fn test_events_route_to_panel_while_sidebar_open() {
        let mut app = test_app();
        let mut tui = TuiState::new(app.entitlement());
        let store = empty_store();
        let (tx, _rx) = mpsc::channel();

        let first_id = app.session.active_conversation_id.clone();
        handle_event(TuiEvent::ToggleSidebar, &mut app, &mut tui, &store, &tx);
        assert!(app.sidebar_open);
        tui.sync_props(&app);

        // 'n' starts a new chat instead of being typed into the draft
        handle_event(TuiEvent::InputChar('n'), &mut app, &mut tui, &store, &tx);
        assert!(tui.composer.buffer.is_empty());
        assert!(!app.sidebar_open);
        assert_ne!(app.session.active_conversation_id, first_id);
    }

    #[test]
    fn test_sync_props_resets_scroll_on_conversation_change() {
        let mut app = test_app();
        let mut tui = TuiState::new(app.entitlement());
        tui.sync_props(&app);
        tui.message_list.stick_to_bottom = false;

        update(&mut app, Action::NewChat);
        tui.sync_props(&app);

        assert!(tui.message_list.stick_to_bottom);
    }

    #[test]
    fn test_memory_store_uses_configured_seed() {
        let mut config = resolve(&CodebotConfig::default(), &CliOverrides::default());
        config.persist_history = false;
        config.history_seed = vec![SeedEntry {
            title: "React useEffect hook explanation".to_string(),
            premium: true,
            hours_ago: 2,
        }];

        let store = build_history_store(&config);
        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, ConversationId::new("1"));
        assert!(listed[0].premium);
    }
}
