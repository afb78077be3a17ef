use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind,
};
use log::warn;

use crate::tui::components::QuickAction;

/// TUI-specific input events
#[derive(Debug, Clone, PartialEq)]
pub enum TuiEvent {
    // Global
    ForceQuit,     // Ctrl+C
    ToggleSidebar, // Ctrl+B, the "menu" button
    NewChat,       // Ctrl+N
    FocusNext,     // Tab
    Escape,
    Resize,

    // Composer / history panel
    Submit,  // Enter
    NewLine, // Shift+Enter or Ctrl+J
    InputChar(char),
    Paste(String), // Bracketed paste - preserves newlines
    Backspace,
    Delete,
    CursorLeft,
    CursorRight,
    CursorUp,
    CursorDown,
    CursorHome,
    CursorEnd,
    QuickAction(QuickAction),

    // Message list
    ScrollUp,
    ScrollDown,
    ScrollPageUp,
    ScrollPageDown,
}

/// Poll for an event without blocking (returns immediately)
pub fn poll_event_immediate() -> Option<TuiEvent> {
    poll_event_timeout(std::time::Duration::ZERO)
}

pub fn poll_event_timeout(timeout: std::time::Duration) -> Option<TuiEvent> {
    match event::poll(timeout) {
        Ok(true) => {}
        Ok(false) => return None,
        Err(e) => {
            warn!("Event poll failed: {}", e);
            return None;
        }
    }
    match event::read() {
        Ok(Event::Key(key_event)) => map_key(key_event),
        Ok(Event::Mouse(mouse_event)) => match mouse_event.kind {
            MouseEventKind::ScrollUp => Some(TuiEvent::ScrollUp),
            MouseEventKind::ScrollDown => Some(TuiEvent::ScrollDown),
            _ => None,
        },
        Ok(Event::Paste(data)) => Some(TuiEvent::Paste(data)),
        Ok(Event::Resize(_, _)) => Some(TuiEvent::Resize),
        Ok(_) => None,
        Err(e) => {
            warn!("Event read failed: {}", e);
            None
        }
    }
}

/// Translate a key press into a `TuiEvent`. Releases and repeats of
/// non-character keys are dropped (the keyboard enhancement protocol reports them).
pub fn map_key(key_event: KeyEvent) -> Option<TuiEvent> {
    if key_event.kind == KeyEventKind::Release {
        return None;
    }
    log::debug!(
        "Key event: {:?} with modifiers {:?}",
        key_event.code,
        key_event.modifiers
    );
    let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);
    match key_event.code {
        KeyCode::Char('c') if ctrl => Some(TuiEvent::ForceQuit),
        KeyCode::Char('b') if ctrl => Some(TuiEvent::ToggleSidebar),
        KeyCode::Char('n') if ctrl => Some(TuiEvent::NewChat),
        KeyCode::Char('d') if ctrl => Some(TuiEvent::QuickAction(QuickAction::DebugCode)),
        KeyCode::Char('t') if ctrl => Some(TuiEvent::QuickAction(QuickAction::Optimize)),
        // Ctrl+J is ASCII LF; terminals without Shift+Enter reporting send it for Ctrl+Enter
        KeyCode::Char('j') if ctrl => Some(TuiEvent::NewLine),
        KeyCode::Char(_) if ctrl => None,
        KeyCode::Char(c) => Some(TuiEvent::InputChar(c)),
        KeyCode::Enter if key_event.modifiers.contains(KeyModifiers::SHIFT) => {
            Some(TuiEvent::NewLine)
        }
        KeyCode::Enter => Some(TuiEvent::Submit),
        KeyCode::Backspace => Some(TuiEvent::Backspace),
        KeyCode::Delete => Some(TuiEvent::Delete),
        KeyCode::Esc => Some(TuiEvent::Escape),
        KeyCode::Tab => Some(TuiEvent::FocusNext),
        KeyCode::Left => Some(TuiEvent::CursorLeft),
        KeyCode::Right => Some(TuiEvent::CursorRight),
        KeyCode::Up => Some(TuiEvent::CursorUp),
        KeyCode::Down => Some(TuiEvent::CursorDown),
        KeyCode::Home => Some(TuiEvent::CursorHome),
        KeyCode::End => Some(TuiEvent::CursorEnd),
        KeyCode::PageUp => Some(TuiEvent::ScrollPageUp),
        KeyCode::PageDown => Some(TuiEvent::ScrollPageDown),
        _ => None,
    }
}
