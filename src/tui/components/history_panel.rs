//! # History Panel Component
//!
//! Conversation list: a "New Chat" row followed by the recent chats.
//! Docked on the left on wide terminals, drawn as an overlay on narrow ones
//! (the container decides which, see `tui::ui`).
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `HistoryPanelState` lives in `TuiState` (keyboard selection)
//! - `HistoryPanel` is created each frame with borrowed state and props

use chrono::Local;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::core::entitlement::{Capability, Entitlement};
use crate::core::history::ConversationSummary;
use crate::core::message::ConversationId;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

pub const EMPTY_HISTORY_TEXT: &str = "No conversations yet.";

/// Events emitted by the history panel.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEvent {
    Select(ConversationId),
    NewChat,
    Dismiss,
}

/// Persistent keyboard selection for the history panel.
///
/// Row 0 is the "New Chat" control, row `i + 1` is summary `i`.
pub struct HistoryPanelState {
    ids: Vec<ConversationId>,
    pub selected: usize,
    pub list_state: ListState,
}

impl Default for HistoryPanelState {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryPanelState {
    pub fn new() -> Self {
        Self {
            ids: Vec::new(),
            selected: 0,
            list_state: ListState::default(),
        }
    }

    /// Mirror the summaries currently held by `App`, keeping the selection in range.
    pub fn sync(&mut self, summaries: &[ConversationSummary]) {
        if self.ids.len() != summaries.len()
            || self.ids.iter().zip(summaries).any(|(id, s)| *id != s.id)
        {
            self.ids = summaries.iter().map(|s| s.id.clone()).collect();
        }
        self.selected = self.selected.min(self.ids.len());
        self.list_state.select(self.selected.checked_sub(1));
    }

    /// Move the selection onto the given conversation, or onto "New Chat".
    pub fn focus_on(&mut self, id: &ConversationId) {
        self.selected = self
            .ids
            .iter()
            .position(|candidate| candidate == id)
            .map(|i| i + 1)
            .unwrap_or(0);
        self.list_state.select(self.selected.checked_sub(1));
    }
}

impl EventHandler for HistoryPanelState {
    type Event = HistoryEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::Escape => Some(HistoryEvent::Dismiss),
            TuiEvent::CursorUp => {
                self.selected = self.selected.saturating_sub(1);
                self.list_state.select(self.selected.checked_sub(1));
                None
            }
            TuiEvent::CursorDown => {
                self.selected = (self.selected + 1).min(self.ids.len());
                self.list_state.select(self.selected.checked_sub(1));
                None
            }
            TuiEvent::Submit => match self.selected {
                0 => Some(HistoryEvent::NewChat),
                i => self.ids.get(i - 1).cloned().map(HistoryEvent::Select),
            },
            TuiEvent::InputChar('n') => Some(HistoryEvent::NewChat),
            _ => None,
        }
    }
}

/// Transient render wrapper for the history panel.
pub struct HistoryPanel<'a> {
    pub state: &'a mut HistoryPanelState,
    pub summaries: &'a [ConversationSummary],
    pub active_id: &'a ConversationId,
    pub entitlement: Entitlement,
    /// Keyboard focus: highlights the selected row and shows key hints
    pub focused: bool,
    /// Drawn above other content (clears what is underneath)
    pub overlay: bool,
}

impl<'a> HistoryPanel<'a> {
    fn upgrade_banner(&self) -> Vec<Line<'static>> {
        let gold = Style::default().fg(Color::Yellow);
        vec![
            Line::from(Span::styled(
                "♛ Upgrade to Pro",
                gold.add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Unlimited chats, faster replies",
                Style::default().fg(Color::Gray),
            )),
        ]
    }

    fn summary_item(&self, summary: &ConversationSummary, width: usize) -> ListItem<'static> {
        let is_active = summary.id == *self.active_id;
        let title_style = if is_active {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let marker = if is_active { "▌" } else { " " };
        let crown = if summary.premium { " ♛" } else { "" };

        let title_width = width.saturating_sub(marker.width() + crown.width());
        let date = summary
            .updated_at
            .unwrap_or(summary.created_at)
            .with_timezone(&Local)
            .format("%b %d")
            .to_string();

        ListItem::new(vec![
            Line::from(vec![
                Span::styled(marker, Style::default().fg(Color::Cyan)),
                Span::styled(truncate_to_width(&summary.title, title_width), title_style),
                Span::styled(crown, Style::default().fg(Color::Yellow)),
            ]),
            Line::from(vec![
                Span::raw(" "),
                Span::styled(date, Style::default().fg(Color::DarkGray)),
            ]),
        ])
    }
}

impl<'a> Component for HistoryPanel<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        if self.overlay {
            frame.render_widget(Clear, area);
        }

        let mut title = vec![Span::styled(
            " CodeBot ",
            Style::default().add_modifier(Modifier::BOLD),
        )];
        if self.entitlement.allows(Capability::ProBadge) {
            title.push(Span::styled("♛ Pro ", Style::default().fg(Color::Yellow)));
        }
        let hints = if self.focused {
            " ↑↓ Move  Enter Open  n New  Esc Back "
        } else {
            " Ctrl+B Chats "
        };
        let border_style = if self.focused {
            Style::default().fg(Color::Blue)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let borders = if self.overlay {
            Borders::ALL
        } else {
            Borders::RIGHT
        };
        let block = Block::default()
            .borders(borders)
            .border_style(border_style)
            .title(Line::from(title))
            .title_bottom(Line::from(hints).centered())
            .padding(Padding::horizontal(1));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let banner = if self.entitlement.allows(Capability::UpgradePrompt) {
            self.upgrade_banner()
        } else {
            Vec::new()
        };
        let banner_height = if banner.is_empty() {
            0
        } else {
            banner.len() as u16 + 1
        };

        let [new_chat_area, _, banner_area, header_area, list_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(banner_height),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .areas(inner);

        let new_chat_style = if self.focused && self.state.selected == 0 {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default().fg(Color::Cyan)
        };
        frame.render_widget(
            Paragraph::new(Line::styled("+ New Chat", new_chat_style)),
            new_chat_area,
        );

        if !banner.is_empty() {
            frame.render_widget(Paragraph::new(banner), banner_area);
        }

        frame.render_widget(
            Paragraph::new(Line::styled(
                "Recent Chats",
                Style::default()
                    .fg(Color::Gray)
                    .add_modifier(Modifier::BOLD),
            )),
            header_area,
        );

        if self.summaries.is_empty() {
            frame.render_widget(
                Paragraph::new(EMPTY_HISTORY_TEXT).style(Style::default().fg(Color::DarkGray)),
                list_area,
            );
            return;
        }

        let width = usize::from(list_area.width);
        let items: Vec<ListItem> = self
            .summaries
            .iter()
            .map(|summary| self.summary_item(summary, width))
            .collect();

        let highlight = if self.focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        let list = List::new(items).highlight_style(highlight);
        frame.render_stateful_widget(list, list_area, &mut self.state.list_state);
    }
}

/// Truncate to `max_width` display columns, adding "..." if anything was cut.
fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width - 3 {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn summary(id: &str, title: &str, premium: bool) -> ConversationSummary {
        ConversationSummary {
            id: ConversationId::new(id),
            title: title.to_string(),
            created_at: Utc::now(),
            updated_at: None,
            premium,
        }
    }

    fn render_text(
        summaries: &[ConversationSummary],
        active: &ConversationId,
        entitlement: Entitlement,
    ) -> String {
        let mut state = HistoryPanelState::new();
        state.sync(summaries);
        let mut terminal = Terminal::new(TestBackend::new(32, 20)).unwrap();
        terminal
            .draw(|f| {
                HistoryPanel {
                    state: &mut state,
                    summaries,
                    active_id: active,
                    entitlement,
                    focused: true,
                    overlay: false,
                }
                .render(f, f.area())
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_new_chat_is_first_row() {
        let mut state = HistoryPanelState::new();
        state.sync(&[summary("a", "A", false)]);
        assert_eq!(state.handle_event(&TuiEvent::Submit), Some(HistoryEvent::NewChat));
    }

    #[test]
    fn test_navigation_selects_conversations_and_clamps() {
        let summaries = vec![summary("a", "A", false), summary("b", "B", true)];
        let mut state = HistoryPanelState::new();
        state.sync(&summaries);

        state.handle_event(&TuiEvent::CursorDown);
        assert_eq!(
            state.handle_event(&TuiEvent::Submit),
            Some(HistoryEvent::Select(ConversationId::new("a")))
        );

        state.handle_event(&TuiEvent::CursorDown);
        state.handle_event(&TuiEvent::CursorDown);
        assert_eq!(state.selected, 2);
        assert_eq!(
            state.handle_event(&TuiEvent::Submit),
            Some(HistoryEvent::Select(ConversationId::new("b")))
        );

        for _ in 0..5 {
            state.handle_event(&TuiEvent::CursorUp);
        }
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn test_n_and_escape() {
        let mut state = HistoryPanelState::new();
        assert_eq!(
            state.handle_event(&TuiEvent::InputChar('n')),
            Some(HistoryEvent::NewChat)
        );
        assert_eq!(state.handle_event(&TuiEvent::Escape), Some(HistoryEvent::Dismiss));
    }

    #[test]
    fn test_sync_clamps_selection_when_list_shrinks() {
        let mut state = HistoryPanelState::new();
        state.sync(&[summary("a", "A", false), summary("b", "B", false)]);
        state.selected = 2;
        state.sync(&[summary("a", "A", false)]);
        assert_eq!(state.selected, 1);
    }

    #[test]
    fn test_focus_on_active_conversation() {
        let mut state = HistoryPanelState::new();
        state.sync(&[summary("a", "A", false), summary("b", "B", false)]);
        state.focus_on(&ConversationId::new("b"));
        assert_eq!(state.selected, 2);
        state.focus_on(&ConversationId::new("missing"));
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn test_render_empty_state() {
        let text = render_text(&[], &ConversationId::default(), Entitlement::default());
        assert!(text.contains("+ New Chat"));
        assert!(text.contains("Recent Chats"));
        assert!(text.contains(EMPTY_HISTORY_TEXT));
    }

    #[test]
    fn test_render_banner_only_for_free_plan() {
        let free = render_text(&[], &ConversationId::default(), Entitlement::default());
        let pro = render_text(&[], &ConversationId::default(), Entitlement::from_premium_flag(true));
        assert!(free.contains("Upgrade to Pro"));
        assert!(!pro.contains("Upgrade to Pro"));
    }

    #[test]
    fn test_render_marks_premium_and_active_entries() {
        let summaries = vec![summary("a", "Rust lifetimes", true)];
        let text = render_text(&summaries, &ConversationId::new("a"), Entitlement::default());
        assert!(text.contains("▌Rust lifetimes ♛"));
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("a long title", 8), "a lon...");
        assert_eq!(truncate_to_width("日本語のタイトル", 7), "日本...");
        assert_eq!(truncate_to_width("abc", 2), "..");
    }
}
