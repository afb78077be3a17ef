//! # Composer Component
//!
//! The message input at the bottom of the chat.
//!
//! ## Responsibilities
//!
//! - Capture text input (typing, paste, editing, cursor movement)
//! - Submit on Enter, insert a newline on Shift+Enter / Ctrl+J
//! - Insert quick-action templates (Ctrl+D, Ctrl+T)
//! - Show the quick-action bar and the footer hints
//!
//! ## State Management
//!
//! The draft is internal state. `is_loading`, `entitlement` and `focused`
//! are props refreshed from `App` before every render.
//! While `is_loading` is set every key is swallowed: this is the only
//! backpressure between the user and the assistant.

mod layout;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};

use crate::core::entitlement::{Capability, Entitlement};
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

use layout::{
    CursorState, MAX_VISIBLE_LINES, VERTICAL_OVERHEAD, inner_width, layout_rows,
    next_char_boundary, prev_char_boundary,
};

pub const DEFAULT_INPUT_HINT: &str = "Ask me anything about coding...";

/// Rows taken by the quick-action bar above and the footer below the box
const CHROME_ROWS: u16 = 2;

/// Canned prompts inserted at the start of the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickAction {
    DebugCode,
    Optimize,
}

impl QuickAction {
    pub const ALL: [QuickAction; 2] = [QuickAction::DebugCode, QuickAction::Optimize];

    pub fn label(self) -> &'static str {
        match self {
            QuickAction::DebugCode => "Debug Code",
            QuickAction::Optimize => "Optimize",
        }
    }

    pub fn shortcut(self) -> &'static str {
        match self {
            QuickAction::DebugCode => "Ctrl+D",
            QuickAction::Optimize => "Ctrl+T",
        }
    }

    pub fn template(self) -> &'static str {
        match self {
            QuickAction::DebugCode => "Debug this code and explain what is wrong:\n",
            QuickAction::Optimize => "Optimize this code for speed and readability:\n",
        }
    }
}

/// High-level events emitted by the Composer
#[derive(Debug, Clone, PartialEq)]
pub enum ComposerEvent {
    /// User submitted a non-blank draft (Enter pressed)
    Submit(String),
    /// Draft or cursor changed; the parent only needs to redraw
    ContentChanged,
}

/// Draft editor with quick actions.
///
/// # Props
///
/// - `is_loading`: a reply is pending, input is disabled
/// - `entitlement`: decides the badge and upgrade hint
/// - `focused`: whether the terminal cursor belongs to the composer
///
/// # State
///
/// - `buffer`: the draft
/// - `cursor`: cursor byte offset and internal scroll
/// - `placeholder`: hint shown while the draft is empty
pub struct Composer {
    pub buffer: String,
    pub is_loading: bool,
    pub entitlement: Entitlement,
    pub placeholder: String,
    pub focused: bool,
    cursor: CursorState,
}

impl Composer {
    pub fn new(entitlement: Entitlement) -> Self {
        Self {
            buffer: String::new(),
            is_loading: false,
            entitlement,
            placeholder: DEFAULT_INPUT_HINT.to_string(),
            focused: true,
            cursor: CursorState::new(),
        }
    }

    /// Total height for the current draft: quick-action bar, bordered box
    /// (1..=MAX_VISIBLE_LINES content rows) and footer.
    pub fn calculate_height(&self, width: u16) -> u16 {
        let rows = layout_rows(&self.buffer, inner_width(width)).len() as u16;
        rows.min(MAX_VISIBLE_LINES) + VERTICAL_OVERHEAD + CHROME_ROWS
    }

    fn insert_str(&mut self, text: &str) {
        self.buffer.insert_str(self.cursor.pos, text);
        self.cursor.pos += text.len();
    }

    fn apply_quick_action(&mut self, action: QuickAction) -> Option<ComposerEvent> {
        let template = action.template();
        if self.buffer.starts_with(template) {
            return None;
        }
        self.buffer.insert_str(0, template);
        self.cursor.pos += template.len();
        Some(ComposerEvent::ContentChanged)
    }

    fn quick_action_bar(&self) -> Line<'static> {
        let hint = Style::default().fg(Color::DarkGray);
        let mut spans = Vec::new();
        for action in QuickAction::ALL {
            spans.push(Span::styled(
                format!(" {} ", action.label()),
                Style::default().fg(Color::Cyan),
            ));
            spans.push(Span::styled(format!("[{}]  ", action.shortcut()), hint));
        }
        if self.entitlement.allows(Capability::AdvancedFeatures) {
            spans.push(Span::styled(
                "♛ Advanced Features Unlocked",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        Line::from(spans)
    }

    fn footer(&self) -> Line<'static> {
        let mut spans = vec![Span::styled(
            "Enter to send, Shift+Enter for new line",
            Style::default().fg(Color::DarkGray),
        )];
        if self.entitlement.allows(Capability::UpgradePrompt) {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                "Upgrade for unlimited messages",
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::UNDERLINED),
            ));
        }
        Line::from(spans)
    }

    fn render_scrollbar(&self, frame: &mut Frame, area: Rect, total_rows: usize) {
        let visible = usize::from(MAX_VISIBLE_LINES);
        if total_rows <= visible {
            return;
        }

        // ScrollbarState content_length is max scrollable position, not total items
        let mut scrollbar_state = ScrollbarState::default()
            .content_length(total_rows - visible)
            .position(self.cursor.scroll_offset);

        let scrollbar_area = Rect {
            x: area.x + area.width.saturating_sub(1),
            y: area.y + 1,
            width: 1,
            height: area.height.saturating_sub(2),
        };

        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            scrollbar_area,
            &mut scrollbar_state,
        );
    }
}

impl Component for Composer {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [bar_area, box_area, footer_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(VERTICAL_OVERHEAD + 1),
            Constraint::Length(1),
        ])
        .areas(area);

        frame.render_widget(Paragraph::new(self.quick_action_bar()), bar_area);
        frame.render_widget(Paragraph::new(self.footer()), footer_area);

        let width = inner_width(box_area.width);
        self.cursor.last_width = width;
        let rows = layout_rows(&self.buffer, width);
        self.cursor.update_scroll_offset(&rows);

        let (border_style, text_style, title) = if self.is_loading {
            (
                Style::default().fg(Color::DarkGray),
                Style::default().fg(Color::DarkGray),
                " Waiting for reply... ",
            )
        } else {
            (
                Style::default().fg(Color::Blue),
                Style::default().fg(Color::White),
                " Message ",
            )
        };

        let lines: Vec<Line> = if self.buffer.is_empty() {
            vec![Line::styled(
                self.placeholder.clone(),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )]
        } else {
            rows.iter()
                .skip(self.cursor.scroll_offset)
                .take(usize::from(MAX_VISIBLE_LINES))
                .map(|row| Line::styled(self.buffer[row.start..row.end].to_string(), text_style))
                .collect()
        };

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .padding(ratatui::widgets::Padding::horizontal(1))
            .title(title);

        frame.render_widget(Paragraph::new(lines).block(block), box_area);
        self.render_scrollbar(frame, box_area, rows.len());

        if self.focused && !self.is_loading {
            frame.set_cursor_position(self.cursor.screen_pos(&self.buffer, &rows, box_area));
        }
    }
}

impl EventHandler for Composer {
    type Event = ComposerEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        if self.is_loading {
            return None;
        }
        match event {
            TuiEvent::InputChar(c) => {
                self.buffer.insert(self.cursor.pos, *c);
                self.cursor.pos += c.len_utf8();
                Some(ComposerEvent::ContentChanged)
            }
            TuiEvent::NewLine => {
                self.insert_str("\n");
                Some(ComposerEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                // Normalize CRLF from terminals that paste Windows line endings
                let text = text.replace("\r\n", "\n").replace('\r', "\n");
                self.insert_str(&text);
                Some(ComposerEvent::ContentChanged)
            }
            TuiEvent::Backspace => {
                if self.cursor.pos > 0 {
                    let prev = prev_char_boundary(&self.buffer, self.cursor.pos);
                    self.buffer.drain(prev..self.cursor.pos);
                    self.cursor.pos = prev;
                    Some(ComposerEvent::ContentChanged)
                } else {
                    None
                }
            }
            TuiEvent::Delete => {
                if self.cursor.pos < self.buffer.len() {
                    let next = next_char_boundary(&self.buffer, self.cursor.pos);
                    self.buffer.drain(self.cursor.pos..next);
                    Some(ComposerEvent::ContentChanged)
                } else {
                    None
                }
            }
            TuiEvent::CursorLeft => (self.cursor.pos > 0).then(|| {
                self.cursor.pos = prev_char_boundary(&self.buffer, self.cursor.pos);
                ComposerEvent::ContentChanged
            }),
            TuiEvent::CursorRight => (self.cursor.pos < self.buffer.len()).then(|| {
                self.cursor.pos = next_char_boundary(&self.buffer, self.cursor.pos);
                ComposerEvent::ContentChanged
            }),
            TuiEvent::CursorHome => {
                let line_start = self.buffer[..self.cursor.pos]
                    .rfind('\n')
                    .map(|i| i + 1)
                    .unwrap_or(0);
                (self.cursor.pos != line_start).then(|| {
                    self.cursor.pos = line_start;
                    ComposerEvent::ContentChanged
                })
            }
            TuiEvent::CursorEnd => {
                let line_end = self.buffer[self.cursor.pos..]
                    .find('\n')
                    .map(|i| self.cursor.pos + i)
                    .unwrap_or(self.buffer.len());
                (self.cursor.pos != line_end).then(|| {
                    self.cursor.pos = line_end;
                    ComposerEvent::ContentChanged
                })
            }
            TuiEvent::CursorUp => self
                .cursor
                .move_vertically(&self.buffer, -1)
                .then_some(ComposerEvent::ContentChanged),
            TuiEvent::CursorDown => self
                .cursor
                .move_vertically(&self.buffer, 1)
                .then_some(ComposerEvent::ContentChanged),
            TuiEvent::QuickAction(action) => self.apply_quick_action(*action),
            TuiEvent::Submit => {
                if self.buffer.trim().is_empty() {
                    return None;
                }
                let text = std::mem::take(&mut self.buffer);
                self.cursor.reset();
                Some(ComposerEvent::Submit(text))
            }
            _ => None,
        }
    }
}
