//! # MessageList Component
//!
//! Scrollable view of the active conversation.
//!
//! ## Responsibilities
//!
//! - Display the message bubbles in order
//! - Show a typing indicator while a reply is pending
//! - Show the empty state for a conversation without messages
//! - Keep scroll position, auto-scroll to the newest message
//! - Cache bubble heights so only new messages are measured
//!
//! ## Architecture
//!
//! `MessageList` is a transient component (created each frame) that wraps
//! `&'a mut MessageListState` (persistent state) and the messages (props).
//!
//! Since `Component::render` takes `&mut self`, we can safely mutate the state
//! (including layout cache and scroll state) during the render pass, aligning
//! with Ratatui's `StatefulWidget` pattern.

use ratatui::Frame;
use ratatui::layout::{Alignment, Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::entitlement::Entitlement;
use crate::core::message::{Message, MessageId};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::MessageBubble;
use crate::tui::event::TuiEvent;

pub const EMPTY_CONVERSATION_TEXT: &str = "No messages in this conversation yet.";

/// Blank row between consecutive bubbles
const MESSAGE_GAP: u16 = 1;
/// Rows reserved under the last bubble for the typing indicator
const TYPING_ROW_HEIGHT: u16 = 1;

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Layout and scroll state for the message list.
/// Must be persisted in the parent TuiState.
pub struct MessageListState {
    /// Scroll offset and view state
    pub scroll_state: ScrollViewState,
    /// Cached layout measurements
    pub layout: LayoutCache,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::new(),
            stick_to_bottom: true, // Start attached to bottom
            viewport_height: 0,
        }
    }

    fn max_scroll(&self) -> u16 {
        self.layout
            .total_height()
            .saturating_sub(self.viewport_height)
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    /// Prevents overscrolling past the last message.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_scroll();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Clamp scroll and re-engage auto-scroll if the user has reached the bottom.
    /// Called on scroll-down events so that scrolling past the end re-pins to bottom.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_scroll();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// True when the user scrolled up and messages exist below the viewport.
    pub fn has_unseen_content(&self) -> bool {
        !self.stick_to_bottom && self.scroll_state.offset().y < self.max_scroll()
    }
}

/// Scrollable conversation view component.
/// Created fresh each frame with references to state and data.
pub struct MessageList<'a> {
    // Mutable reference to persistent state
    pub state: &'a mut MessageListState,
    pub messages: &'a [Message],
    pub entitlement: Entitlement,
    pub is_loading: bool,
    pub spinner_frame: usize,
}

impl<'a> MessageList<'a> {
    pub fn new(
        state: &'a mut MessageListState,
        messages: &'a [Message],
        entitlement: Entitlement,
        is_loading: bool,
        spinner_frame: usize,
    ) -> Self {
        Self {
            state,
            messages,
            entitlement,
            is_loading,
            spinner_frame,
        }
    }

    fn typing_indicator(&self) -> Line<'static> {
        let frame = SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()];
        Line::from(vec![
            Span::styled(format!("{frame} "), Style::default().fg(Color::Green)),
            Span::styled(
                "AI Assistant is typing...",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ),
        ])
    }

    fn render_empty_state(&self, frame: &mut Frame, area: Rect) {
        let middle = area.y + area.height / 2;
        let text_area = Rect::new(area.x, middle, area.width, area.height.min(1));
        let empty = Paragraph::new(EMPTY_CONVERSATION_TEXT)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(empty, text_area);
    }
}

impl<'a> Component for MessageList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // -1 for scrollbar safe area
        self.state.viewport_height = area.height;

        if self.messages.is_empty() && !self.is_loading {
            self.state.layout = LayoutCache::new();
            self.state.scroll_state = ScrollViewState::default();
            self.render_empty_state(frame, area);
            return;
        }

        // 1. Update Layout Cache (Internal Mutation)
        let layout = &mut self.state.layout;
        let reusable = layout.reusable_count(self.messages, content_width);
        layout.heights.truncate(reusable);
        for message in self.messages.iter().skip(layout.heights.len()) {
            layout
                .heights
                .push(MessageBubble::calculate_height(message, content_width) + MESSAGE_GAP);
        }
        layout.rebuild_prefix_heights();
        layout.update_metadata(self.messages, content_width);

        let total_height = self.state.layout.total_height();
        let indicator_height = if self.is_loading { TYPING_ROW_HEIGHT } else { 0 };
        let canvas_height = total_height + indicator_height;

        // 2. Clamp scroll offset to prevent overscrolling past content.
        if !self.state.stick_to_bottom {
            self.state.clamp_scroll();
        }

        let scroll_offset = if self.state.stick_to_bottom {
            canvas_height.saturating_sub(area.height)
        } else {
            self.state.scroll_state.offset().y
        };
        let visible_range = self.state.layout.visible_range(scroll_offset, area.height);

        // 3. Render visible bubbles into a ScrollView
        let mut scroll_view = ScrollView::new(Size::new(content_width, canvas_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y_offset: u16 = if visible_range.start > 0 {
            self.state.layout.prefix_heights[visible_range.start - 1]
        } else {
            0
        };

        for i in visible_range {
            let height = self.state.layout.heights[i];
            let bubble_rect = Rect::new(0, y_offset, content_width, height - MESSAGE_GAP);
            scroll_view.render_widget(
                MessageBubble::new(&self.messages[i], self.entitlement),
                bubble_rect,
            );
            y_offset += height;
        }

        if self.is_loading {
            let indicator_rect = Rect::new(1, total_height, content_width.saturating_sub(1), 1);
            scroll_view.render_widget(Paragraph::new(self.typing_indicator()), indicator_rect);
        }

        // Auto-scroll logic (Mutation)
        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

/// EventHandler is implemented on `MessageListState` rather than `MessageList`
/// because scrolling mutates persistent state while `MessageList` is rebuilt
/// every frame.
impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            _ => {}
        }
        None
    }
}

/// Cached bubble heights (each including the gap below it).
///
/// Messages never change after they are appended, so heights stay valid
/// until the width changes or the list is replaced by another conversation
/// (detected through the first message id).
pub struct LayoutCache {
    pub heights: Vec<u16>,
    pub prefix_heights: Vec<u16>,
    message_count: usize,
    content_width: u16,
    first_id: Option<MessageId>,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCache {
    pub fn new() -> Self {
        Self {
            heights: Vec::new(),
            prefix_heights: Vec::new(),
            message_count: 0,
            content_width: 0,
            first_id: None,
        }
    }

    pub fn reusable_count(&self, messages: &[Message], content_width: u16) -> usize {
        if self.content_width != content_width || self.heights.is_empty() {
            return 0;
        }
        // Fewer messages or a different first message: another conversation
        if messages.len() < self.message_count
            || messages.first().map(|m| &m.id) != self.first_id.as_ref()
        {
            return 0;
        }
        self.message_count.min(self.heights.len())
    }

    pub fn update_metadata(&mut self, messages: &[Message], content_width: u16) {
        self.message_count = messages.len();
        self.content_width = content_width;
        self.first_id = messages.first().map(|m| m.id.clone());
    }

    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
    }

    pub fn total_height(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    pub fn visible_range(&self, scroll_offset: u16, viewport_height: u16) -> std::ops::Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn build_cache(messages: &[Message], width: u16) -> LayoutCache {
        let mut cache = LayoutCache::new();
        for m in messages {
            cache
                .heights
                .push(MessageBubble::calculate_height(m, width) + MESSAGE_GAP);
        }
        cache.rebuild_prefix_heights();
        cache.update_metadata(messages, width);
        cache
    }

    fn render_text(
        state: &mut MessageListState,
        messages: &[Message],
        is_loading: bool,
    ) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        terminal
            .draw(|f| {
                MessageList::new(state, messages, Entitlement::default(), is_loading, 0)
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
    fn test_appending_reuses_cached_heights() {
        let mut messages = vec![Message::assistant("hi"), Message::user("hello")];
        let cache = build_cache(&messages, 80);
        messages.push(Message::assistant("reply"));

        assert_eq!(cache.reusable_count(&messages, 80), 2);
    }

    #[test]
    fn test_width_change_invalidates_cache() {
        let messages = vec![Message::assistant("hi")];
        let cache = build_cache(&messages, 80);
        assert_eq!(cache.reusable_count(&messages, 40), 0);
    }

    #[test]
    fn test_switching_conversation_invalidates_cache() {
        let messages = vec![Message::assistant("hi"), Message::user("hello")];
        let cache = build_cache(&messages, 80);

        // Same length, different conversation
        let other = vec![Message::assistant("hi"), Message::user("hello")];
        assert_eq!(cache.reusable_count(&other, 80), 0);

        // Shorter list
        assert_eq!(cache.reusable_count(&messages[..1], 80), 0);
    }

    #[test]
    fn test_visible_range_skips_offscreen_messages() {
        let mut cache = LayoutCache::new();
        cache.heights = vec![10; 10];
        cache.rebuild_prefix_heights();

        // Viewport 10 at offset 50 with a 5-row buffer each side: rows 45..65
        assert_eq!(cache.visible_range(50, 10), 4..7);
        assert_eq!(cache.total_height(), 100);
    }

    #[test]
    fn test_scroll_up_detaches_and_scroll_down_repins() {
        let mut state = MessageListState::new();
        state.layout.heights = vec![10; 5];
        state.layout.rebuild_prefix_heights();
        state.viewport_height = 10;
        state.scroll_state.set_offset(Position { x: 0, y: 40 });

        state.handle_event(&TuiEvent::ScrollUp);
        assert!(!state.stick_to_bottom);
        assert!(state.has_unseen_content());

        state.handle_event(&TuiEvent::ScrollDown);
        assert!(state.stick_to_bottom);
        assert!(!state.has_unseen_content());
    }

    #[test]
    fn test_empty_conversation_shows_empty_state() {
        let mut state = MessageListState::new();
        let text = render_text(&mut state, &[], false);
        assert!(text.contains(EMPTY_CONVERSATION_TEXT));
    }

    #[test]
    fn test_typing_indicator_only_while_loading() {
        let messages = vec![Message::user("question")];
        let mut state = MessageListState::new();

        let idle = render_text(&mut state, &messages, false);
        assert!(idle.contains("question"));
        assert!(!idle.contains("is typing"));

        let loading = render_text(&mut state, &messages, true);
        assert!(loading.contains("AI Assistant is typing..."));
    }
}
