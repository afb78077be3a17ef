use chrono::Local;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget};
use unicode_width::UnicodeWidthStr;

use crate::core::entitlement::{Capability, Entitlement};
use crate::core::message::{Message, Sender};

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;
/// Bubbles take at most this share of the row, in percent.
const MAX_WIDTH_PERCENT: u16 = 70;
/// Below this row width a bubble may use the whole row.
const MIN_BUBBLE_WIDTH: u16 = 24;

/// A stateless component that renders one chat message as a bubble.
///
/// # Design
///
/// `MessageBubble` is a **transient component**: `MessageList` creates one per
/// visible message each frame. Everything it shows comes from the `Message`
/// and the current `Entitlement`.
///
/// # Layout
///
/// - **User** bubbles hug the right edge, **assistant** bubbles the left edge
/// - Width shrinks to the content, capped at 70% of the row
/// - The top border carries the sender label, the `HH:MM` time and a "Pro"
///   badge when the plan grants it
/// - Error replies are drawn in red
///
/// # Height Calculation
///
/// Content is wrapped with `textwrap` once, and the same lines are both
/// counted by [`calculate_height`](Self::calculate_height) and drawn by the
/// widget (without further wrapping), so the predicted height is exact.
#[derive(Clone, Copy)]
pub struct MessageBubble<'a> {
    pub message: &'a Message,
    pub entitlement: Entitlement,
}

impl<'a> MessageBubble<'a> {
    pub fn new(message: &'a Message, entitlement: Entitlement) -> Self {
        Self {
            message,
            entitlement,
        }
    }

    /// Calculate the height this message needs in a row `width` columns wide.
    pub fn calculate_height(message: &Message, width: u16) -> u16 {
        let max_width = max_bubble_width(width);
        if max_width <= HORIZONTAL_OVERHEAD {
            // Degenerate case: terminal too narrow for borders + padding.
            return 1;
        }
        wrap_content(&message.content, max_width - HORIZONTAL_OVERHEAD).len() as u16
            + VERTICAL_OVERHEAD
    }

    fn sender_label(&self) -> &'static str {
        match self.message.sender {
            Sender::User => "You",
            Sender::Assistant => "AI Assistant",
        }
    }

    fn title(&self) -> Line<'static> {
        let accent = self.accent_style();
        let muted = Style::default().fg(Color::DarkGray);
        let time = self
            .message
            .created_at
            .with_timezone(&Local)
            .format("%H:%M")
            .to_string();

        let mut spans = vec![
            Span::raw(" "),
            Span::styled(self.sender_label(), accent.add_modifier(Modifier::BOLD)),
            Span::raw(" "),
        ];
        if self.entitlement.allows(Capability::ProBadge) {
            spans.push(Span::styled("♛ Pro", Style::default().fg(Color::Yellow)));
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(time, muted));
        spans.push(Span::raw(" "));
        Line::from(spans)
    }

    fn accent_style(&self) -> Style {
        if self.message.is_error {
            Style::default().fg(Color::Red)
        } else {
            match self.message.sender {
                Sender::User => Style::default().fg(Color::Cyan),
                Sender::Assistant => Style::default().fg(Color::Green),
            }
        }
    }

    /// Horizontal placement of the bubble inside `area`.
    fn bubble_rect(&self, area: Rect, lines: &[String], title_width: u16) -> Rect {
        let content_width = lines
            .iter()
            .map(|l| l.width() as u16)
            .max()
            .unwrap_or(0);
        let width = (content_width + HORIZONTAL_OVERHEAD)
            .max(title_width + 2)
            .min(max_bubble_width(area.width));
        let x = match self.message.sender {
            Sender::User => area.x + area.width.saturating_sub(width),
            Sender::Assistant => area.x,
        };
        Rect { x, width, ..area }
    }
}

fn max_bubble_width(row_width: u16) -> u16 {
    if row_width < MIN_BUBBLE_WIDTH {
        return row_width;
    }
    (row_width * MAX_WIDTH_PERCENT / 100).max(MIN_BUBBLE_WIDTH)
}

/// Wrap `content` into display lines, keeping explicit line breaks.
/// The wrapping options match what the widget draws, one line per row.
fn wrap_content(content: &str, width: u16) -> Vec<String> {
    let options = textwrap::Options::new(usize::from(width.max(1)))
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace);
    let lines: Vec<String> = textwrap::wrap(content, options)
        .into_iter()
        .map(|l| l.into_owned())
        .collect();
    if lines.is_empty() {
        vec![String::new()]
    } else {
        lines
    }
}

// Implement Widget for easy usage in ScrollView
impl<'a> Widget for MessageBubble<'a> {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        let max_width = max_bubble_width(area.width);
        let lines = wrap_content(
            &self.message.content,
            max_width.saturating_sub(HORIZONTAL_OVERHEAD),
        );
        let title = self.title();
        let bubble = self.bubble_rect(area, &lines, title.width() as u16);

        let accent = self.accent_style();
        let text_style = if self.message.is_error {
            accent
        } else {
            Style::default()
        };

        let mut block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(accent)
            .title(title)
            .padding(Padding::horizontal(CONTENT_PAD_H));
        if self.message.is_user() {
            block = block.title_alignment(ratatui::layout::Alignment::Right);
        }

        let inner_area = block.inner(bubble);
        block.render(bubble, buf);

        let text: Vec<Line> = lines.into_iter().map(Line::from).collect();
        Paragraph::new(text).style(text_style).render(inner_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render_rows(message: &Message, entitlement: Entitlement, width: u16) -> Vec<String> {
        let height = MessageBubble::calculate_height(message, width);
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|f| f.render_widget(MessageBubble::new(message, entitlement), f.area()))
            .unwrap();
        let buffer = terminal.backend().buffer();
        (0..height)
            .map(|y| (0..width).map(|x| buffer[(x, y)].symbol()).collect())
            .collect()
    }

    // ==========================================================================
    // calculate_height tests
    // ==========================================================================

    #[test]
    fn calculate_height_empty_content_has_one_row() {
        let message = Message::user("");
        assert_eq!(
            MessageBubble::calculate_height(&message, 80),
            1 + VERTICAL_OVERHEAD
        );
    }

    #[test]
    fn calculate_height_keeps_blank_lines() {
        let message = Message::assistant("a\n\nb");
        assert_eq!(
            MessageBubble::calculate_height(&message, 80),
            3 + VERTICAL_OVERHEAD
        );
    }

    #[test]
    fn calculate_height_zero_width_returns_minimum() {
        let message = Message::user("Hello world");
        assert_eq!(MessageBubble::calculate_height(&message, 0), 1);
    }

    #[test]
    fn calculate_height_wraps_at_seventy_percent() {
        // Row 40 → bubble 28 → content 24 columns
        let message = Message::assistant("x".repeat(48));
        assert_eq!(
            MessageBubble::calculate_height(&message, 40),
            2 + VERTICAL_OVERHEAD
        );
    }

    #[test]
    fn narrow_rows_use_full_width() {
        assert_eq!(max_bubble_width(20), 20);
        assert_eq!(max_bubble_width(30), MIN_BUBBLE_WIDTH);
        assert_eq!(max_bubble_width(100), 70);
    }

    // ==========================================================================
    // Render tests
    // ==========================================================================

    #[test]
    fn user_bubble_is_right_aligned() {
        let message = Message::user("hi");
        let rows = render_rows(&message, Entitlement::default(), 60);
        assert!(rows[1].trim_end().ends_with('│'));
        assert!(rows[1].starts_with(' '));
        assert!(rows[0].contains("You"));
    }

    #[test]
    fn assistant_bubble_is_left_aligned() {
        let message = Message::assistant("hello");
        let rows = render_rows(&message, Entitlement::default(), 60);
        assert!(rows[1].starts_with('│'));
        assert!(rows[0].contains("AI Assistant"));
    }

    #[test]
    fn pro_badge_follows_entitlement() {
        let message = Message::assistant("hello");
        let free = render_rows(&message, Entitlement::default(), 60).join("");
        let pro = render_rows(&message, Entitlement::from_premium_flag(true), 60).join("");
        assert!(!free.contains("Pro"));
        assert!(pro.contains("Pro"));
    }

    #[test]
    fn error_bubble_is_red() {
        let message = Message::error("boom");
        let height = MessageBubble::calculate_height(&message, 40);
        let mut terminal = Terminal::new(TestBackend::new(40, height)).unwrap();
        terminal
            .draw(|f| {
                f.render_widget(MessageBubble::new(&message, Entitlement::default()), f.area())
            })
            .unwrap();
        assert_eq!(terminal.backend().buffer()[(0, 0)].fg, Color::Red);
    }
}
