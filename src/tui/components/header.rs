//! # Header Component
//!
//! Top bar of the chat screen.
//!
//! ## Responsibilities
//!
//! - Show the app name and, on narrow terminals, the Ctrl+B hint for the chat list
//! - Show the transient status (e.g. "Thinking...")
//! - Show "↓ New" when there's unseen content below the scroll position
//! - Show "♛ Pro User" or "Upgrade to Pro" on the right, per the entitlement
//!
//! Stateless: every field is a prop filled in by `tui::ui` each frame.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::core::entitlement::{Capability, Entitlement};
use crate::tui::component::Component;

pub const APP_TITLE: &str = "CodeBot AI";

/// Top status bar.
///
/// # Props
///
/// - `status_message`: transient status from `App`
/// - `has_unseen_content`: from the message list scroll state
/// - `entitlement`: picks the badge on the right
/// - `show_menu_hint`: the history panel is not docked, so point at Ctrl+B
pub struct Header {
    pub status_message: String,
    pub has_unseen_content: bool,
    pub entitlement: Entitlement,
    pub show_menu_hint: bool,
}

impl Header {
    fn left_line(&self) -> Line<'static> {
        let muted = Style::default().fg(Color::DarkGray);
        let mut spans = Vec::new();
        if self.show_menu_hint {
            spans.push(Span::styled("☰ Ctrl+B  ", muted));
        }
        spans.push(Span::styled(
            format!("✦ {APP_TITLE}"),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        if !self.status_message.is_empty() {
            spans.push(Span::styled(" | ", muted));
            spans.push(Span::styled(
                self.status_message.clone(),
                Style::default().fg(Color::Gray),
            ));
        }
        if self.has_unseen_content {
            spans.push(Span::styled(" | ", muted));
            spans.push(Span::styled("↓ New", Style::default().fg(Color::Cyan)));
        }
        Line::from(spans)
    }

    fn badge(&self) -> Span<'static> {
        if self.entitlement.allows(Capability::UpgradePrompt) {
            Span::styled(
                "♛ Upgrade to Pro ",
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled("♛ Pro User ", Style::default().fg(Color::Yellow))
        }
    }
}

impl Component for Header {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let badge = self.badge();
        let [left, right] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(badge.width() as u16)])
                .areas(area);

        frame.render_widget(Paragraph::new(self.left_line()), left);
        frame.render_widget(Paragraph::new(Line::from(badge)), right);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render_text(header: &mut Header) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 1)).unwrap();
        terminal.draw(|f| header.render(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn header(status: &str, unseen: bool, premium: bool) -> Header {
        Header {
            status_message: status.to_string(),
            has_unseen_content: unseen,
            entitlement: Entitlement::from_premium_flag(premium),
            show_menu_hint: false,
        }
    }

    #[test]
    fn test_free_user_sees_upgrade_prompt() {
        let text = render_text(&mut header("", false, false));
        assert!(text.contains(APP_TITLE));
        assert!(text.contains("Upgrade to Pro"));
        assert!(!text.contains("Pro User"));
        assert!(!text.contains('|'));
    }

    #[test]
    fn test_pro_user_sees_badge() {
        let text = render_text(&mut header("", false, true));
        assert!(text.contains("Pro User"));
        assert!(!text.contains("Upgrade"));
    }

    #[test]
    fn test_status_and_unseen_indicator() {
        let text = render_text(&mut header("Thinking...", true, false));
        assert!(text.contains("Thinking..."));
        assert!(text.contains("↓ New"));
    }

    #[test]
    fn test_menu_hint_on_narrow_layout() {
        let mut h = header("", false, false);
        h.show_menu_hint = true;
        assert!(render_text(&mut h).contains("Ctrl+B"));
    }
}
