use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};

use crate::core::state::App;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{Header, HistoryPanel, MessageList};

/// Terminals at least this wide dock the history panel permanently.
pub const DOCK_MIN_WIDTH: u16 = 100;
/// Width of the history panel, docked or overlaid.
pub const PANEL_WIDTH: u16 = 32;

/// Whether the history panel is docked at this terminal width.
pub fn is_docked(width: u16) -> bool {
    width >= DOCK_MIN_WIDTH
}

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    use Constraint::{Length, Min};

    let area = frame.area();
    let docked = is_docked(area.width);
    let [header_area, body_area] = Layout::vertical([Length(1), Min(0)]).areas(area);

    let (panel_area, main_area) = if docked {
        let [panel, main] = Layout::horizontal([Length(PANEL_WIDTH), Min(0)]).areas(body_area);
        (Some(panel), main)
    } else if app.sidebar_open {
        let width = PANEL_WIDTH.min(body_area.width);
        (Some(Rect { width, ..body_area }), body_area)
    } else {
        (None, body_area)
    };

    Header {
        status_message: app.status_message.clone(),
        has_unseen_content: tui.message_list.has_unseen_content(),
        entitlement: app.entitlement(),
        show_menu_hint: !docked,
    }
    .render(frame, header_area);

    let composer_height = tui.composer.calculate_height(main_area.width);
    let [messages_area, composer_area] =
        Layout::vertical([Min(0), Length(composer_height)]).areas(main_area);

    MessageList::new(
        &mut tui.message_list,
        &app.session.messages,
        app.entitlement(),
        app.is_loading(),
        spinner_frame,
    )
    .render(frame, messages_area);

    tui.composer.render(frame, composer_area);

    // Drawn last so the overlay variant covers the conversation
    if let Some(panel_area) = panel_area {
        HistoryPanel {
            state: &mut tui.history_panel,
            summaries: &app.history,
            active_id: &app.session.active_conversation_id,
            entitlement: app.entitlement(),
            focused: app.sidebar_open,
            overlay: !docked,
        }
        .render(frame, panel_area);
    }
}
