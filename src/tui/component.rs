use ratatui::Frame;
use ratatui::layout::Rect;

/// A piece of the chat screen.
///
/// Components receive their data as props (struct fields, usually borrowed
/// from `App` for one frame) and render into a `Rect`.
///
/// `render` takes `&mut self` so components that wrap persistent state
/// (scroll offsets, layout caches, list selection) can update it during the
/// render pass, like ratatui's `StatefulWidget`.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// A component that turns low-level `TuiEvent`s into its own events.
pub trait EventHandler {
    /// The type of high-level event this component emits.
    type Event;

    fn handle_event(&mut self, event: &super::event::TuiEvent) -> Option<Self::Event>;
}
