//! # TUI Components
//!
//! The pieces of the chat screen.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Display components that receive all data as fields:
//! - `Header`: app name, status, plan badge
//! - `MessageBubble`: one chat message
//!
//! ### Stateful Components (Event-Driven)
//!
//! Components that keep local state and emit events:
//! - `Composer`: draft editor, emits `ComposerEvent`
//! - `MessageList` / `MessageListState`: scrolling and layout caching
//! - `HistoryPanel` / `HistoryPanelState`: chat list, emits `HistoryEvent`
//!
//! Components never touch `App` directly. They receive props (usually
//! borrowed from `App` for one frame) and report intent through their event
//! types; `tui::run` turns those into `Action`s for `core::action::update`.
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs            (this file)
//! ├── header.rs         (top bar)
//! ├── message.rs        (single bubble)
//! ├── message_list.rs   (scrollable conversation)
//! ├── history_panel.rs  (conversation list)
//! └── composer/         (draft editor + quick actions)
//! ```

pub mod composer;
pub mod header;
pub mod history_panel;
pub mod message;
pub mod message_list;

pub use composer::{Composer, ComposerEvent, QuickAction};
pub use header::Header;
pub use history_panel::{HistoryEvent, HistoryPanel, HistoryPanelState};
pub use message::MessageBubble;
pub use message_list::{MessageList, MessageListState};
