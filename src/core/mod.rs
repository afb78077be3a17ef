//! # Core Application Logic
//!
//! This module contains the chat container's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (session)      │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │ Effect
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │    TUI     │      │ Assistant  │      │  History   │
//!     │  Adapter   │      │  provider  │      │   store    │
//!     │ (ratatui)  │      │            │      │            │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all chat state in one place
//! - [`action`]: The `Action` enum and `update()` reducer
//! - [`message`]: Messages, senders and ids
//! - [`history`]: Conversation summaries and history stores
//! - [`entitlement`]: Premium gating
//! - [`config`]: Settings resolution

pub mod action;
pub mod config;
pub mod entitlement;
pub mod history;
pub mod message;
pub mod state;
