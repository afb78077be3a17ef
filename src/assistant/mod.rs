pub mod dispatch;
pub mod provider;
pub mod simulated;

pub use dispatch::{DEFAULT_REPLY_TIMEOUT, run_reply, spawn_reply};
pub use provider::{AssistantError, AssistantProvider, ReplyRequest};
pub use simulated::{DEFAULT_PLACEHOLDER, DEFAULT_REPLY_DELAY, SimulatedAssistant};
