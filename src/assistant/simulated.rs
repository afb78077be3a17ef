//! Stand-in assistant: waits a fixed delay, then answers with fixed text.
//!
//! This is the default provider until a real backend is plugged in. It
//! cannot fail.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;

use crate::assistant::{AssistantError, AssistantProvider, ReplyRequest};

pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(1500);

pub const DEFAULT_PLACEHOLDER: &str = "I understand you're asking about coding. \
    This is where your custom AI system would generate a response. \
    You can integrate any AI model or service here - Hugging Face Transformers, \
    local models, or your own trained models.";

pub struct SimulatedAssistant {
    delay: Duration,
    content: String,
}

impl SimulatedAssistant {
    pub fn new(delay: Duration, content: impl Into<String>) -> Self {
        Self {
            delay,
            content: content.into(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for SimulatedAssistant {
    fn default() -> Self {
        Self::new(DEFAULT_REPLY_DELAY, DEFAULT_PLACEHOLDER)
    }
}

#[async_trait]
impl AssistantProvider for SimulatedAssistant {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn reply(&self, request: &ReplyRequest) -> Result<String, AssistantError> {
        debug!(
            "Simulating reply for {} ({} messages, delay {:?})",
            request.conversation_id,
            request.history.len(),
            self.delay
        );
        tokio::time::sleep(self.delay).await;
        Ok(self.content.clone())
    }
}
