//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Arc;

use async_trait::async_trait;

use crate::assistant::{AssistantError, AssistantProvider, ReplyRequest};
use crate::core::entitlement::Entitlement;
use crate::core::state::{App, Greetings};

/// A provider that answers instantly with a fixed text.
pub struct InstantAssistant(pub String);

#[async_trait]
impl AssistantProvider for InstantAssistant {
    fn name(&self) -> &str {
        "instant"
    }

    async fn reply(&self, _request: &ReplyRequest) -> Result<String, AssistantError> {
        Ok(self.0.clone())
    }
}

/// A provider that always fails with the given error.
pub struct FailingAssistant(pub AssistantError);

impl FailingAssistant {
    pub fn network(msg: &str) -> Self {
        Self(AssistantError::Network(msg.to_string()))
    }
}

#[async_trait]
impl AssistantProvider for FailingAssistant {
    fn name(&self) -> &str {
        "failing"
    }

    async fn reply(&self, _request: &ReplyRequest) -> Result<String, AssistantError> {
        Err(self.0.clone())
    }
}

/// Creates a free-plan test App with an instant provider.
pub fn test_app() -> App {
    App::new(
        Arc::new(InstantAssistant("ok".to_string())),
        Entitlement::default(),
        Greetings::default(),
    )
}

/// Creates a Pro-plan test App.
pub fn premium_app() -> App {
    App::new(
        Arc::new(InstantAssistant("ok".to_string())),
        Entitlement::from_premium_flag(true),
        Greetings::default(),
    )
}
