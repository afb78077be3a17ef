//! Runs a reply request in the background and reports back as an `Action`.
//!
//! The task is fire-and-forget: it is never aborted. If the session was
//! reset while the request was in flight, the container drops the reply by
//! ticket, so a late reply can never touch the new conversation.

use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::assistant::{AssistantError, AssistantProvider, ReplyRequest};
use crate::core::action::Action;

pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(30);

/// Await the provider (bounded by `timeout`) and send `Action::ReplyReceived`.
pub async fn run_reply(
    provider: Arc<dyn AssistantProvider>,
    request: ReplyRequest,
    timeout: Duration,
    tx: mpsc::Sender<Action>,
) {
    let ticket = request.ticket;
    let result = match tokio::time::timeout(timeout, provider.reply(&request)).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                "Provider '{}' timed out after {:?} ({:?})",
                provider.name(),
                timeout,
                ticket
            );
            Err(AssistantError::Timeout(timeout))
        }
    };

    match &result {
        Ok(content) => debug!("Reply ready ({:?}, {} bytes)", ticket, content.len()),
        Err(e) => info!("Reply failed ({:?}): {}", ticket, e),
    }

    if tx.send(Action::ReplyReceived { ticket, result }).is_err() {
        warn!("Failed to deliver reply for {:?}: receiver dropped", ticket);
    }
}

/// Spawn [`run_reply`] on the tokio runtime.
pub fn spawn_reply(
    provider: Arc<dyn AssistantProvider>,
    request: ReplyRequest,
    timeout: Duration,
    tx: mpsc::Sender<Action>,
) -> tokio::task::JoinHandle<()> {
    info!(
        "Spawning reply request via '{}' ({:?})",
        provider.name(),
        request.ticket
    );
    tokio::spawn(run_reply(provider, request, timeout, tx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::SimulatedAssistant;
    use crate::core::message::{ConversationId, Message};
    use crate::core::state::ReplyTicket;
    use crate::test_support::FailingAssistant;

    fn request() -> ReplyRequest {
        ReplyRequest {
            ticket: ReplyTicket::default().next(),
            conversation_id: ConversationId::default(),
            history: vec![Message::user("hello")],
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_reply_is_forwarded_with_ticket() {
        let (tx, rx) = mpsc::channel();
        let provider = Arc::new(SimulatedAssistant::new(Duration::from_millis(10), "done"));
        let req = request();
        let ticket = req.ticket;

        run_reply(provider, req, DEFAULT_REPLY_TIMEOUT, tx).await;

        match rx.try_recv() {
            Ok(Action::ReplyReceived { ticket: got, result }) => {
                assert_eq!(got, ticket);
                assert_eq!(result, Ok("done".to_string()));
            }
            other => panic!("expected ReplyReceived, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_provider_times_out() {
        let (tx, rx) = mpsc::channel();
        let provider = Arc::new(SimulatedAssistant::new(Duration::from_secs(60), "late"));
        let timeout = Duration::from_secs(5);

        run_reply(provider, request(), timeout, tx).await;

        match rx.try_recv() {
            Ok(Action::ReplyReceived { result, .. }) => {
                assert_eq!(result, Err(AssistantError::Timeout(timeout)));
            }
            other => panic!("expected ReplyReceived, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_provider_error_is_forwarded() {
        let (tx, rx) = mpsc::channel();
        let provider = Arc::new(FailingAssistant::network("connection reset"));

        run_reply(provider, request(), DEFAULT_REPLY_TIMEOUT, tx).await;

        assert!(matches!(
            rx.try_recv(),
            Ok(Action::ReplyReceived {
                result: Err(AssistantError::Network(_)),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_dropped_receiver_does_not_panic() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let provider = Arc::new(SimulatedAssistant::new(Duration::ZERO, "nobody listens"));
        run_reply(provider, request(), DEFAULT_REPLY_TIMEOUT, tx).await;
    }
}
