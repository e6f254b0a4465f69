//! Notification relay
//!
//! Best-effort delivery of post-commit notifications: direct messages to a
//! user through the messaging-channel transport, and conference-scoped
//! broadcasts to display subscribers. Failures are logged and swallowed;
//! nothing here can undo a ledger write.

use crate::db::UserId;
use crate::dialog::Reply;
use async_trait::async_trait;
use futures::StreamExt;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;

const DISPLAY_CHANNEL_CAPACITY: usize = 256;
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);
/// Deliveries in flight at once during a fan-out
const FANOUT_CONCURRENCY: usize = 16;

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Transport rejected message with status {status}")]
    Rejected { status: u16 },
}

/// Outbound message sink of the messaging channel
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, recipient: UserId, reply: &Reply) -> Result<(), DeliveryError>;
}

#[async_trait]
impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    async fn send(&self, recipient: UserId, reply: &Reply) -> Result<(), DeliveryError> {
        (**self).send(recipient, reply).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Posts each notification as JSON to the transport's webhook
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct OutboundMessage<'a> {
    recipient: UserId,
    #[serde(flatten)]
    reply: &'a Reply,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(DELIVERY_TIMEOUT)
            .build()
            .map_err(|e| DeliveryError::Transport(format!("client setup failed: {e}")))?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, recipient: UserId, reply: &Reply) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.url)
            .json(&OutboundMessage { recipient, reply })
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

/// Used when no transport is configured
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, recipient: UserId, reply: &Reply) -> Result<(), DeliveryError> {
        tracing::info!(recipient, text = %reply.text, "Notification (no transport configured)");
        Ok(())
    }
}

// ============================================================================
// Display broadcasts
// ============================================================================

/// Event names understood by the shared display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DisplayEventKind {
    PollUpdate,
    NewPoll,
    NewQuestion,
    QuestionAnswered,
}

impl DisplayEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DisplayEventKind::PollUpdate => "pollUpdate",
            DisplayEventKind::NewPoll => "newPoll",
            DisplayEventKind::NewQuestion => "newQuestion",
            DisplayEventKind::QuestionAnswered => "questionAnswered",
        }
    }
}

/// A broadcast scoped to one conference
#[derive(Debug, Clone, Serialize)]
pub struct DisplayEvent {
    pub conference_id: String,
    pub kind: DisplayEventKind,
    pub payload: Value,
}

// ============================================================================
// Relay
// ============================================================================

/// Capability handed to the ledgers; constructed once at startup
#[derive(Clone)]
pub struct NotificationRelay {
    notifier: Arc<dyn Notifier>,
    display_tx: broadcast::Sender<DisplayEvent>,
}

impl NotificationRelay {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        let (display_tx, _) = broadcast::channel(DISPLAY_CHANNEL_CAPACITY);
        Self {
            notifier,
            display_tx,
        }
    }

    /// Single delivery attempt; failure is logged only
    pub async fn notify(&self, recipient: UserId, reply: Reply) {
        if let Err(e) = self.notifier.send(recipient, &reply).await {
            tracing::warn!(recipient, error = %e, "Notification delivery failed");
        }
    }

    /// Deliver to many recipients concurrently. Completes when every attempt
    /// has finished, so a fan-out costs roughly one delivery timeout rather
    /// than one per recipient.
    pub async fn notify_all(&self, deliveries: Vec<(UserId, Reply)>) {
        let count = deliveries.len();
        futures::stream::iter(deliveries)
            .for_each_concurrent(FANOUT_CONCURRENCY, |(recipient, reply)| {
                self.notify(recipient, reply)
            })
            .await;
        tracing::debug!(count, "Fan-out finished");
    }

    /// Publish to display subscribers of the conference
    pub fn broadcast(&self, conference_id: &str, kind: DisplayEventKind, payload: impl Serialize) {
        let payload = match serde_json::to_value(payload) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(conference_id, event = kind.as_str(), error = %e, "Failed to encode broadcast");
                return;
            }
        };
        let event = DisplayEvent {
            conference_id: conference_id.to_string(),
            kind,
            payload,
        };
        // No subscribers is the normal case when no display is open
        if self.display_tx.send(event).is_err() {
            tracing::debug!(conference_id, event = kind.as_str(), "No display subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DisplayEvent> {
        self.display_tx.subscribe()
    }
}
