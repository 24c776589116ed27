//! Outbound notifications.
//!
//! Defines the `Notifier` trait, the message templates, and the single-slot
//! handle for the retractable "monitoring" status message. The Telegram
//! client also serves the `/start` command listener.

pub mod commands;
pub mod messages;
pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

/// Identifier of a message the sink has accepted.
pub type MessageId = i64;

/// Abstraction over the chat destination.
///
/// Implementors post plain text to one fixed channel and can delete a
/// message they posted earlier.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Post a message, returning its id.
    async fn send(&self, text: &str) -> Result<MessageId>;

    /// Delete a previously posted message.
    async fn retract(&self, id: MessageId) -> Result<()>;

    /// Sink name for logging.
    fn name(&self) -> &str;
}

/// At most one live status message. Retraction is best-effort and has no
/// bearing on bet tracking.
#[derive(Debug, Default)]
pub struct StatusSlot {
    live: Option<MessageId>,
}

impl StatusSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_occupied(&self) -> bool {
        self.live.is_some()
    }

    pub fn live(&self) -> Option<MessageId> {
        self.live
    }

    /// Remember a freshly posted status message.
    pub fn occupy(&mut self, id: MessageId) {
        if let Some(previous) = self.live.replace(id) {
            debug!(previous, id, "Status message superseded without retraction");
        }
    }

    /// Retract the live status message, if any. The slot is cleared even
    /// when deletion fails.
    pub async fn retract(&mut self, notifier: &dyn Notifier) {
        let Some(id) = self.live.take() else {
            return;
        };
        if let Err(e) = notifier.retract(id).await {
            warn!(sink = notifier.name(), message_id = id, error = %e, "Failed to retract status message");
        }
    }
}
