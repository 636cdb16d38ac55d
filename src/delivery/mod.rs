//! Outbound message delivery. The scheduler talks to the `DeliveryGateway`
//! trait only, so tick logic stays transport-agnostic.

/// Telegram transport and the token-less fallback
pub mod telegram;

use async_trait::async_trait;
use thiserror::Error;

/// The transport rejected or timed out sending to one recipient. Always
/// recovered locally by the caller; never unwinds a scheduler tick.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("invalid recipient identity '{0}'")]
    InvalidRecipient(String),
    #[error("send to {recipient} timed out after {seconds}s")]
    Timeout { recipient: String, seconds: u64 },
    #[error("transport rejected message for {recipient}: {reason}")]
    Transport { recipient: String, reason: String },
}

/// Per-broadcast delivery counts, for logs and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    pub sent: usize,
    pub failed: usize,
}

impl DeliveryReport {
    pub fn total(&self) -> usize {
        self.sent + self.failed
    }

    pub fn merge(&mut self, other: DeliveryReport) {
        self.sent += other.sent;
        self.failed += other.failed;
    }
}

/// Sends one message to one or many recipients over some transport.
#[async_trait]
pub trait DeliveryGateway: Send + Sync {
    /// Attempts delivery to a single recipient.
    async fn send_one(&self, recipient: &str, text: &str) -> Result<(), DeliveryError>;

    /// Attempts delivery to each recipient independently. A failure for one
    /// recipient is logged and counted, never propagated, so one unreachable
    /// recipient cannot prevent delivery to the rest.
    async fn broadcast(&self, recipients: &[String], text: &str) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        for recipient in recipients {
            match self.send_one(recipient, text).await {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    tracing::warn!("Failed to deliver notification: {}", e);
                    report.failed += 1;
                }
            }
        }
        report
    }
}
