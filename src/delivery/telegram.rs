use async_trait::async_trait;
use std::time::Duration;
use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode};

use super::{DeliveryError, DeliveryGateway, DeliveryReport};
use crate::utils::validation::validate_chat_id;

/// Per-recipient send timeout; expiry counts as a delivery failure so a
/// slow transport cannot stall a whole scheduler tick.
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivers notifications over the Telegram Bot API using HTML formatting.
pub struct TelegramGateway {
    bot: Bot,
}

impl TelegramGateway {
    pub fn new(token: &str) -> Self {
        Self {
            bot: Bot::new(token),
        }
    }
}

#[async_trait]
impl DeliveryGateway for TelegramGateway {
    async fn send_one(&self, recipient: &str, text: &str) -> Result<(), DeliveryError> {
        let chat_id: i64 = recipient
            .trim()
            .parse()
            .map_err(|_| DeliveryError::InvalidRecipient(recipient.to_string()))?;
        validate_chat_id(chat_id)
            .map_err(|_| DeliveryError::InvalidRecipient(recipient.to_string()))?;

        let request = self
            .bot
            .send_message(ChatId(chat_id), text)
            .parse_mode(ParseMode::Html);

        match tokio::time::timeout(SEND_TIMEOUT, request.send()).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(DeliveryError::Transport {
                recipient: recipient.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(DeliveryError::Timeout {
                recipient: recipient.to_string(),
                seconds: SEND_TIMEOUT.as_secs(),
            }),
        }
    }
}

/// Stand-in transport used when no bot token is configured. The rest of
/// the platform keeps running; every broadcast is dropped and logged.
pub struct DisabledGateway;

#[async_trait]
impl DeliveryGateway for DisabledGateway {
    async fn send_one(&self, _recipient: &str, _text: &str) -> Result<(), DeliveryError> {
        Ok(())
    }

    async fn broadcast(&self, recipients: &[String], _text: &str) -> DeliveryReport {
        tracing::debug!(
            "Telegram notifications disabled, dropping broadcast to {} recipients",
            recipients.len()
        );
        DeliveryReport::default()
    }
}
