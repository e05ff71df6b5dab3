//! Wraps teloxide::Bot and implements [`chatstat_core::Bot`]. Production code publishes the
//! summary via Telegram; tests substitute a recording Bot impl.

use async_trait::async_trait;
use chatstat_core::{Bot as CoreBot, ChatstatError, Result};
use teloxide::{prelude::*, types::MessageId};

/// Builds a teloxide Bot from a token, optionally pointed at a non-default API URL
/// (used in tests against a mock server).
pub fn build_bot(token: &str, api_url: Option<&str>) -> anyhow::Result<teloxide::Bot> {
    let bot = teloxide::Bot::new(token.to_string());
    match api_url {
        Some(url) => Ok(bot.set_api_url(reqwest::Url::parse(url)?)),
        None => Ok(bot),
    }
}

/// Thin wrapper around teloxide::Bot that implements the core gateway trait.
pub struct TelegramGateway {
    bot: teloxide::Bot,
}

impl TelegramGateway {
    /// Creates a gateway from an existing teloxide Bot.
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }

    /// Returns the underlying teloxide::Bot for direct API use when needed.
    pub fn inner(&self) -> &teloxide::Bot {
        &self.bot
    }
}

#[async_trait]
impl CoreBot for TelegramGateway {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<i64> {
        let sent = self
            .bot
            .send_message(ChatId(chat_id), text.to_string())
            .await
            .map_err(|e| ChatstatError::Gateway(e.to_string()))?;
        Ok(i64::from(sent.id.0))
    }

    async fn edit_message(&self, chat_id: i64, message_id: i64, text: &str) -> Result<()> {
        let id = i32::try_from(message_id).map_err(|_| {
            ChatstatError::Gateway(format!("Invalid message_id for edit: {}", message_id))
        })?;
        self.bot
            .edit_message_text(ChatId(chat_id), MessageId(id), text.to_string())
            .await
            .map_err(|e| ChatstatError::Gateway(e.to_string()))?;
        Ok(())
    }
}
