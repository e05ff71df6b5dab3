//! Outbound gateway abstraction for publishing and editing chat messages.
//!
//! The summary refresher and command handlers talk to this trait only; the Telegram
//! implementation lives in chatstat-telegram so everything here stays testable with a
//! recording stub.

use crate::error::Result;
use async_trait::async_trait;

/// Abstraction for sending and editing messages in the monitored chat.
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends a text message and returns its platform message id (for later edits).
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<i64>;

    /// Edits an already-sent message in place.
    async fn edit_message(&self, chat_id: i64, message_id: i64, text: &str) -> Result<()>;
}
