//! Ingestion entry points for Telegram updates.
//!
//! Both paths are log-and-continue: a storage fault loses at most the current event and
//! never takes down the dispatcher.

use chatstat_core::RawEvent;
use teloxide::types::{Message, MessageReactionUpdated};
use tracing::{debug, error, warn};

use crate::components::AppContext;

/// Handles a new message: classify, count, and remember the author for later reactions.
pub async fn ingest_message(ctx: &AppContext, msg: &Message) {
    let Some(raw) = chatstat_telegram::message_event(msg) else {
        return;
    };
    let Some(classified) = ctx.classifier.classify(&raw) else {
        debug!(chat_id = msg.chat.id.0, "Message not counted");
        return;
    };

    // Only counted messages are cached; reactions to anything else are out of scope anyway.
    if let RawEvent::MessageCreated {
        chat_id,
        author_id,
        ref author_name,
        message_id,
        ..
    } = raw
    {
        ctx.author_cache.put(chat_id, message_id, author_id);
        if let Some(name) = author_name {
            if let Err(e) = ctx.subjects.upsert_name(author_id, name).await {
                warn!(user_id = author_id, error = %e, "Failed to record display name");
            }
        }
    }

    if let Err(e) = ctx.recorder.record(&classified).await {
        error!(chat_id = msg.chat.id.0, error = %e, "Failed to record message event");
    }
}

/// Handles a reaction update, resolving the message author from the cache.
pub async fn ingest_reaction(ctx: &AppContext, update: &MessageReactionUpdated) {
    let author = ctx
        .author_cache
        .get(update.chat.id.0, i64::from(update.message_id.0));

    let Some(raw) = chatstat_telegram::reaction_event(update, author) else {
        return;
    };
    let Some(classified) = ctx.classifier.classify(&raw) else {
        return;
    };

    if let Err(e) = ctx.recorder.record(&classified).await {
        error!(chat_id = update.chat.id.0, error = %e, "Failed to record reaction event");
    }
}
