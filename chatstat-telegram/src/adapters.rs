//! Adapters from Telegram (teloxide) update types to core RawEvent.
//! Depends only on teloxide and chatstat_core type definitions.

use chatstat_core::RawEvent;
use teloxide::types::{Message, MessageReactionUpdated, User};

/// Net effect of a reaction update on the reactor's reaction set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionChange {
    Added,
    Removed,
}

/// Compares reaction list lengths before and after the update.
///
/// Telegram delivers the full old and new reaction sets of one user; a swap (same length)
/// is a net-zero change and produces no event.
pub fn reaction_change(old_len: usize, new_len: usize) -> Option<ReactionChange> {
    match new_len.cmp(&old_len) {
        std::cmp::Ordering::Greater => Some(ReactionChange::Added),
        std::cmp::Ordering::Less => Some(ReactionChange::Removed),
        std::cmp::Ordering::Equal => None,
    }
}

/// Name shown in leaderboards: username when set, otherwise first name.
pub fn display_name(user: &User) -> String {
    user.username
        .clone()
        .unwrap_or_else(|| user.first_name.clone())
}

/// Converts a Telegram message into a core event. Messages without a sender (channel posts,
/// service messages) are not counted.
pub fn message_event(msg: &Message) -> Option<RawEvent> {
    let from = msg.from.as_ref()?;
    Some(RawEvent::MessageCreated {
        chat_id: msg.chat.id.0,
        author_id: from.id.0 as i64,
        author_is_bot: from.is_bot,
        author_name: Some(display_name(from)),
        message_id: i64::from(msg.id.0),
        timestamp: msg.date,
    })
}

/// Converts a Telegram reaction update into a core event.
///
/// Reaction updates do not carry the reacted-to message's author; the caller resolves it
/// from the author cache and passes it in (`None` when the message predates the process or
/// fell out of the cache). Anonymous chat-scoped reactions carry no user and are skipped.
pub fn reaction_event(
    update: &MessageReactionUpdated,
    message_author_id: Option<i64>,
) -> Option<RawEvent> {
    let user = update.user()?;
    let chat_id = update.chat.id.0;
    let reactor_id = user.id.0 as i64;
    let reactor_is_bot = user.is_bot;

    match reaction_change(update.old_reaction.len(), update.new_reaction.len())? {
        ReactionChange::Added => Some(RawEvent::ReactionAdded {
            chat_id,
            reactor_id,
            reactor_is_bot,
            message_author_id,
            timestamp: update.date,
        }),
        ReactionChange::Removed => Some(RawEvent::ReactionRemoved {
            chat_id,
            reactor_id,
            reactor_is_bot,
            message_author_id,
            timestamp: update.date,
        }),
    }
}
