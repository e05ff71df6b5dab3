//! # chatstat-telegram
//!
//! Telegram collaborator layer: adapters from teloxide update types to core [`chatstat_core::RawEvent`],
//! the [`chatstat_core::Bot`] gateway implementation, and the message-author cache used to
//! attribute reactions. Only Telegram connectivity lives here; counting and storage know
//! nothing about the transport.

mod adapters;
mod author_cache;
mod bot_adapter;

pub use adapters::{display_name, message_event, reaction_change, reaction_event, ReactionChange};
pub use author_cache::MessageAuthorCache;
pub use bot_adapter::{build_bot, TelegramGateway};
