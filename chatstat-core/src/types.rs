//! Core types: scope, metric, subject, raw and classified events, day helpers.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Day-key format used for bucket storage (UTC calendar day).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Whether a counter belongs to the whole monitored chat or to a single user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    Server,
    User,
}

impl Scope {
    /// Stable string used as the storage key component.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Server => "server",
            Scope::User => "user",
        }
    }

    pub fn parse(s: &str) -> Option<Scope> {
        match s {
            "server" => Some(Scope::Server),
            "user" => Some(Scope::User),
            _ => None,
        }
    }
}

/// Counter kinds kept in day buckets.
///
/// `ActiveDay` is a presence marker, not an additive counter: it is set to 1 the first time a
/// subject produces a qualifying event on a day and stays 1 on redelivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    MessagesSent,
    ReactionsGiven,
    ReactionsReceived,
    ActiveDay,
}

impl Metric {
    /// Stable string used as the storage key component.
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::MessagesSent => "messages",
            Metric::ReactionsGiven => "reactions_given",
            Metric::ReactionsReceived => "reactions_received",
            Metric::ActiveDay => "active",
        }
    }

    pub fn parse(s: &str) -> Option<Metric> {
        match s {
            "messages" => Some(Metric::MessagesSent),
            "reactions_given" => Some(Metric::ReactionsGiven),
            "reactions_received" => Some(Metric::ReactionsReceived),
            "active" => Some(Metric::ActiveDay),
            _ => None,
        }
    }
}

/// A counted entity: the monitored chat itself or one of its users.
///
/// Subjects have no independent lifecycle; they exist from the first event that references them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subject {
    pub scope: Scope,
    pub id: i64,
}

impl Subject {
    pub fn server(id: i64) -> Self {
        Self {
            scope: Scope::Server,
            id,
        }
    }

    pub fn user(id: i64) -> Self {
        Self {
            scope: Scope::User,
            id,
        }
    }
}

/// Inbound platform event, already stripped down to the fields the classifier needs.
///
/// The Telegram layer converts transport types into this shape; nothing below the adapters
/// depends on the upstream event schema. `message_author_id` on reaction events is resolved
/// from the author cache and may be absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RawEvent {
    MessageCreated {
        chat_id: i64,
        author_id: i64,
        author_is_bot: bool,
        author_name: Option<String>,
        message_id: i64,
        timestamp: DateTime<Utc>,
    },
    ReactionAdded {
        chat_id: i64,
        reactor_id: i64,
        reactor_is_bot: bool,
        message_author_id: Option<i64>,
        timestamp: DateTime<Utc>,
    },
    ReactionRemoved {
        chat_id: i64,
        reactor_id: i64,
        reactor_is_bot: bool,
        message_author_id: Option<i64>,
        timestamp: DateTime<Utc>,
    },
}

/// One (subject, metric) pair touched by a classified event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterUpdate {
    pub subject: Subject,
    pub metric: Metric,
}

/// Uniform internal representation of an inbound event after subject and metric resolution.
///
/// `delta` applies to every update (+1 for created events, -1 for reaction removal). The
/// recorder derives the day bucket from `timestamp` and marks user subjects active when
/// `delta` is positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedEvent {
    pub updates: Vec<CounterUpdate>,
    pub delta: i64,
    pub timestamp: DateTime<Utc>,
}

/// Truncates a timestamp to its UTC calendar day.
pub fn floor_to_day(ts: DateTime<Utc>) -> NaiveDate {
    ts.date_naive()
}

/// Day key (`YYYY-MM-DD`) for a timestamp.
pub fn day_key(ts: DateTime<Utc>) -> String {
    floor_to_day(ts).format(DATE_FORMAT).to_string()
}

/// First day of the inclusive window `[as_of - (days - 1), as_of]`.
///
/// `window_days` below 1 is treated as 1, so "last 24h" is exactly today's bucket.
pub fn window_start(as_of: NaiveDate, window_days: u32) -> NaiveDate {
    as_of - Duration::days(i64::from(window_days.max(1)) - 1)
}
