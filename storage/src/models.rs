//! Persistence models: day buckets, leaderboard rows, and the meta record.

use chatstat_core::Metric;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One calendar day's counter for one subject and metric.
///
/// Only non-zero buckets are stored; a missing (day, metric) pair means zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBucket {
    pub day: NaiveDate,
    pub metric: Metric,
    pub count: i64,
}

/// One leaderboard row: a user id and its window total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub scope_id: i64,
    pub total: i64,
}

/// Pointer to the published summary message for a chat, plus its last refresh time.
///
/// Read at startup to decide between editing the existing summary and posting a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaRecord {
    pub chat_id: i64,
    pub summary_message_id: Option<i64>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl MetaRecord {
    /// Empty record for a chat that has never published a summary.
    pub fn empty(chat_id: i64) -> Self {
        Self {
            chat_id,
            summary_message_id: None,
            refreshed_at: None,
        }
    }
}
