//! Plain-text rendering of the summary message and per-user stats replies.
//!
//! Pure functions over already-computed numbers, kept separate from the refresher so the
//! format can be tested without a database or a live bot.

use std::collections::HashMap;

use aggregation::StatsSnapshot;
use chrono::NaiveDate;
use storage::LeaderboardEntry;

/// One window row of the chat summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowStats {
    pub messages: i64,
    pub reactions: i64,
    pub active_users: i64,
}

/// Everything the summary message shows, computed for a single `as_of` day.
#[derive(Debug, Clone)]
pub struct ServerSummary {
    pub as_of: NaiveDate,
    pub last_24h: WindowStats,
    pub last_7d: WindowStats,
    pub last_30d: WindowStats,
    pub top_senders_7d: Vec<LeaderboardEntry>,
    pub top_senders_30d: Vec<LeaderboardEntry>,
}

/// Renders the public summary message. Users missing from `names` show as `user <id>`.
pub fn render_server_summary(summary: &ServerSummary, names: &HashMap<i64, String>) -> String {
    let mut out = String::new();

    out.push_str(&format!("📊 Chat activity — {}\n\n", summary.as_of));
    out.push_str(&window_line("Last 24h", &summary.last_24h));
    out.push_str(&window_line("Last 7d", &summary.last_7d));
    out.push_str(&window_line("Last 30d", &summary.last_30d));

    out.push_str("\nTop senders (7d):\n");
    out.push_str(&leaderboard_lines(&summary.top_senders_7d, names));
    out.push_str("\nTop senders (30d):\n");
    out.push_str(&leaderboard_lines(&summary.top_senders_30d, names));

    out.push_str("\nCounting since the bot joined this chat.");
    out
}

fn window_line(label: &str, stats: &WindowStats) -> String {
    format!(
        "{}: {} messages · {} reactions · {} active users\n",
        label, stats.messages, stats.reactions, stats.active_users
    )
}

fn leaderboard_lines(entries: &[LeaderboardEntry], names: &HashMap<i64, String>) -> String {
    if entries.is_empty() {
        return "no messages yet\n".to_string();
    }
    let mut out = String::new();
    for (rank, entry) in entries.iter().enumerate() {
        let name = names
            .get(&entry.scope_id)
            .cloned()
            .unwrap_or_else(|| format!("user {}", entry.scope_id));
        out.push_str(&format!("{}. {}: {} messages\n", rank + 1, name, entry.total));
    }
    out
}

/// Renders the /mystats reply for one user.
pub fn render_user_stats(name: &str, last_7d: &StatsSnapshot, last_30d: &StatsSnapshot) -> String {
    format!(
        "📈 Stats for {}\n\n\
         Messages: {} (7d) · {} (30d)\n\
         Reactions given: {} (7d) · {} (30d)\n\
         Reactions received: {} (7d) · {} (30d)\n\
         Active days: {} of last 7 · {} of last 30",
        name,
        last_7d.messages,
        last_30d.messages,
        last_7d.reactions_given,
        last_30d.reactions_given,
        last_7d.reactions_received,
        last_30d.reactions_received,
        last_7d.active_days,
        last_30d.active_days,
    )
}
