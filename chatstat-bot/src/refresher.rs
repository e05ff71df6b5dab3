//! Summary refresher: recomputes the chat summary and keeps one pinned-style message
//! up to date by editing it in place.
//!
//! The message id survives restarts in the meta table, so a restarted bot resumes editing
//! the same message instead of flooding the chat. When the stored message can no longer be
//! edited (deleted by an admin, too old) a fresh one is sent and the pointer is replaced.

use std::sync::Arc;

use aggregation::WindowAggregator;
use anyhow::Result;
use chatstat_core::{Bot, Metric, Scope};
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, TimeZone, Utc};
use storage::{MetaRepository, SubjectRepository};
use tracing::{error, info, warn};

use crate::renderer::{self, ServerSummary, WindowStats};

/// Rows shown in each leaderboard section.
const LEADERBOARD_LIMIT: i64 = 5;

/// Margin after midnight so the refresh lands in the new day even with clock skew.
const MIDNIGHT_MARGIN_SECS: i64 = 5;

pub struct SummaryRefresher {
    gateway: Arc<dyn Bot>,
    aggregator: Arc<WindowAggregator>,
    meta: MetaRepository,
    subjects: SubjectRepository,
    chat_id: i64,
}

impl SummaryRefresher {
    pub fn new(
        gateway: Arc<dyn Bot>,
        aggregator: Arc<WindowAggregator>,
        meta: MetaRepository,
        subjects: SubjectRepository,
        chat_id: i64,
    ) -> Self {
        Self {
            gateway,
            aggregator,
            meta,
            subjects,
            chat_id,
        }
    }

    /// Recomputes the summary as of today and publishes it.
    pub async fn refresh(&self) -> Result<()> {
        let as_of = Utc::now().date_naive();
        let summary = self.build_summary(as_of).await?;

        let mut ids: Vec<i64> = summary
            .top_senders_7d
            .iter()
            .chain(summary.top_senders_30d.iter())
            .map(|e| e.scope_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        let names = self.subjects.display_names(&ids).await?;

        let text = renderer::render_server_summary(&summary, &names);
        self.publish(&text).await
    }

    async fn build_summary(&self, as_of: NaiveDate) -> Result<ServerSummary> {
        let mut windows = [WindowStats::default(); 3];
        for (stats, days) in windows.iter_mut().zip([1u32, 7, 30]) {
            let snapshot = self
                .aggregator
                .compute_snapshot(Scope::Server, self.chat_id, days, as_of)
                .await?;
            stats.messages = snapshot.messages;
            stats.reactions = snapshot.reactions_given;
            stats.active_users = self.aggregator.count_active_users(days, as_of).await?;
        }
        let [last_24h, last_7d, last_30d] = windows;

        let top_senders_7d = self
            .aggregator
            .compute_leaderboard(Metric::MessagesSent, 7, as_of, LEADERBOARD_LIMIT)
            .await?;
        let top_senders_30d = self
            .aggregator
            .compute_leaderboard(Metric::MessagesSent, 30, as_of, LEADERBOARD_LIMIT)
            .await?;

        Ok(ServerSummary {
            as_of,
            last_24h,
            last_7d,
            last_30d,
            top_senders_7d,
            top_senders_30d,
        })
    }

    /// Edits the stored summary message, falling back to sending a new one.
    async fn publish(&self, text: &str) -> Result<()> {
        let record = self.meta.get(self.chat_id).await?;

        let message_id = match record.summary_message_id {
            Some(id) => match self.gateway.edit_message(self.chat_id, id, text).await {
                Ok(()) => id,
                // An unchanged day can produce identical text; that is still a success.
                Err(e) if e.to_string().contains("message is not modified") => id,
                Err(e) => {
                    warn!(
                        chat_id = self.chat_id,
                        message_id = id,
                        error = %e,
                        "Editing summary failed, sending a new message"
                    );
                    self.send_fresh(text).await?
                }
            },
            None => self.send_fresh(text).await?,
        };

        self.meta.mark_refreshed(self.chat_id, Utc::now()).await?;
        info!(chat_id = self.chat_id, message_id, "Summary refreshed");
        Ok(())
    }

    async fn send_fresh(&self, text: &str) -> Result<i64> {
        let id = self.gateway.send_message(self.chat_id, text).await?;
        self.meta.set_summary_message(self.chat_id, id).await?;
        Ok(id)
    }
}

/// Duration until shortly after the next UTC midnight.
pub fn until_next_utc_midnight(now: DateTime<Utc>) -> std::time::Duration {
    let next_day = now.date_naive() + ChronoDuration::days(1);
    let target = next_day
        .and_hms_opt(0, 0, 0)
        .map(|t| Utc.from_utc_datetime(&t) + ChronoDuration::seconds(MIDNIGHT_MARGIN_SECS));
    match target {
        Some(target) => (target - now).to_std().unwrap_or_default(),
        None => std::time::Duration::from_secs(24 * 60 * 60),
    }
}

/// Refreshes once per day right after the day boundary, so the windows roll over visibly.
pub fn spawn_daily_refresh(refresher: Arc<SummaryRefresher>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let delay = until_next_utc_midnight(Utc::now());
            info!(secs = delay.as_secs(), "Next summary refresh scheduled");
            tokio::time::sleep(delay).await;
            if let Err(e) = refresher.refresh().await {
                error!(error = %e, "Scheduled summary refresh failed");
            }
        }
    })
}
