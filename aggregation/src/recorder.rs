//! Counter mutator: applies classified events to the day-bucket store.
//!
//! The sole write path into storage. Each increment retries transient faults a few times,
//! then is logged as lost; failures never abort the remaining increments of the event, and
//! the ingestion loop treats a returned error as log-and-continue, so one bad event cannot
//! stall the stream.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chatstat_core::{floor_to_day, ClassifiedEvent, Scope};
use storage::{BucketRepository, StorageError};
use tracing::{error, warn};

/// Retry budget for one increment against a transiently unavailable store.
const UPSERT_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(100);

pub struct StatsRecorder {
    store: Arc<BucketRepository>,
}

impl StatsRecorder {
    pub fn new(store: Arc<BucketRepository>) -> Self {
        Self { store }
    }

    /// Applies every counter update of a classified event for the event's calendar day, then
    /// marks each user subject active when the event is a qualifying (positive-delta) one.
    ///
    /// All updates are attempted even when one fails; the first error is returned after the
    /// rest have been applied, so callers see the fault without losing unrelated increments.
    /// Redelivered events are counted again; that drift is accepted for informational stats.
    pub async fn record(&self, event: &ClassifiedEvent) -> Result<(), StorageError> {
        let day = floor_to_day(event.timestamp);
        let mut first_err: Option<StorageError> = None;

        for update in &event.updates {
            let subject = update.subject;
            let metric = update.metric;
            let result = self
                .with_retry("bucket increment", || {
                    self.store
                        .upsert_delta(subject.scope, subject.id, day, metric, event.delta)
                })
                .await;
            if let Err(e) = result {
                error!(
                    scope = subject.scope.as_str(),
                    scope_id = subject.id,
                    day = %day,
                    metric = metric.as_str(),
                    delta = event.delta,
                    error = %e,
                    "Lost increment after exhausting retries"
                );
                first_err.get_or_insert(e);
            }
        }

        if event.delta > 0 {
            let mut marked: Vec<i64> = Vec::new();
            for update in &event.updates {
                let subject = update.subject;
                if subject.scope != Scope::User || marked.contains(&subject.id) {
                    continue;
                }
                marked.push(subject.id);
                let result = self
                    .with_retry("active flag", || {
                        self.store.mark_active(subject.scope, subject.id, day)
                    })
                    .await;
                if let Err(e) = result {
                    error!(
                        scope_id = subject.id,
                        day = %day,
                        error = %e,
                        "Lost active flag after exhausting retries"
                    );
                    first_err.get_or_insert(e);
                }
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn with_retry<F, Fut>(&self, what: &str, op: F) -> Result<(), StorageError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<(), StorageError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match op().await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_retryable() && attempt + 1 < UPSERT_ATTEMPTS => {
                    attempt += 1;
                    warn!(what, attempt, error = %e, "Retrying after transient storage fault");
                    tokio::time::sleep(RETRY_BASE_DELAY * attempt).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
