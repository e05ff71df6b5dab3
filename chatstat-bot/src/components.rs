//! Component assembly: builds every long-lived object from config and wires them together.

use std::sync::Arc;

use aggregation::{EventClassifier, StatsRecorder, WindowAggregator};
use anyhow::Result;
use chatstat_core::Bot;
use chatstat_telegram::MessageAuthorCache;
use storage::{BucketRepository, MetaRepository, SqlitePoolManager, SubjectRepository};
use tracing::info;

use crate::config::BotConfig;
use crate::refresher::SummaryRefresher;

/// Counted messages to remember for reaction author lookup.
const AUTHOR_CACHE_CAPACITY: usize = 5000;

/// Shared application state handed to every dispatcher endpoint.
pub struct AppContext {
    pub config: BotConfig,
    pub gateway: Arc<dyn Bot>,
    pub classifier: EventClassifier,
    pub recorder: StatsRecorder,
    pub aggregator: Arc<WindowAggregator>,
    pub subjects: SubjectRepository,
    pub author_cache: MessageAuthorCache,
    pub refresher: Arc<SummaryRefresher>,
}

/// Opens the database, initializes the repositories and builds the shared context.
pub async fn build_context(config: BotConfig, gateway: Arc<dyn Bot>) -> Result<Arc<AppContext>> {
    info!(database_url = %config.database_url, "Initializing storage");
    let pool = SqlitePoolManager::new(&config.database_url).await?;

    let buckets = Arc::new(BucketRepository::new(pool.clone()).await?);
    let meta = MetaRepository::new(pool.clone()).await?;
    let subjects = SubjectRepository::new(pool).await?;

    let aggregator = Arc::new(WindowAggregator::new(Arc::clone(&buckets)));
    let recorder = StatsRecorder::new(Arc::clone(&buckets));
    let classifier = EventClassifier::new(Some(config.stats_chat_id));

    let refresher = Arc::new(SummaryRefresher::new(
        Arc::clone(&gateway),
        Arc::clone(&aggregator),
        meta,
        subjects.clone(),
        config.stats_chat_id,
    ));

    Ok(Arc::new(AppContext {
        config,
        gateway,
        classifier,
        recorder,
        aggregator,
        subjects,
        author_cache: MessageAuthorCache::new(AUTHOR_CACHE_CAPACITY),
        refresher,
    }))
}
