//! # aggregation
//!
//! The counting core: [`EventClassifier`] turns raw platform events into classified counter
//! updates, [`StatsRecorder`] applies them to the day-bucket store with retry and per-event
//! isolation, and [`WindowAggregator`] folds stored buckets into rolling-window snapshots and
//! leaderboards. Everything here is transport-free and reads/writes only through the storage
//! crate.

mod classifier;
mod recorder;
mod window;

pub use classifier::EventClassifier;
pub use recorder::StatsRecorder;
pub use window::{StatsSnapshot, WindowAggregator};
