//! Storage crate: day-bucket persistence and meta/subject repositories.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`models`] – DayBucket, LeaderboardEntry, MetaRecord
//! - [`bucket_repo`] – BucketRepository (SQLite day buckets)
//! - [`meta_repo`] – MetaRepository (summary message pointer)
//! - [`subject_repo`] – SubjectRepository (display names)
//! - [`sqlite_pool`] – SqlitePoolManager

mod bucket_repo;
mod error;
mod meta_repo;
mod models;
mod sqlite_pool;
mod subject_repo;


pub use bucket_repo::BucketRepository;
pub use error::StorageError;
pub use meta_repo::MetaRepository;
pub use models::{DayBucket, LeaderboardEntry, MetaRecord};
pub use sqlite_pool::SqlitePoolManager;
pub use subject_repo::SubjectRepository;
