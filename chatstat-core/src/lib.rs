//! # chatstat-core
//!
//! Core types and traits for the chat statistics bot: scopes, metrics, [`RawEvent`] and
//! [`ClassifiedEvent`], the outbound [`Bot`] gateway trait, calendar-day helpers, error types,
//! and tracing initialization. Transport-agnostic; used by storage, aggregation, and the
//! Telegram layer.

pub mod bot;
pub mod error;
pub mod logger;
pub mod types;

pub use bot::Bot;
pub use error::{ChatstatError, Result};
pub use logger::init_tracing;
pub use types::{
    day_key, floor_to_day, window_start, ClassifiedEvent, CounterUpdate, Metric, RawEvent, Scope,
    Subject, DATE_FORMAT,
};
