//! # chatstat-bot
//!
//! Application crate for the chat statistics bot: env configuration, component assembly,
//! event ingestion wiring, summary rendering and refresh, the command surface, and the
//! dispatcher runner. The counting core lives in the `aggregation` crate; this crate only
//! connects it to Telegram.

pub mod cli;
pub mod collector;
pub mod commands;
pub mod components;
pub mod config;
pub mod refresher;
pub mod renderer;
pub mod runner;

pub use cli::{load_config, Cli, Commands};
pub use components::{build_context, AppContext};
pub use config::BotConfig;
pub use runner::run_bot;
