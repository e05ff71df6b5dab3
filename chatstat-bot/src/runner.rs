//! Dispatcher runner: logging, component assembly, startup refresh, the daily refresh
//! task, and the teloxide dispatch loop.

use std::sync::Arc;

use anyhow::{Context, Result};
use chatstat_core::{init_tracing, Bot as CoreBot};
use chatstat_telegram::{build_bot, TelegramGateway};
use teloxide::update_listeners::Polling;
use teloxide::prelude::*;
use teloxide::types::{AllowedUpdate, MessageReactionUpdated};
use tracing::{error, info};

use crate::collector;
use crate::commands::{handle_command, Command};
use crate::components::{build_context, AppContext};
use crate::config::BotConfig;
use crate::refresher::spawn_daily_refresh;

pub async fn run_bot(config: BotConfig) -> Result<()> {
    if let Some(parent) = std::path::Path::new(&config.log_file).parent() {
        std::fs::create_dir_all(parent).context("Failed to create log directory")?;
    }
    init_tracing(&config.log_file)?;

    info!(chat_id = config.stats_chat_id, "Starting chatstat bot");

    let bot = build_bot(&config.bot_token, config.api_url.as_deref())?;
    let gateway: Arc<dyn CoreBot> = Arc::new(TelegramGateway::new(bot.clone()));
    let ctx = build_context(config, gateway).await?;

    match bot.get_me().await {
        Ok(me) => info!(username = ?me.user.username, "Bot identity confirmed"),
        Err(e) => error!(error = %e, "get_me failed, check the token"),
    }

    // Publish or resume the summary right away, then keep it fresh across day boundaries.
    if let Err(e) = ctx.refresher.refresh().await {
        error!(error = %e, "Startup summary refresh failed");
    }
    let _daily = spawn_daily_refresh(Arc::clone(&ctx.refresher));

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(Update::filter_message().endpoint(handle_message))
        .branch(Update::filter_message_reaction_updated().endpoint(handle_reaction));

    // Reaction updates are not delivered unless explicitly requested.
    let listener = Polling::builder(bot.clone())
        .allowed_updates(vec![AllowedUpdate::Message, AllowedUpdate::MessageReaction])
        .build();

    info!("Bot started successfully");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![ctx])
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    Ok(())
}

async fn handle_message(msg: Message, ctx: Arc<AppContext>) -> ResponseResult<()> {
    collector::ingest_message(&ctx, &msg).await;
    Ok(())
}

async fn handle_reaction(
    update: MessageReactionUpdated,
    ctx: Arc<AppContext>,
) -> ResponseResult<()> {
    collector::ingest_reaction(&ctx, &update).await;
    Ok(())
}
