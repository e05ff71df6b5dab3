//! Bot command surface: /mystats and /refreshstats.

use std::sync::Arc;

use chatstat_core::Scope;
use chrono::Utc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{error, info};

use crate::collector;
use crate::components::AppContext;
use crate::renderer;

#[derive(BotCommands, Clone)]
#[command(
    rename_rule = "lowercase",
    description = "Chat statistics commands:"
)]
pub enum Command {
    #[command(description = "show your activity over the last 7 and 30 days.")]
    MyStats,
    #[command(description = "rebuild the summary message now (admins only).")]
    RefreshStats,
}

pub async fn handle_command(
    msg: Message,
    cmd: Command,
    ctx: Arc<AppContext>,
) -> ResponseResult<()> {
    // A command is still a message someone sent; count it like any other.
    collector::ingest_message(&ctx, &msg).await;

    let Some(from) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = from.id.0 as i64;
    let chat_id = msg.chat.id.0;

    match cmd {
        Command::MyStats => {
            let as_of = Utc::now().date_naive();
            let seven = ctx
                .aggregator
                .compute_snapshot(Scope::User, user_id, 7, as_of)
                .await;
            let thirty = ctx
                .aggregator
                .compute_snapshot(Scope::User, user_id, 30, as_of)
                .await;

            let text = match (seven, thirty) {
                (Ok(seven), Ok(thirty)) => {
                    let name = chatstat_telegram::display_name(from);
                    renderer::render_user_stats(&name, &seven, &thirty)
                }
                (Err(e), _) | (_, Err(e)) => {
                    error!(user_id, error = %e, "Failed to compute user stats");
                    "Stats are unavailable right now, try again later.".to_string()
                }
            };
            reply(&ctx, chat_id, &text).await;
        }
        Command::RefreshStats => {
            if !ctx.config.is_admin(user_id) {
                reply(&ctx, chat_id, "Only admins can refresh the summary.").await;
                return Ok(());
            }
            info!(user_id, "Manual summary refresh requested");
            match ctx.refresher.refresh().await {
                Ok(()) => reply(&ctx, chat_id, "Summary refreshed.").await,
                Err(e) => {
                    error!(error = %e, "Manual summary refresh failed");
                    reply(&ctx, chat_id, "Failed to refresh the summary.").await;
                }
            }
        }
    }

    Ok(())
}

async fn reply(ctx: &AppContext, chat_id: i64, text: &str) {
    if let Err(e) = ctx.gateway.send_message(chat_id, text).await {
        error!(chat_id, error = %e, "Failed to send command reply");
    }
}
