//! REPL runner: converts teloxide messages to core::Message and passes them to HandlerChain. Calls get_me first to populate bot_username.

use crate::chain::HandlerChain;
use crate::core::ToCoreMessage;
use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{error, info, instrument, warn};

use super::adapters::TelegramMessageWrapper;

/// Starts the REPL with the given teloxide Bot, HandlerChain, and bot_username cache.
///
/// The chain runs inline for each update. teloxide delivers updates of one chat one after
/// another, so handlers observe a chat's messages in arrival order; handlers that do slow work
/// must hand it off (e.g. to a per-chat queue) instead of awaiting it here. Returns when the
/// REPL stops (Ctrl-C).
#[instrument(skip(bot, handler_chain, bot_username))]
pub async fn run_repl(
    bot: teloxide::Bot,
    handler_chain: HandlerChain,
    bot_username: Arc<tokio::sync::RwLock<Option<String>>>,
) -> Result<()> {
    match bot.get_me().await {
        Ok(me) => {
            if let Some(username) = &me.user.username {
                *bot_username.write().await = Some(username.clone());
                info!(username = %username, "Bot username set before repl");
            }
        }
        Err(e) => warn!(error = %e, "get_me failed; commands addressed to a bot are accepted"),
    }

    let chain = handler_chain;
    teloxide::repl(bot, move |_bot: Bot, msg: teloxide::types::Message| {
        let chain = chain.clone();
        async move {
            let core_msg = TelegramMessageWrapper(&msg).to_core();
            if let Err(e) = chain.handle(&core_msg).await {
                error!(
                    error = %e,
                    user_id = core_msg.user.id,
                    chat_id = core_msg.chat.id,
                    "Handler chain failed"
                );
            }
            respond(())
        }
    })
    .await;

    info!("REPL stopped");
    Ok(())
}
