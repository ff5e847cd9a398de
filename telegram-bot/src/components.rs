//! Component factory: builds BotComponents from config. Isolates assembly logic from runner.

use crate::config::BaseConfig;
use crate::core::Bot as CoreBot;
use crate::telegram::TelegramBotAdapter;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{error, info, instrument};

/// Transport dependencies shared by the runner and application handlers.
#[derive(Clone)]
pub struct BotComponents {
    pub teloxide_bot: Bot,
    /// Outbound abstraction handed to handlers; wraps `teloxide_bot`.
    pub bot: Arc<dyn CoreBot>,
    /// Filled by the runner from getMe before updates are processed.
    pub bot_username: Arc<tokio::sync::RwLock<Option<String>>>,
}

/// Builds the teloxide bot (with custom API URL when configured) and its core adapter.
#[instrument(skip(config))]
pub fn build_bot_components(config: &BaseConfig) -> BotComponents {
    let teloxide_bot = {
        let bot = Bot::new(config.bot_token.clone());
        if let Some(ref url_str) = config.telegram_api_url {
            match reqwest::Url::parse(url_str) {
                Ok(url) => {
                    info!(url = %url_str, "Using custom Telegram API URL");
                    bot.set_api_url(url)
                }
                Err(e) => {
                    error!(error = %e, url = %url_str, "Invalid TELEGRAM_API_URL, using default");
                    bot
                }
            }
        } else {
            bot
        }
    };

    let bot: Arc<dyn CoreBot> = Arc::new(TelegramBotAdapter::new(teloxide_bot.clone()));

    BotComponents {
        teloxide_bot,
        bot,
        bot_username: Arc::new(tokio::sync::RwLock::new(None)),
    }
}
