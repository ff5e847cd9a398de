//! Bot runner: logging, components, handler chain (LoggingHandler → application handler) and REPL.

use crate::chain::HandlerChain;
use crate::components::{build_bot_components, BotComponents};
use crate::config::BaseConfig;
use crate::core::{init_tracing, Handler};
use crate::handlers::LoggingHandler;
use crate::telegram::run_repl;
use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Builds the handler chain: logging first, then the application handler.
pub fn build_handler_chain(handler: Arc<dyn Handler>) -> HandlerChain {
    HandlerChain::new()
        .add_handler(Arc::new(LoggingHandler))
        .add_handler(handler)
}

/// TelegramBot: config, components, and handler chain. Handler is injected from outside.
pub struct TelegramBot {
    pub config: BaseConfig,
    pub components: BotComponents,
    pub handler_chain: HandlerChain,
}

impl TelegramBot {
    /// Creates a TelegramBot; `make_handler` builds the application handler from the components.
    pub fn new<F>(config: BaseConfig, make_handler: F) -> Result<Self>
    where
        F: FnOnce(&BotComponents) -> Arc<dyn Handler>,
    {
        config.validate()?;
        let components = build_bot_components(&config);
        let handler_chain = build_handler_chain(make_handler(&components));
        Ok(Self {
            config,
            components,
            handler_chain,
        })
    }

    /// Runs the REPL until it stops.
    pub async fn run(self) -> Result<()> {
        run_repl(
            self.components.teloxide_bot,
            self.handler_chain,
            self.components.bot_username,
        )
        .await
    }
}

/// Initializes logging, builds the bot and runs the REPL. Load `.env` before calling.
#[instrument(skip(config, make_handler))]
pub async fn run_bot<F>(config: BaseConfig, make_handler: F) -> Result<()>
where
    F: FnOnce(&BotComponents) -> Arc<dyn Handler>,
{
    init_tracing(&config.log_file)?;
    info!(log_file = %config.log_file, "Initializing bot");

    let bot = TelegramBot::new(config, make_handler).map_err(|e| {
        error!(error = %e, "Failed to initialize bot");
        e
    })?;

    info!("Bot started successfully");
    bot.run().await
}
