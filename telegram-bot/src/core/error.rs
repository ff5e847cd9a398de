//! Error types for the bot core.
//!
//! [`BotError`] covers transport, handler, config and IO failures of the framework.

use thiserror::Error;

/// Top-level error for the bot framework (transport, handler, config, IO).
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Bot error: {0}")]
    Bot(String),

    #[error("Handler error: {0}")]
    Handler(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for core operations; uses [`BotError`].
pub type Result<T> = std::result::Result<T, BotError>;
