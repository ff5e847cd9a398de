//! # telegram-bot
//!
//! Telegram bot framework: transport-agnostic core (message types, [`Handler`], [`Bot`]), the
//! [`HandlerChain`], teloxide adapters, env config and the REPL runner. Applications supply a
//! handler via [`run_bot`].

pub mod chain;
pub mod command;
pub mod components;
pub mod config;
pub mod core;
pub mod handlers;
pub mod runner;
pub mod telegram;

pub use chain::HandlerChain;
pub use command::{parse_command, Command};
pub use components::{build_bot_components, BotComponents};
pub use config::BaseConfig;
pub use core::{
    init_console_tracing, init_tracing, Bot, BotError, Chat, Handler, HandlerResponse, Message, MessageDirection,
    Result, ToCoreMessage, ToCoreUser, User,
};
pub use handlers::LoggingHandler;
pub use runner::{build_handler_chain, run_bot, TelegramBot};
pub use telegram::{run_repl, TelegramBotAdapter, TelegramMessageWrapper, TelegramUserWrapper};
