//! Bot configuration: BaseConfig (Telegram token, API URL, log file).

mod base;


pub use base::{BaseConfig, DEFAULT_LOG_FILE};
