//! Base config: Telegram Bot connection and logging. Loaded from env.

use anyhow::{Context, Result};
use std::env;

/// Default log file when `LOG_FILE` is not set.
pub const DEFAULT_LOG_FILE: &str = "logs/relay-bot.log";

/// Base config: Telegram-related and logging only.
#[derive(Debug, Clone)]
pub struct BaseConfig {
    /// BOT_TOKEN or TELEGRAM_TOKEN
    pub bot_token: String,
    /// TELEGRAM_API_URL or TELOXIDE_API_URL
    pub telegram_api_url: Option<String>,
    /// Log file path
    pub log_file: String,
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl BaseConfig {
    /// Load from environment variables. `token` overrides BOT_TOKEN / TELEGRAM_TOKEN if provided.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = token
            .filter(|t| !t.trim().is_empty())
            .or_else(|| non_empty_var("BOT_TOKEN"))
            .or_else(|| non_empty_var("TELEGRAM_TOKEN"))
            .context("BOT_TOKEN (or TELEGRAM_TOKEN) not set")?;
        let log_file = non_empty_var("LOG_FILE").unwrap_or_else(|| DEFAULT_LOG_FILE.to_string());
        let telegram_api_url =
            non_empty_var("TELEGRAM_API_URL").or_else(|| non_empty_var("TELOXIDE_API_URL"));

        Ok(Self {
            bot_token,
            telegram_api_url,
            log_file,
        })
    }

    /// Validate config (e.g. telegram_api_url must be valid URL if set).
    pub fn validate(&self) -> Result<()> {
        if self.bot_token.contains(char::is_whitespace) {
            anyhow::bail!("BOT_TOKEN must not contain whitespace");
        }
        if let Some(ref url_str) = self.telegram_api_url {
            if reqwest::Url::parse(url_str).is_err() {
                anyhow::bail!(
                    "TELEGRAM_API_URL (or TELOXIDE_API_URL) is set but not a valid URL: {}",
                    url_str
                );
            }
        }
        Ok(())
    }
}
