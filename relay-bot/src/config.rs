//! Relay configuration: Telegram base config, LLM config and conversation settings. Loaded from env.

use anyhow::{Context, Result};
use llm_client::{env_parse, mask_token, EnvLlmConfig};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use telegram_bot::{BaseConfig, Chat};

/// Key of the single transcript used in [`ConversationScope::Shared`].
pub const SHARED_CONVERSATION_KEY: &str = "shared";

pub const DEFAULT_IDLE_TTL_SECS: u64 = 3600;

/// Which transcript a message joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversationScope {
    /// One transcript per chat id.
    #[default]
    PerChat,
    /// One transcript for the whole process; every chat sees every other chat's turns.
    Shared,
}

impl ConversationScope {
    /// Conversation key for `chat` under this scope.
    pub fn key_for(&self, chat: &Chat) -> String {
        match self {
            ConversationScope::PerChat => chat.id.to_string(),
            ConversationScope::Shared => SHARED_CONVERSATION_KEY.to_string(),
        }
    }
}

impl FromStr for ConversationScope {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "per_chat" | "chat" => Ok(ConversationScope::PerChat),
            "shared" | "global" => Ok(ConversationScope::Shared),
            other => anyhow::bail!("unknown conversation scope {:?} (expected per_chat or shared)", other),
        }
    }
}

impl fmt::Display for ConversationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversationScope::PerChat => write!(f, "per_chat"),
            ConversationScope::Shared => write!(f, "shared"),
        }
    }
}

/// Transcript lifetime and size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationConfig {
    pub scope: ConversationScope,
    /// Idle time after which a conversation's worker exits and its transcript is dropped; `None` keeps it forever.
    pub idle_ttl: Option<Duration>,
    /// Maximum turns kept per transcript; 0 means unbounded.
    pub max_turns: usize,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            scope: ConversationScope::PerChat,
            idle_ttl: Some(Duration::from_secs(DEFAULT_IDLE_TTL_SECS)),
            max_turns: 0,
        }
    }
}

impl ConversationConfig {
    /// `max_turns` counts messages and the transcript keeps whole exchanges, so a bound must be
    /// an even number of at least 2.
    pub fn validate(&self) -> Result<()> {
        let max = self.max_turns;
        if max != 0 && (max < 2 || max % 2 != 0) {
            anyhow::bail!(
                "CONVERSATION_MAX_TURNS must be 0 (unbounded) or an even number >= 2, got {}",
                max
            );
        }
        Ok(())
    }

    /// Load from CONVERSATION_SCOPE, CONVERSATION_IDLE_TTL_SECS (0 disables eviction) and CONVERSATION_MAX_TURNS.
    pub fn from_env() -> Result<Self> {
        let scope = env_parse("CONVERSATION_SCOPE", ConversationScope::PerChat)?;
        let ttl_secs: u64 = env_parse("CONVERSATION_IDLE_TTL_SECS", DEFAULT_IDLE_TTL_SECS)?;
        let max_turns = env_parse("CONVERSATION_MAX_TURNS", 0usize)?;
        Ok(Self {
            scope,
            idle_ttl: (ttl_secs > 0).then(|| Duration::from_secs(ttl_secs)),
            max_turns,
        })
    }
}

/// Everything the relay needs to run.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub base: BaseConfig,
    pub llm: EnvLlmConfig,
    pub conversation: ConversationConfig,
}

impl RelayConfig {
    /// Load from environment variables. `token` overrides BOT_TOKEN if provided.
    pub fn load(token: Option<String>) -> Result<Self> {
        let base = BaseConfig::load(token)?;
        let llm = EnvLlmConfig::from_env().context("Load LLM config from env")?;
        let conversation = ConversationConfig::from_env().context("Load conversation config from env")?;
        Ok(Self {
            base,
            llm,
            conversation,
        })
    }

    /// Validate all sections; fails fast at startup.
    pub fn validate(&self) -> Result<()> {
        self.base.validate()?;
        self.llm.validate()?;
        self.conversation.validate()?;
        Ok(())
    }

    /// One-line summary for the startup log; secrets are masked.
    pub fn summary(&self) -> String {
        format!(
            "provider={} model={} base_url={} api_key={} scope={} idle_ttl={:?} max_turns={}",
            self.llm.provider,
            self.llm.model,
            self.llm.base_url,
            mask_token(&self.llm.api_key),
            self.conversation.scope,
            self.conversation.idle_ttl,
            self.conversation.max_turns
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    const VARS: &[&str] = &[
        "BOT_TOKEN",
        "TELEGRAM_TOKEN",
        "TELEGRAM_API_URL",
        "TELOXIDE_API_URL",
        "LLM_PROVIDER",
        "GEN_AI_API_KEY",
        "GEMINI_API_KEY",
        "LLM_BASE_URL",
        "MODEL",
        "CONVERSATION_SCOPE",
        "CONVERSATION_IDLE_TTL_SECS",
        "CONVERSATION_MAX_TURNS",
    ];

    fn clear_env() {
        for key in VARS {
            env::remove_var(key);
        }
    }

    #[test]
    fn scope_parses_and_keys_chats() {
        assert_eq!("per_chat".parse::<ConversationScope>().unwrap(), ConversationScope::PerChat);
        assert_eq!("Per-Chat".parse::<ConversationScope>().unwrap(), ConversationScope::PerChat);
        assert_eq!("shared".parse::<ConversationScope>().unwrap(), ConversationScope::Shared);
        assert!("everyone".parse::<ConversationScope>().is_err());

        let chat = Chat {
            id: -42,
            chat_type: "group".to_string(),
        };
        assert_eq!(ConversationScope::PerChat.key_for(&chat), "-42");
        assert_eq!(ConversationScope::Shared.key_for(&chat), SHARED_CONVERSATION_KEY);
    }

    #[test]
    #[serial]
    fn conversation_defaults() {
        clear_env();
        let conv = ConversationConfig::from_env().unwrap();
        assert_eq!(conv, ConversationConfig::default());
        assert_eq!(conv.idle_ttl, Some(Duration::from_secs(3600)));
    }

    #[test]
    #[serial]
    fn conversation_custom_values() {
        clear_env();
        env::set_var("CONVERSATION_SCOPE", "shared");
        env::set_var("CONVERSATION_IDLE_TTL_SECS", "0");
        env::set_var("CONVERSATION_MAX_TURNS", "20");

        let conv = ConversationConfig::from_env().unwrap();

        assert_eq!(conv.scope, ConversationScope::Shared);
        assert_eq!(conv.idle_ttl, None);
        assert_eq!(conv.max_turns, 20);
        clear_env();
    }

    #[test]
    fn max_turns_must_hold_whole_exchanges() {
        let with_max = |max_turns| ConversationConfig {
            max_turns,
            ..ConversationConfig::default()
        };
        assert!(with_max(0).validate().is_ok());
        assert!(with_max(2).validate().is_ok());
        assert!(with_max(20).validate().is_ok());
        assert!(with_max(1).validate().is_err());
        assert!(with_max(3).validate().is_err());
    }

    #[test]
    #[serial]
    fn relay_config_rejects_odd_max_turns() {
        clear_env();
        env::set_var("BOT_TOKEN", "123:abc");
        env::set_var("GEN_AI_API_KEY", "AIzaSyExampleKey0123456789");
        env::set_var("CONVERSATION_MAX_TURNS", "1");

        let config = RelayConfig::load(None).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("CONVERSATION_MAX_TURNS"));

        clear_env();
    }

    #[test]
    #[serial]
    fn invalid_scope_is_error() {
        clear_env();
        env::set_var("CONVERSATION_SCOPE", "room");
        assert!(ConversationConfig::from_env().is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn relay_config_loads_and_masks_key() {
        clear_env();
        env::set_var("TELEGRAM_TOKEN", "123:abc");
        env::set_var("GEN_AI_API_KEY", "AIzaSyExampleKey0123456789");

        let config = RelayConfig::load(None).unwrap();
        config.validate().unwrap();

        assert_eq!(config.base.bot_token, "123:abc");
        let summary = config.summary();
        assert!(summary.contains("provider=gemini"));
        assert!(summary.contains("scope=per_chat"));
        assert!(!summary.contains("AIzaSyExampleKey0123456789"));
        clear_env();
    }

    #[test]
    #[serial]
    fn relay_config_requires_model_key() {
        clear_env();
        env::set_var("BOT_TOKEN", "123:abc");
        assert!(RelayConfig::load(None).is_err());
        clear_env();
    }
}
