//! # LLM client abstraction
//!
//! Defines the [`LlmClient`] trait (one request: history in, completion text out), the
//! stateful [`ChatSession`] built on it, and two implementations: [`GeminiLlmClient`] (native
//! REST API, default) and [`OpenAILlmClient`] (any OpenAI-compatible endpoint).
//!
//! Failures are typed as [`LlmError`] so callers can pick a reply per failure kind.

use async_trait::async_trait;
use prompt::ChatMessage;
use std::sync::Arc;

mod config;
mod error;
mod gemini;
mod openai_llm;
mod session;

pub use config::{
    default_safety_settings, env_parse, safety_settings, EnvLlmConfig, GenerationConfig, HarmCategory,
    LlmConfig, LlmProvider, SafetySetting, SafetyThreshold, DEFAULT_TIMEOUT_SECS,
    GEMINI_DEFAULT_BASE_URL, GEMINI_DEFAULT_MODEL, OPENAI_DEFAULT_BASE_URL, OPENAI_DEFAULT_MODEL,
};
pub use error::LlmError;
pub use gemini::GeminiLlmClient;
pub use openai_llm::OpenAILlmClient;
pub use session::ChatSession;

/// LLM client interface: request a completion for a list of messages (system/user/assistant).
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Returns the model reply text for the given history, last message being the new user turn.
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, LlmError>;
}

/// Builds the client for the configured provider.
pub fn build_llm_client(config: &dyn LlmConfig) -> Arc<dyn LlmClient> {
    match config.provider() {
        LlmProvider::Gemini => Arc::new(GeminiLlmClient::from_config(config)),
        LlmProvider::OpenAi => Arc::new(OpenAILlmClient::from_config(config)),
    }
}

/// Masks an API key/token for safe logging: shows first 7 chars + "***" + last 4 chars.
/// If length <= 11, returns "***" to avoid leaking any part of the key.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 11 {
        return "***".to_string();
    }
    let head: String = chars[..7].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}***{}", head, tail)
}
