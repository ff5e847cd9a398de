//! # relay-bot
//!
//! Telegram ↔ LLM conversation relay. Each inbound text joins its conversation's transcript, the
//! model answers with the full transcript as context, markdown markers are stripped from the
//! reply and the result goes back to the originating chat.
//!
//! Built on the `telegram-bot` framework ([`telegram_bot::run_bot`], handler chain) and the
//! `llm-client` crate ([`llm_client::LlmClient`], [`llm_client::ChatSession`]).

pub mod config;
pub mod conversation;
pub mod delivery;
pub mod handler;
pub mod relay;
pub mod sanitize;
pub mod welcome;

pub use config::{ConversationConfig, ConversationScope, RelayConfig, SHARED_CONVERSATION_KEY};
pub use conversation::ChatQueues;
pub use handler::RelayHandler;
pub use relay::{fallback_reply, QueuedTurn, Relay};
pub use sanitize::clean_text;

use anyhow::Result;
use llm_client::{build_llm_client, ChatSession, LlmConfig};
use std::sync::Arc;
use telegram_bot::{run_bot, Handler};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Runs the Telegram relay until the REPL stops, then cancels in-flight model calls.
pub async fn run_relay_bot(config: RelayConfig) -> Result<()> {
    config.validate()?;

    let llm = build_llm_client(&config.llm);
    let request_timeout = config.llm.request_timeout();
    let conversation = config.conversation.clone();
    let summary = config.summary();
    let shutdown = CancellationToken::new();
    let worker_shutdown = shutdown.clone();

    let result = run_bot(config.base, move |components| {
        info!(config = %summary, "Relay configured");
        let relay = Arc::new(Relay::new(
            components.bot.clone(),
            llm,
            request_timeout,
            worker_shutdown,
        ));
        let queues = Arc::new(ChatQueues::new(relay, conversation));
        Arc::new(RelayHandler::new(
            components.bot.clone(),
            queues,
            components.bot_username.clone(),
        )) as Arc<dyn Handler>
    })
    .await;

    shutdown.cancel();
    info!("Relay stopped");
    result
}

/// One-shot prompt: sends `text` to the configured model and returns the sanitized reply.
pub async fn ask(config: &dyn LlmConfig, text: &str) -> Result<String> {
    let text = text.trim();
    if text.is_empty() {
        anyhow::bail!("prompt must not be empty");
    }
    let client = build_llm_client(config);
    let mut session = ChatSession::new();
    let reply = tokio::time::timeout(config.request_timeout(), session.send_turn(client.as_ref(), text))
        .await
        .map_err(|_| llm_client::LlmError::Timeout(config.request_timeout()))??;
    Ok(clean_text(&reply))
}
