//! One relay turn: typing indicator, model call under timeout and cancellation, sanitize, deliver.
//!
//! Failures never escape a turn: model errors are logged and answered with a fallback reply per
//! [`LlmError`] kind, delivery errors are logged.

use llm_client::{ChatSession, LlmClient, LlmError};
use std::sync::Arc;
use std::time::Duration;
use telegram_bot::{Bot, Chat, Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::delivery::{split_message, MAX_MESSAGE_LENGTH};
use crate::sanitize::clean_text;

// ---------- User-facing messages (shown in Telegram) ----------
pub const MSG_EMPTY_INPUT: &str = "⚠️ Please send a non-empty message.";
pub const MSG_TIMEOUT: &str = "Sorry, the model took too long to answer. Please try again.";
pub const MSG_RATE_LIMITED: &str = "Too many requests right now. Please wait a moment and try again.";
pub const MSG_SAFETY_BLOCKED: &str = "Sorry, I can't respond to that message.";
pub const MSG_EMPTY_COMPLETION: &str =
    "Sorry, I couldn't come up with a reply. Please rephrase your message.";
pub const MSG_PROCESSING_FAILED: &str =
    "Sorry, something went wrong processing your request. Please try again later.";

/// One queued user turn: the inbound message and its trimmed text.
#[derive(Debug, Clone)]
pub struct QueuedTurn {
    pub message: Message,
    pub text: String,
}

impl QueuedTurn {
    pub fn new(message: Message, text: impl Into<String>) -> Self {
        Self {
            message,
            text: text.into(),
        }
    }

    pub fn chat(&self) -> &Chat {
        &self.message.chat
    }
}

/// Fallback reply for a failed model call; `None` means send nothing (shutdown).
pub fn fallback_reply(err: &LlmError) -> Option<&'static str> {
    match err {
        LlmError::Cancelled => None,
        LlmError::Timeout(_) => Some(MSG_TIMEOUT),
        LlmError::RateLimited(_) => Some(MSG_RATE_LIMITED),
        LlmError::SafetyBlocked(_) => Some(MSG_SAFETY_BLOCKED),
        LlmError::EmptyCompletion => Some(MSG_EMPTY_COMPLETION),
        LlmError::Api { .. } | LlmError::Transport(_) | LlmError::InvalidRequest(_) => {
            Some(MSG_PROCESSING_FAILED)
        }
    }
}

/// Logs the model error with its kind; client-side problems at error level, throttling and
/// filtering at warn.
fn log_llm_error(err: &LlmError, turn: &QueuedTurn, conversation_key: &str) {
    let chat_id = turn.chat().id;
    let user_id = turn.message.user.id;
    match err {
        LlmError::Cancelled => info!(chat_id, conversation_key, "Turn cancelled by shutdown"),
        LlmError::RateLimited(_) | LlmError::SafetyBlocked(_) | LlmError::EmptyCompletion => warn!(
            chat_id,
            user_id,
            conversation_key,
            kind = err.kind(),
            error = %err,
            "Model call did not produce a reply"
        ),
        _ => error!(
            chat_id,
            user_id,
            conversation_key,
            kind = err.kind(),
            error = %err,
            "Model call failed"
        ),
    }
}

/// Processes turns against a model client and delivers replies through a [`Bot`].
pub struct Relay {
    bot: Arc<dyn Bot>,
    llm: Arc<dyn LlmClient>,
    request_timeout: Duration,
    shutdown: CancellationToken,
}

impl Relay {
    pub fn new(
        bot: Arc<dyn Bot>,
        llm: Arc<dyn LlmClient>,
        request_timeout: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            bot,
            llm,
            request_timeout,
            shutdown,
        }
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// Runs one model call on `session`. The call is bounded by the request timeout and is
    /// dropped (committing nothing) when the shutdown token fires.
    async fn complete_turn(&self, session: &mut ChatSession, text: &str) -> Result<String, LlmError> {
        let cancel = self.shutdown.child_token();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(LlmError::Cancelled),
            result = tokio::time::timeout(self.request_timeout, session.send_turn(self.llm.as_ref(), text)) => {
                result.unwrap_or(Err(LlmError::Timeout(self.request_timeout)))
            }
        }
    }

    /// Handles one turn end to end. Returns the text delivered, or `None` when nothing was sent.
    #[instrument(skip(self, session, turn), fields(chat_id = turn.chat().id))]
    pub async fn process_turn(
        &self,
        session: &mut ChatSession,
        turn: &QueuedTurn,
        conversation_key: &str,
    ) -> Option<String> {
        let chat = turn.chat();

        if let Err(e) = self.bot.send_typing(chat).await {
            warn!(error = %e, chat_id = chat.id, "Failed to send typing indicator");
        }

        info!(
            user_id = turn.message.user.id,
            conversation_key,
            history_len = session.history().len(),
            text_len = turn.text.chars().count(),
            "step: model call"
        );
        let reply = match self.complete_turn(session, &turn.text).await {
            Ok(raw) => {
                let clean = clean_text(&raw);
                if clean.trim().is_empty() {
                    log_llm_error(&LlmError::EmptyCompletion, turn, conversation_key);
                    MSG_EMPTY_COMPLETION.to_string()
                } else {
                    debug!(reply_len = clean.chars().count(), "step: model replied");
                    clean
                }
            }
            Err(e) => {
                log_llm_error(&e, turn, conversation_key);
                fallback_reply(&e)?.to_string()
            }
        };

        self.deliver(chat, &reply).await;
        Some(reply)
    }

    /// Sends `text` in order as one or more chunks; stops at the first failed chunk.
    async fn deliver(&self, chat: &Chat, text: &str) {
        let chunks = split_message(text, MAX_MESSAGE_LENGTH);
        let total = chunks.len();
        for (i, chunk) in chunks.iter().enumerate() {
            if let Err(e) = self.bot.send_message(chat, chunk).await {
                error!(error = %e, chat_id = chat.id, chunk = i + 1, total, "Failed to send reply");
                return;
            }
        }
        debug!(chat_id = chat.id, chunks = total, "step: reply delivered");
    }
}
