//! Stateful conversation over an [`LlmClient`].

use prompt::Transcript;
use tracing::debug;

use crate::{LlmClient, LlmError};

/// A conversation handle: resumes from a [`Transcript`] and sends one turn at a time with the
/// full history as context.
///
/// A turn is committed (user text and reply appended together) only when the client returns a
/// non-empty reply, so a failed or cancelled turn leaves the history untouched.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    history: Transcript,
}

impl ChatSession {
    /// Starts an empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resumes a conversation with the given history.
    pub fn resume(history: Transcript) -> Self {
        Self { history }
    }

    pub fn history(&self) -> &Transcript {
        &self.history
    }

    pub fn into_history(self) -> Transcript {
        self.history
    }

    /// Sends `text` as the next user turn and returns the model's reply.
    pub async fn send_turn(&mut self, client: &dyn LlmClient, text: &str) -> Result<String, LlmError> {
        let messages = self.history.with_pending_user(text);
        debug!(context_len = messages.len(), "ChatSession send_turn");
        let reply = client.complete(messages).await?;
        if reply.trim().is_empty() {
            return Err(LlmError::EmptyCompletion);
        }
        self.history.push_exchange(text, reply.clone());
        Ok(reply)
    }
}
