//! Bot abstraction for sending messages and chat actions.
//!
//! [`Bot`] trait is transport-agnostic; [`crate::telegram::TelegramBotAdapter`] implements it via teloxide.

use crate::core::error::Result;
use crate::core::types::Chat;
use async_trait::async_trait;

/// Abstraction for outbound traffic. Implementations map to a transport (e.g. Telegram); tests use mocks.
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends a plain-text message (no markup parsing) to the given chat.
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()>;
    /// Sends a message parsed as HTML (bold and link subset). Callers must escape user content.
    async fn send_html(&self, chat: &Chat, html: &str) -> Result<()>;
    /// Shows the "typing" indicator in the chat until the next message or a few seconds pass.
    async fn send_typing(&self, chat: &Chat) -> Result<()>;
}
