//! Message and direction types for the core model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{chat::Chat, user::User};

/// Direction of the message (from user or from bot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageDirection {
    Incoming,
    Outgoing,
}

/// A single inbound message: sender, chat and raw text. `content` is empty for non-text messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub user: User,
    pub chat: Chat,
    pub content: String,
    /// `"text"` for text messages, `"other"` for stickers, photos, etc.
    pub message_type: String,
    pub direction: MessageDirection,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Builds an incoming text message; used by adapters and tests.
    pub fn incoming_text(id: impl Into<String>, user: User, chat: Chat, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user,
            chat,
            content: content.into(),
            message_type: "text".to_string(),
            direction: MessageDirection::Incoming,
            created_at: Utc::now(),
        }
    }
}
