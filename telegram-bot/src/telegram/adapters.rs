//! Conversions from teloxide types to core [`User`] / [`Message`].

use crate::core::{Chat, Message, MessageDirection, ToCoreMessage, ToCoreUser, User};

/// Converts a Telegram user to a core user.
pub struct TelegramUserWrapper<'a>(pub &'a teloxide::types::User);

impl ToCoreUser for TelegramUserWrapper<'_> {
    fn to_core(&self) -> User {
        User {
            id: self.0.id.0 as i64,
            username: self.0.username.clone(),
            first_name: Some(self.0.first_name.clone()),
            last_name: self.0.last_name.clone(),
        }
    }
}

/// Converts a Telegram message to a core message. Non-text messages get empty content and
/// message_type `"other"`.
pub struct TelegramMessageWrapper<'a>(pub &'a teloxide::types::Message);

impl TelegramMessageWrapper<'_> {
    fn chat_type(&self) -> &'static str {
        let chat = &self.0.chat;
        if chat.is_private() {
            "private"
        } else if chat.is_supergroup() {
            "supergroup"
        } else if chat.is_group() {
            "group"
        } else if chat.is_channel() {
            "channel"
        } else {
            "unknown"
        }
    }
}

impl ToCoreMessage for TelegramMessageWrapper<'_> {
    fn to_core(&self) -> Message {
        let text = self.0.text();
        Message {
            id: self.0.id.to_string(),
            user: self
                .0
                .from
                .as_ref()
                .map(|u| TelegramUserWrapper(u).to_core())
                .unwrap_or(User {
                    id: 0,
                    username: None,
                    first_name: None,
                    last_name: None,
                }),
            chat: Chat {
                id: self.0.chat.id.0,
                chat_type: self.chat_type().to_string(),
            },
            content: text.unwrap_or("").to_string(),
            message_type: if text.is_some() { "text" } else { "other" }.to_string(),
            direction: MessageDirection::Incoming,
            created_at: self.0.date,
        }
    }
}
