//! Telegram handler for the relay: `/start` and `/help` get the greeting, empty input gets a
//! warning, any other text is queued on its conversation.
//!
//! **Data flow:** `Handler::handle` → command / empty check → [`ChatQueues::enqueue`]; returns
//! immediately so the dispatcher never waits on the model.

use async_trait::async_trait;
use std::sync::Arc;
use telegram_bot::{parse_command, Bot, Handler, HandlerResponse, Message, Result};
use tracing::{error, info, instrument};

use crate::conversation::ChatQueues;
use crate::relay::{QueuedTurn, MSG_EMPTY_INPUT};
use crate::welcome::welcome_html;

/// Handler that relays chat messages to the model through per-conversation queues.
pub struct RelayHandler {
    bot: Arc<dyn Bot>,
    queues: Arc<ChatQueues>,
    bot_username: Arc<tokio::sync::RwLock<Option<String>>>,
}

impl RelayHandler {
    pub fn new(
        bot: Arc<dyn Bot>,
        queues: Arc<ChatQueues>,
        bot_username: Arc<tokio::sync::RwLock<Option<String>>>,
    ) -> Self {
        Self {
            bot,
            queues,
            bot_username,
        }
    }

    /// Sends the greeting. Touches no transcript.
    async fn on_start(&self, message: &Message) -> HandlerResponse {
        let text = welcome_html(&message.user);
        if let Err(e) = self.bot.send_html(&message.chat, &text).await {
            error!(error = %e, chat_id = message.chat.id, "Failed to send welcome message");
            return HandlerResponse::Stop;
        }
        HandlerResponse::Reply(text)
    }

    async fn on_empty(&self, message: &Message) -> HandlerResponse {
        if let Err(e) = self.bot.send_message(&message.chat, MSG_EMPTY_INPUT).await {
            error!(error = %e, chat_id = message.chat.id, "Failed to send empty-input warning");
            return HandlerResponse::Stop;
        }
        HandlerResponse::Reply(MSG_EMPTY_INPUT.to_string())
    }
}

#[async_trait]
impl Handler for RelayHandler {
    #[instrument(skip(self, message), fields(chat_id = message.chat.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let text = message.content.trim();

        let bot_username = self.bot_username.read().await.clone();
        if let Some(command) = parse_command(text, bot_username.as_deref()) {
            info!(user_id = message.user.id, command = ?command, "step: greeting");
            return Ok(self.on_start(message).await);
        }

        if text.is_empty() {
            info!(
                user_id = message.user.id,
                message_type = %message.message_type,
                "step: empty input, warning sent"
            );
            return Ok(self.on_empty(message).await);
        }

        self.queues.enqueue(QueuedTurn::new(message.clone(), text));
        Ok(HandlerResponse::Stop)
    }
}
