//! Handler that logs each inbound message and the chain outcome.

use crate::core::{Handler, HandlerResponse, Message, Result};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

/// Logs each message in before() and the response in after(); always continues.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHandler;

#[async_trait]
impl Handler for LoggingHandler {
    #[instrument(skip(self, message))]
    async fn before(&self, message: &Message) -> Result<bool> {
        info!(
            user_id = message.user.id,
            chat_id = message.chat.id,
            username = %message.user.username.as_deref().unwrap_or("unknown"),
            message_type = %message.message_type,
            message_content = %message.content,
            "Received message"
        );
        Ok(true)
    }

    #[instrument(skip(self, message, response))]
    async fn after(&self, message: &Message, response: &HandlerResponse) -> Result<()> {
        debug!(
            message_id = %message.id,
            chat_id = message.chat.id,
            response = ?response,
            "Processed message"
        );
        Ok(())
    }
}
