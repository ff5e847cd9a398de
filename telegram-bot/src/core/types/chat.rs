//! Chat identity type for core messages.

use serde::{Deserialize, Serialize};

/// Chat (channel, group or private) identity. `id` is the conversation key of the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub chat_type: String,
}
