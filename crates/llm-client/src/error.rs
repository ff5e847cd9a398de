//! Error kinds returned by [`crate::LlmClient`] implementations.

use std::time::Duration;

use thiserror::Error;

/// Failure of a completion request. Every variant maps to a user-facing fallback in the relay.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("request cancelled")]
    Cancelled,

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("blocked by safety filter: {0}")]
    SafetyBlocked(String),

    #[error("model returned no text")]
    EmptyCompletion,

    /// Non-success response. `status` is the HTTP status when the transport reports one.
    #[error("API error: {message}")]
    Api {
        status: Option<u16>,
        message: String,
    },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl LlmError {
    /// Short stable name of the kind, for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            LlmError::Timeout(_) => "timeout",
            LlmError::Cancelled => "cancelled",
            LlmError::RateLimited(_) => "rate_limited",
            LlmError::SafetyBlocked(_) => "safety_blocked",
            LlmError::EmptyCompletion => "empty_completion",
            LlmError::Api { .. } => "api",
            LlmError::Transport(_) => "transport",
            LlmError::InvalidRequest(_) => "invalid_request",
        }
    }

    /// Classifies a non-success HTTP status. 429 is a rate limit; everything else is an API error.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if status == 429 {
            LlmError::RateLimited(message)
        } else {
            LlmError::Api {
                status: Some(status),
                message,
            }
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            // reqwest does not report the configured duration.
            LlmError::Timeout(Duration::ZERO)
        } else if let Some(status) = e.status() {
            LlmError::from_status(status.as_u16(), e.to_string())
        } else if e.is_decode() {
            LlmError::Api {
                status: None,
                message: format!("undecodable response: {}", e),
            }
        } else {
            LlmError::Transport(e.to_string())
        }
    }
}
