//! # Prompt
//!
//! Conversation data handed to AI models: [`ChatMessage`] (one role-tagged turn) and
//! [`Transcript`] (the ordered history of a conversation).
//!
//! ## Usage
//!
//! Used by `llm-client` to build provider requests (Gemini `contents`, OpenAI `messages`) and by
//! `relay-bot`, where each conversation worker owns one [`Transcript`].
//!
//! ## External interactions
//!
//! - **AI models**: turns are serialized into provider requests by `llm-client`.

/// Role of a message. `Assistant` maps to Gemini's `model` role and OpenAI's `assistant` role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    /// System instruction (Gemini `systemInstruction`, OpenAI `role: "system"`).
    System,
    /// User message.
    User,
    /// Model reply.
    Assistant,
}

/// A single chat message (one turn of a conversation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered history of a conversation, oldest turn first.
///
/// Grows by whole exchanges (user turn followed by the model's reply). When `max_turns` is set,
/// the oldest exchanges are dropped so the transcript never exceeds it; the history therefore
/// always starts with a user turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    turns: Vec<ChatMessage>,
    max_turns: Option<usize>,
}

impl Transcript {
    /// Creates an empty, unbounded transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty transcript holding at most `max_turns` turns. `0` means unbounded.
    ///
    /// Trimming drops whole exchanges, so an odd bound keeps one turn fewer and a bound of 1
    /// keeps nothing.
    pub fn with_max_turns(max_turns: usize) -> Self {
        Self {
            turns: Vec::new(),
            max_turns: (max_turns > 0).then_some(max_turns),
        }
    }

    /// Resumes a conversation from existing turns (unbounded).
    pub fn from_turns(turns: Vec<ChatMessage>) -> Self {
        Self {
            turns,
            max_turns: None,
        }
    }

    pub fn turns(&self) -> &[ChatMessage] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn max_turns(&self) -> Option<usize> {
        self.max_turns
    }

    /// Returns the full history plus a pending user turn, without modifying the transcript.
    /// This is the context sent to the model for the next turn.
    pub fn with_pending_user(&self, text: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.turns.len() + 1);
        messages.extend(self.turns.iter().cloned());
        messages.push(ChatMessage::user(text));
        messages
    }

    /// Appends a completed exchange (user turn, then the model's reply) and applies the bound.
    pub fn push_exchange(&mut self, user: impl Into<String>, reply: impl Into<String>) {
        self.turns.push(ChatMessage::user(user));
        self.turns.push(ChatMessage::assistant(reply));
        self.enforce_bound();
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    fn enforce_bound(&mut self) {
        let Some(max) = self.max_turns else {
            return;
        };
        if self.turns.len() <= max {
            return;
        }
        let excess = self.turns.len() - max;
        // Drop whole exchanges so the history keeps starting with a user turn.
        let drop = excess + excess % 2;
        self.turns.drain(..drop.min(self.turns.len()));
    }
}
