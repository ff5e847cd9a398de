//! Mock Bot and mock LlmClient for relay tests.
//!
//! Both mocks push [`Event`]s into one channel, so a test observes typing, model calls and
//! replies in the order they happened.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use llm_client::{LlmClient, LlmError};
use prompt::{ChatMessage, MessageRole};
use relay_bot::{ChatQueues, ConversationConfig, Relay, RelayHandler};
use telegram_bot::{Bot, BotError, Chat, Message, User};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Typing(i64),
    Completion(Vec<ChatMessage>),
    Text(i64, String),
    Html(i64, String),
}

pub struct MockBot {
    events: mpsc::UnboundedSender<Event>,
    fail_typing: bool,
}

#[async_trait]
impl Bot for MockBot {
    async fn send_message(&self, chat: &Chat, text: &str) -> telegram_bot::Result<()> {
        let _ = self.events.send(Event::Text(chat.id, text.to_string()));
        Ok(())
    }

    async fn send_html(&self, chat: &Chat, html: &str) -> telegram_bot::Result<()> {
        let _ = self.events.send(Event::Html(chat.id, html.to_string()));
        Ok(())
    }

    async fn send_typing(&self, chat: &Chat) -> telegram_bot::Result<()> {
        if self.fail_typing {
            return Err(BotError::Bot("typing not allowed".to_string()));
        }
        let _ = self.events.send(Event::Typing(chat.id));
        Ok(())
    }
}

/// What the mock model does for one call.
#[derive(Debug, Clone)]
pub enum Behavior {
    Reply(String),
    Fail(LlmError),
    /// Waits (tokio time) then replies.
    Delay(Duration, String),
    /// Never answers.
    Hang,
}

/// Mock model. Behaviors are scripted per user text and consumed in order; unscripted texts
/// are answered with `echo: <text>`.
#[derive(Default)]
pub struct MockLlm {
    script: Mutex<HashMap<String, VecDeque<Behavior>>>,
    events: Mutex<Option<mpsc::UnboundedSender<Event>>>,
    pub calls: AtomicUsize,
}

impl MockLlm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, text: &str, behavior: Behavior) -> Self {
        self.script
            .lock()
            .unwrap()
            .entry(text.to_string())
            .or_default()
            .push_back(behavior);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(tx) = self.events.lock().unwrap().as_ref() {
            let _ = tx.send(Event::Completion(messages.clone()));
        }
        let last = messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();
        let behavior = self
            .script
            .lock()
            .unwrap()
            .get_mut(&last)
            .and_then(|q| q.pop_front())
            .unwrap_or_else(|| Behavior::Reply(format!("echo: {}", last)));
        match behavior {
            Behavior::Reply(text) => Ok(text),
            Behavior::Fail(err) => Err(err),
            Behavior::Delay(d, text) => {
                tokio::time::sleep(d).await;
                Ok(text)
            }
            Behavior::Hang => std::future::pending().await,
        }
    }
}

pub struct Harness {
    pub handler: RelayHandler,
    pub queues: Arc<ChatQueues>,
    pub llm: Arc<MockLlm>,
    pub events: mpsc::UnboundedReceiver<Event>,
    pub shutdown: CancellationToken,
    pub bot_username: Arc<tokio::sync::RwLock<Option<String>>>,
}

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub fn harness(llm: MockLlm, config: ConversationConfig) -> Harness {
    build(llm, config, false)
}

pub fn harness_with_failing_typing(llm: MockLlm, config: ConversationConfig) -> Harness {
    build(llm, config, true)
}

fn build(llm: MockLlm, config: ConversationConfig, fail_typing: bool) -> Harness {
    let (tx, events) = mpsc::unbounded_channel();
    *llm.events.lock().unwrap() = Some(tx.clone());
    let llm = Arc::new(llm);
    let bot: Arc<dyn Bot> = Arc::new(MockBot {
        events: tx,
        fail_typing,
    });
    let shutdown = CancellationToken::new();
    let relay = Arc::new(Relay::new(
        bot.clone(),
        llm.clone(),
        REQUEST_TIMEOUT,
        shutdown.clone(),
    ));
    let queues = Arc::new(ChatQueues::new(relay, config));
    let bot_username = Arc::new(tokio::sync::RwLock::new(Some("relay_bot".to_string())));
    let handler = RelayHandler::new(bot, queues.clone(), bot_username.clone());
    Harness {
        handler,
        queues,
        llm,
        events,
        shutdown,
        bot_username,
    }
}

pub fn text_message(chat_id: i64, content: &str) -> Message {
    Message::incoming_text(
        format!("{}-{}", chat_id, content.len()),
        User {
            id: chat_id * 10,
            username: Some("tester".to_string()),
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
        },
        Chat {
            id: chat_id,
            chat_type: "private".to_string(),
        },
        content,
    )
}

impl Harness {
    pub async fn next_event(&mut self) -> Event {
        self.events.recv().await.expect("event channel closed")
    }

    /// Receives events up to and including the next text reply for `chat_id`.
    pub async fn until_reply(&mut self, chat_id: i64) -> Vec<Event> {
        let mut seen = Vec::new();
        loop {
            let event = self.next_event().await;
            let done = matches!(&event, Event::Text(id, _) if *id == chat_id);
            seen.push(event);
            if done {
                return seen;
            }
        }
    }

    /// Lets spawned workers run until they block.
    pub async fn settle(&self) {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    pub fn assert_no_events(&mut self) {
        assert_eq!(
            self.events.try_recv(),
            Err(mpsc::error::TryRecvError::Empty)
        );
    }
}
