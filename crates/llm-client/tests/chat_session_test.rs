//! Tests for [`llm_client::ChatSession`]: history is sent as context and committed only on success.

use async_trait::async_trait;
use llm_client::{ChatSession, LlmClient, LlmError};
use prompt::{ChatMessage, Transcript};
use std::sync::Mutex;

/// Mock client: records every request and answers from a fixed script.
struct ScriptedClient {
    replies: Mutex<Vec<Result<String, LlmError>>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedClient {
    fn new(replies: Vec<Result<String, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(replies),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(messages);
        self.replies.lock().unwrap().remove(0)
    }
}

/// **Test: Each turn sends the full prior history plus the new user turn.**
#[tokio::test]
async fn send_turn_uses_full_history() {
    let client = ScriptedClient::new(vec![Ok("one".to_string()), Ok("two".to_string())]);
    let mut session = ChatSession::new();

    assert_eq!(session.send_turn(&client, "first").await.unwrap(), "one");
    assert_eq!(session.send_turn(&client, "second").await.unwrap(), "two");

    let requests = client.requests.lock().unwrap();
    assert_eq!(requests[0], vec![ChatMessage::user("first")]);
    assert_eq!(
        requests[1],
        vec![
            ChatMessage::user("first"),
            ChatMessage::assistant("one"),
            ChatMessage::user("second"),
        ]
    );
    assert_eq!(session.history().len(), 4);
}

/// **Test: A failed turn leaves the history unchanged.**
#[tokio::test]
async fn failed_turn_is_not_committed() {
    let client = ScriptedClient::new(vec![
        Ok("ok".to_string()),
        Err(LlmError::Transport("reset".to_string())),
    ]);
    let mut session = ChatSession::new();
    session.send_turn(&client, "a").await.unwrap();

    let err = session.send_turn(&client, "b").await.unwrap_err();

    assert_eq!(err, LlmError::Transport("reset".to_string()));
    assert_eq!(session.history().len(), 2);
    assert_eq!(session.history().turns()[0], ChatMessage::user("a"));
}

/// **Test: A whitespace-only reply is an EmptyCompletion and is not committed.**
#[tokio::test]
async fn blank_reply_is_empty_completion() {
    let client = ScriptedClient::new(vec![Ok("  \n".to_string())]);
    let mut session = ChatSession::new();

    let err = session.send_turn(&client, "hello").await.unwrap_err();

    assert_eq!(err, LlmError::EmptyCompletion);
    assert!(session.history().is_empty());
}

/// **Test: resume continues from an existing transcript.**
#[tokio::test]
async fn resume_continues_history() {
    let client = ScriptedClient::new(vec![Ok("again".to_string())]);
    let mut history = Transcript::new();
    history.push_exchange("earlier", "reply");
    let mut session = ChatSession::resume(history);

    session.send_turn(&client, "now").await.unwrap();

    assert_eq!(client.requests.lock().unwrap()[0].len(), 3);
    assert_eq!(session.into_history().len(), 4);
}
