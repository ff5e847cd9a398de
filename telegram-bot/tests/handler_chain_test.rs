//! Integration tests for [`telegram_bot::HandlerChain`].
//!
//! Covers: before stopping the chain, Reply ending the handle phase and reaching after(),
//! Ignore/Continue falling through to the next handler, after() running in reverse order,
//! and handler errors propagating to the caller.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use telegram_bot::{
    build_handler_chain, BotError, Chat, Handler, HandlerChain, HandlerResponse, Message, User,
};

fn create_test_message(content: &str) -> Message {
    Message::incoming_text(
        "test_message_id",
        User {
            id: 123,
            username: Some("test_user".to_string()),
            first_name: Some("Test".to_string()),
            last_name: None,
        },
        Chat {
            id: 456,
            chat_type: "private".to_string(),
        },
        content,
    )
}

/// Records every phase it sees as `"<phase>_<name>"` and answers handle() with a fixed response.
struct RecordingHandler {
    name: &'static str,
    response: HandlerResponse,
    log: Arc<Mutex<Vec<String>>>,
}

impl RecordingHandler {
    fn new(name: &'static str, response: HandlerResponse, log: Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        Arc::new(Self {
            name,
            response,
            log,
        })
    }
}

#[async_trait]
impl Handler for RecordingHandler {
    async fn before(&self, _message: &Message) -> telegram_bot::Result<bool> {
        self.log.lock().unwrap().push(format!("before_{}", self.name));
        Ok(true)
    }

    async fn handle(&self, _message: &Message) -> telegram_bot::Result<HandlerResponse> {
        self.log.lock().unwrap().push(format!("handle_{}", self.name));
        Ok(self.response.clone())
    }

    async fn after(&self, _message: &Message, response: &HandlerResponse) -> telegram_bot::Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("after_{}:{:?}", self.name, response));
        Ok(())
    }
}

/// **Test: Phases run before (in order) → handle (until Reply) → after (reverse) with the final response.**
#[tokio::test]
async fn test_reply_stops_handle_phase_and_reaches_after() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let reply = HandlerResponse::Reply("hi".to_string());

    let chain = HandlerChain::new()
        .add_handler(RecordingHandler::new("first", HandlerResponse::Ignore, log.clone()))
        .add_handler(RecordingHandler::new("second", reply.clone(), log.clone()))
        .add_handler(RecordingHandler::new("third", HandlerResponse::Continue, log.clone()));

    let result = chain.handle(&create_test_message("hello")).await.unwrap();

    assert_eq!(result, reply);
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "before_first",
            "before_second",
            "before_third",
            "handle_first",
            "handle_second",
            "after_third:Reply(\"hi\")",
            "after_second:Reply(\"hi\")",
            "after_first:Reply(\"hi\")",
        ]
    );
}

/// **Test: When every handler continues, the chain result is Continue.**
#[tokio::test]
async fn test_all_continue_yields_continue() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let chain = HandlerChain::new()
        .add_handler(RecordingHandler::new("a", HandlerResponse::Continue, log.clone()))
        .add_handler(RecordingHandler::new("b", HandlerResponse::Ignore, log.clone()));

    let result = chain.handle(&create_test_message("x")).await.unwrap();

    assert_eq!(result, HandlerResponse::Continue);
    assert_eq!(log.lock().unwrap().len(), 6);
}

/// **Test: before returning false stops the chain; no handle or after runs.**
#[tokio::test]
async fn test_before_false_stops_chain() {
    struct BlockingHandler;

    #[async_trait]
    impl Handler for BlockingHandler {
        async fn before(&self, _message: &Message) -> telegram_bot::Result<bool> {
            Ok(false)
        }
    }

    let log = Arc::new(Mutex::new(Vec::new()));
    let chain = HandlerChain::new()
        .add_handler(Arc::new(BlockingHandler))
        .add_handler(RecordingHandler::new("later", HandlerResponse::Continue, log.clone()));

    let result = chain.handle(&create_test_message("x")).await.unwrap();

    assert_eq!(result, HandlerResponse::Stop);
    assert!(log.lock().unwrap().is_empty());
}

/// **Test: A handler error is returned by the chain and later handlers are skipped.**
#[tokio::test]
async fn test_handler_error_propagates() {
    struct FailingHandler {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Handler for FailingHandler {
        async fn handle(&self, _message: &Message) -> telegram_bot::Result<HandlerResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(BotError::Handler("boom".to_string()))
        }
    }

    let calls = Arc::new(AtomicUsize::new(0));
    let log = Arc::new(Mutex::new(Vec::new()));
    let chain = HandlerChain::new()
        .add_handler(Arc::new(FailingHandler {
            calls: calls.clone(),
        }))
        .add_handler(RecordingHandler::new("later", HandlerResponse::Continue, log.clone()));

    let err = chain.handle(&create_test_message("x")).await.unwrap_err();

    assert!(matches!(err, BotError::Handler(ref m) if m == "boom"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(*log.lock().unwrap(), vec!["before_later"]);
}

/// **Test: The runner chain puts the logging handler in front of the application handler.**
#[tokio::test]
async fn test_build_handler_chain_wraps_application_handler() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let chain = build_handler_chain(RecordingHandler::new(
        "app",
        HandlerResponse::Stop,
        log.clone(),
    ));

    assert_eq!(chain.len(), 2);
    let result = chain.handle(&create_test_message("hello")).await.unwrap();

    assert_eq!(result, HandlerResponse::Stop);
    assert_eq!(
        *log.lock().unwrap(),
        vec!["before_app", "handle_app", "after_app:Stop"]
    );
}
