//! Per-conversation queues: one FIFO queue and one worker task per conversation key.
//!
//! The worker owns the key's [`ChatSession`], so turns of one conversation run strictly in
//! submission order while different conversations proceed concurrently. A worker idle for
//! longer than the TTL removes its queue and exits, dropping the transcript.
//!
//! **Data flow:** [`ChatQueues::enqueue`] → per-key queue → `run_worker` → [`Relay::process_turn`].

use dashmap::DashMap;
use llm_client::ChatSession;
use prompt::Transcript;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::config::ConversationConfig;
use crate::relay::{QueuedTurn, Relay};

/// Sender half of a conversation queue, tagged with the worker that owns the receiver.
#[derive(Clone)]
struct QueueHandle {
    worker_id: u64,
    tx: mpsc::UnboundedSender<QueuedTurn>,
}

type QueueMap = DashMap<String, QueueHandle>;

/// Routes turns to per-conversation workers.
pub struct ChatQueues {
    relay: Arc<Relay>,
    config: ConversationConfig,
    queues: Arc<QueueMap>,
    next_worker_id: AtomicU64,
}

/// What the worker got while waiting for its queue.
enum Next {
    Turn(QueuedTurn),
    Idle,
    Closed,
    Shutdown,
}

impl ChatQueues {
    pub fn new(relay: Arc<Relay>, config: ConversationConfig) -> Self {
        Self {
            relay,
            config,
            queues: Arc::new(DashMap::new()),
            next_worker_id: AtomicU64::new(0),
        }
    }

    /// Number of conversations that currently have a live worker (and so a transcript).
    pub fn active_conversations(&self) -> usize {
        self.queues.len()
    }

    /// Queues `turn` on its conversation's worker, starting one if needed. Never blocks on the
    /// model call. Turns submitted after shutdown are dropped.
    #[instrument(skip(self, turn), fields(chat_id = turn.chat().id))]
    pub fn enqueue(&self, turn: QueuedTurn) {
        if self.relay.shutdown_token().is_cancelled() {
            warn!(chat_id = turn.chat().id, "Shutting down; dropping message");
            return;
        }
        let key = self.config.scope.key_for(turn.chat());

        // Sends happen under the map entry lock, and a worker only retires under the same lock
        // when its queue is empty, so a queued turn always reaches a live worker.
        let turn = match self.queues.get(&key) {
            Some(handle) => match handle.tx.send(turn) {
                Ok(()) => {
                    debug!(conversation_key = %key, "step: turn queued");
                    return;
                }
                Err(mpsc::error::SendError(turn)) => turn,
            },
            None => turn,
        };

        let mut entry = self.queues.entry(key.clone()).or_insert_with(|| self.spawn_worker(&key));
        if let Err(mpsc::error::SendError(turn)) = entry.tx.send(turn) {
            warn!(conversation_key = %key, "Worker gone; re-enqueueing on a fresh worker");
            *entry = self.spawn_worker(&key);
            if entry.tx.send(turn).is_err() {
                warn!(conversation_key = %key, "Fresh worker exited immediately; message dropped");
            }
        }
    }

    fn spawn_worker(&self, key: &str) -> QueueHandle {
        let worker_id = self.next_worker_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        info!(conversation_key = %key, worker_id, "Starting conversation worker");
        tokio::spawn(run_worker(
            self.relay.clone(),
            self.queues.clone(),
            key.to_string(),
            worker_id,
            rx,
            self.config.idle_ttl,
            self.config.max_turns,
        ));
        QueueHandle { worker_id, tx }
    }
}

async fn next_turn(rx: &mut mpsc::UnboundedReceiver<QueuedTurn>, idle_ttl: Option<Duration>) -> Next {
    let received = match idle_ttl {
        Some(ttl) => match tokio::time::timeout(ttl, rx.recv()).await {
            Ok(received) => received,
            Err(_) => return Next::Idle,
        },
        None => rx.recv().await,
    };
    received.map(Next::Turn).unwrap_or(Next::Closed)
}

/// Consumes one conversation's queue until shutdown, idle eviction or channel close.
async fn run_worker(
    relay: Arc<Relay>,
    queues: Arc<QueueMap>,
    key: String,
    worker_id: u64,
    mut rx: mpsc::UnboundedReceiver<QueuedTurn>,
    idle_ttl: Option<Duration>,
    max_turns: usize,
) {
    let mut session = ChatSession::resume(Transcript::with_max_turns(max_turns));
    let shutdown = relay.shutdown_token().clone();

    loop {
        let next = tokio::select! {
            biased;
            _ = shutdown.cancelled() => Next::Shutdown,
            next = next_turn(&mut rx, idle_ttl) => next,
        };

        match next {
            Next::Turn(turn) => {
                debug!(
                    conversation_key = %key,
                    user_id = turn.message.user.id,
                    "Processing queued message"
                );
                relay.process_turn(&mut session, &turn, &key).await;
            }
            Next::Idle => {
                let retired = queues
                    .remove_if(&key, |_, handle| handle.worker_id == worker_id && rx.is_empty())
                    .is_some();
                if retired {
                    info!(
                        conversation_key = %key,
                        turns = session.history().len(),
                        "Conversation idle; transcript evicted"
                    );
                    break;
                }
            }
            Next::Closed => break,
            Next::Shutdown => {
                info!(conversation_key = %key, pending = rx.len(), "Worker stopping on shutdown");
                break;
            }
        }
    }
    queues.remove_if(&key, |_, handle| handle.worker_id == worker_id);
}
