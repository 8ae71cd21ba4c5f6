//! In-memory queue client for tests and development.
//!
//! Implements the full delivery lifecycle a real queue service provides:
//! fetched messages become invisible for a visibility timeout, reappear with
//! an incremented dequeue count if they are not deleted in time, and delete
//! tokens go stale once the delivery they belong to has expired.
//!
//! Time is measured with [`tokio::time::Instant`], so tests running under
//! tokio's paused clock can drive visibility expiry deterministically.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::errors::TransportError;
use crate::queue::{QueueClient, QueueMessage};

const DEFAULT_VISIBILITY_TIMEOUT: Duration = Duration::from_secs(30);

/// An in-memory [`QueueClient`] backed by a single queue.
///
/// Intended for unit testing consumers and for development; long polling is
/// not simulated, so `receive` returns immediately even when the queue is
/// empty.
pub struct InMemoryQueueClient {
    state: Mutex<QueueState>,
    default_visibility: Duration,
}

struct QueueState {
    next_message_id: u64,
    next_delete_token: u64,
    ready: VecDeque<StoredMessage>,
    in_flight: HashMap<String, InFlightMessage>,
}

struct StoredMessage {
    message_id: String,
    body: String,
    dequeue_count: u32,
}

struct InFlightMessage {
    message: StoredMessage,
    visible_at: Instant,
}

impl InMemoryQueueClient {
    pub fn new() -> Self {
        Self::with_default_visibility(DEFAULT_VISIBILITY_TIMEOUT)
    }

    /// Create a client whose deliveries use `visibility` whenever the
    /// receive call does not supply a visibility timeout of its own.
    pub fn with_default_visibility(visibility: Duration) -> Self {
        Self {
            state: Mutex::new(QueueState {
                next_message_id: 0,
                next_delete_token: 0,
                ready: VecDeque::new(),
                in_flight: HashMap::new(),
            }),
            default_visibility: visibility,
        }
    }

    /// Enqueue a message and return its identifier.
    pub fn send_message(&self, body: impl Into<String>) -> String {
        let mut state = self.lock_state();
        state.next_message_id += 1;
        let message_id = format!("msg-{}", state.next_message_id);
        state.ready.push_back(StoredMessage {
            message_id: message_id.clone(),
            body: body.into(),
            dequeue_count: 0,
        });
        message_id
    }

    /// Number of messages still in the queue, in flight included.
    pub fn len(&self) -> usize {
        let state = self.lock_state();
        state.ready.len() + state.in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryQueueClient {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueState {
    /// Return expired in-flight deliveries to the back of the ready queue.
    /// Their delete tokens become stale at this point.
    fn reclaim_expired(&mut self, now: Instant) {
        let expired: Vec<String> = self
            .in_flight
            .iter()
            .filter(|(_, delivery)| delivery.visible_at <= now)
            .map(|(token, _)| token.clone())
            .collect();

        for token in expired {
            if let Some(delivery) = self.in_flight.remove(&token) {
                self.ready.push_back(delivery.message);
            }
        }
    }
}

#[async_trait]
impl QueueClient for InMemoryQueueClient {
    async fn receive(
        &self,
        max_messages: i32,
        _wait_time: Duration,
        visibility_timeout: Option<Duration>,
    ) -> Result<Vec<QueueMessage>, TransportError> {
        let now = Instant::now();
        let visibility = visibility_timeout.unwrap_or(self.default_visibility);
        let mut state = self.lock_state();
        state.reclaim_expired(now);

        let mut batch = Vec::new();
        while batch.len() < max_messages.max(0) as usize {
            let Some(mut message) = state.ready.pop_front() else {
                break;
            };
            message.dequeue_count += 1;
            state.next_delete_token += 1;
            let delete_token = format!("{}/{}", message.message_id, state.next_delete_token);

            batch.push(QueueMessage {
                message_id: message.message_id.clone(),
                delete_token: delete_token.clone(),
                dequeue_count: message.dequeue_count,
                body: message.body.clone(),
            });
            state.in_flight.insert(
                delete_token,
                InFlightMessage {
                    message,
                    visible_at: now + visibility,
                },
            );
        }

        Ok(batch)
    }

    async fn delete(&self, message_id: &str, delete_token: &str) -> Result<(), TransportError> {
        let now = Instant::now();
        let mut state = self.lock_state();
        state.reclaim_expired(now);

        let matches = state
            .in_flight
            .get(delete_token)
            .is_some_and(|delivery| delivery.message.message_id == message_id);
        if !matches {
            return Err(TransportError::MessageNotFound {
                message_id: message_id.to_string(),
            });
        }

        state.in_flight.remove(delete_token);
        Ok(())
    }
}
