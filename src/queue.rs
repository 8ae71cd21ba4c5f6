use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::TransportError;

pub mod memory;

/// A single delivery of a message from the queue service.
///
/// The body is opaque to the consumer and handed to the handler untouched.
/// The delete token identifies this particular delivery and is only valid
/// until the message's visibility timeout expires or the message is deleted,
/// whichever comes first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    /// Unique identifier assigned by the queue service.
    pub message_id: String,

    /// Opaque token required to delete this delivery (SQS receipt handle).
    pub delete_token: String,

    /// Number of times the service has delivered this message without it
    /// being deleted, this delivery included.
    pub dequeue_count: u32,

    /// The message payload.
    pub body: String,
}

/// The capability the consumer polls: fetch a batch, delete one message.
///
/// Implementations wrap a concrete queue service ([`SqsQueueClient`]) or an
/// in-memory stand-in ([`memory::InMemoryQueueClient`]). Both operations
/// surface failures as [`TransportError`] so the poll cycle can distinguish
/// authentication failures from everything else.
///
/// [`SqsQueueClient`]: crate::client::SqsQueueClient
#[async_trait]
pub trait QueueClient: Send + Sync {
    /// Fetch up to `max_messages` messages, waiting at most `wait_time` for
    /// the fetch to produce results. When `visibility_timeout` is given,
    /// fetched messages stay hidden from other fetches for that long.
    async fn receive(
        &self,
        max_messages: i32,
        wait_time: Duration,
        visibility_timeout: Option<Duration>,
    ) -> Result<Vec<QueueMessage>, TransportError>;

    /// Remove one delivery of a message from the queue.
    async fn delete(&self, message_id: &str, delete_token: &str) -> Result<(), TransportError>;
}

#[async_trait]
impl<C> QueueClient for Arc<C>
where
    C: QueueClient + ?Sized,
{
    async fn receive(
        &self,
        max_messages: i32,
        wait_time: Duration,
        visibility_timeout: Option<Duration>,
    ) -> Result<Vec<QueueMessage>, TransportError> {
        (**self).receive(max_messages, wait_time, visibility_timeout).await
    }

    async fn delete(&self, message_id: &str, delete_token: &str) -> Result<(), TransportError> {
        (**self).delete(message_id, delete_token).await
    }
}
