//! The poll cycle: fetch, dispatch, delete, back off.
//!
//! Nothing raised inside a cycle may kill the loop. Fetch, handler and
//! delete failures are each caught at their own boundary, converted into an
//! event, and followed by a scheduled continuation. The only way the loop
//! halts is a `stop()` observed at a cycle boundary.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::consumer::Consumer;
use crate::consumer::events::{ConsumerEvent, DiscardReason};
use crate::queue::{QueueClient, QueueMessage};

impl<C> Consumer<C>
where
    C: QueueClient,
{
    pub(super) async fn run_loop(&self) {
        loop {
            if self.observe_stop() {
                debug!("consumer stopped");
                return;
            }
            self.poll_cycle().await;
        }
    }

    async fn poll_cycle(&self) {
        let batch = self
            .client
            .receive(
                self.config.batch_size,
                self.config.wait_time,
                self.config.visibility_timeout,
            )
            .await;

        match batch {
            Err(error) if error.is_authentication() => {
                warn!(%error, "authentication failed while fetching, backing off");
                self.emit(ConsumerEvent::Error {
                    error,
                    message: None,
                });
                self.backoff(self.config.authentication_error_timeout).await;
            }
            Err(error) => {
                warn!(%error, "failed to fetch messages");
                self.emit(ConsumerEvent::Error {
                    error,
                    message: None,
                });
                self.backoff(self.config.poll_delay).await;
            }
            Ok(messages) if messages.is_empty() => {
                self.emit(ConsumerEvent::Empty);
                self.backoff(self.config.poll_delay).await;
            }
            Ok(messages) => {
                // A stop requested during the fetch leaves the batch
                // undispatched; the messages reappear once their visibility
                // timeout expires.
                if self.stop_requested() {
                    return;
                }
                for message in messages {
                    self.process_message(message).await;
                }
                self.emit(ConsumerEvent::ResponseProcessed);
            }
        }
    }

    /// Handle one message. A failure here aborts this message only, never
    /// the rest of the batch.
    async fn process_message(&self, message: QueueMessage) {
        debug!(
            message_id = %message.message_id,
            dequeue_count = message.dequeue_count,
            "message received"
        );
        self.emit(ConsumerEvent::MessageReceived(message.clone()));

        if let Some(max_retries) = self.config.max_retries {
            if message.dequeue_count >= max_retries {
                self.discard_message(message, max_retries).await;
                return;
            }
        }

        match self.handler.handle(message.clone()).await {
            Ok(()) => self.delete_processed(message).await,
            Err(error) => {
                warn!(
                    message_id = %message.message_id,
                    %error,
                    "handler failed, leaving message for redelivery"
                );
                self.emit(ConsumerEvent::ProcessingError {
                    error: Arc::from(error),
                    message,
                });
            }
        }
    }

    async fn delete_processed(&self, message: QueueMessage) {
        match self
            .client
            .delete(&message.message_id, &message.delete_token)
            .await
        {
            Ok(()) => {
                debug!(message_id = %message.message_id, "message processed");
                self.emit(ConsumerEvent::MessageProcessed(message));
            }
            Err(error) => {
                // The handler succeeded; only the cleanup step failed. This
                // stays a queue-service error, and the message reappears
                // after its visibility timeout.
                warn!(
                    message_id = %message.message_id,
                    %error,
                    "failed to delete processed message"
                );
                self.emit(ConsumerEvent::Error {
                    error,
                    message: Some(message),
                });
            }
        }
    }

    /// Delete a message whose retry budget is spent, without invoking the
    /// handler, so the queue stops redelivering it.
    async fn discard_message(&self, message: QueueMessage, max_retries: u32) {
        match self
            .client
            .delete(&message.message_id, &message.delete_token)
            .await
        {
            Ok(()) => {
                let reason = DiscardReason::RetryBudgetExhausted {
                    dequeue_count: message.dequeue_count,
                    max_retries,
                };
                warn!(message_id = %message.message_id, %reason, "message discarded");
                self.emit(ConsumerEvent::MessageDiscarded { message, reason });
            }
            Err(error) => {
                warn!(
                    message_id = %message.message_id,
                    %error,
                    "failed to delete discarded message"
                );
                self.emit(ConsumerEvent::Error {
                    error,
                    message: Some(message),
                });
            }
        }
    }

    async fn backoff(&self, delay: Duration) {
        // No point sleeping when a stop is already pending.
        if self.stop_requested() {
            return;
        }
        tokio::time::sleep(delay).await;
    }
}
