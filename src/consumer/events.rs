use std::sync::Arc;

use crate::errors::TransportError;
use crate::queue::QueueMessage;

/// Lifecycle notifications emitted by the consumer.
///
/// Subscribe with [`Consumer::subscribe`]. Events for one message are
/// ordered relative to each other; events are broadcast, so every subscriber
/// sees the full stream.
///
/// [`Consumer::subscribe`]: crate::consumer::Consumer::subscribe
#[derive(Debug, Clone)]
pub enum ConsumerEvent {
    /// A message was fetched and entered the processing pipeline.
    MessageReceived(QueueMessage),

    /// The handler succeeded and the message was deleted from the queue.
    MessageProcessed(QueueMessage),

    /// The message exhausted its retry budget and was deleted without
    /// invoking the handler.
    MessageDiscarded {
        message: QueueMessage,
        reason: DiscardReason,
    },

    /// The user handler failed; the message stays queued and becomes
    /// redeliverable once its visibility timeout expires.
    ProcessingError {
        error: Arc<dyn std::error::Error + Send + Sync + 'static>,
        message: QueueMessage,
    },

    /// The queue transport failed. Carries the affected message when the
    /// failure concerned one (a failed delete), `None` for fetch failures.
    Error {
        error: TransportError,
        message: Option<QueueMessage>,
    },

    /// A fetched batch was fully dispatched.
    ResponseProcessed,

    /// A fetch returned no messages.
    Empty,

    /// `stop()` was called; no further fetches will be issued.
    Stopped,
}

/// Why a message was discarded instead of handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscardReason {
    /// The delivery count reached the configured retry budget.
    RetryBudgetExhausted { dequeue_count: u32, max_retries: u32 },
}

impl std::fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscardReason::RetryBudgetExhausted {
                dequeue_count,
                max_retries,
            } => write!(
                f,
                "retry budget exhausted: delivered {dequeue_count} times, budget {max_retries}"
            ),
        }
    }
}
