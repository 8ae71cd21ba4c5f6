use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use tokio::sync::broadcast;
use tracing::debug;

use crate::consumer::config::ConsumerConfig;
use crate::consumer::events::ConsumerEvent;
use crate::consumer::handler::MessageHandler;
use crate::errors::ConfigurationError;
use crate::queue::QueueClient;

pub mod config;
pub mod events;
pub mod handler;
mod poll;

// Run state, held in a single atomic so `stop()` and an in-flight cycle
// cannot race. `Stopping` marks a stop that the loop has not observed yet.
const STOPPED: u8 = 0;
const RUNNING: u8 = 1;
const STOPPING: u8 = 2;

const EVENT_CHANNEL_CAPACITY: usize = 128;

/// A long-lived, self-restarting polling consumer for one queue.
///
/// The consumer repeatedly fetches batches of messages from its
/// [`QueueClient`], invokes the [`MessageHandler`] for each, deletes
/// successfully handled messages, and retries or discards messages that
/// repeatedly fail. Lifecycle notifications are broadcast as
/// [`ConsumerEvent`]s.
///
/// One logical thread of control per instance: no two poll cycles run
/// concurrently, and messages within a batch are handled one at a time in
/// arrival order.
pub struct Consumer<C>
where
    C: QueueClient,
{
    client: C,
    handler: Arc<dyn MessageHandler>,
    config: ConsumerConfig,
    state: AtomicU8,
    events: broadcast::Sender<ConsumerEvent>,
}

impl<C> std::fmt::Debug for Consumer<C>
where
    C: QueueClient,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Consumer")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<C> Consumer<C>
where
    C: QueueClient,
{
    /// Build a consumer over `client`, dispatching messages to `handler`.
    ///
    /// Validates `config` once, without touching the network; a consumer
    /// that constructs successfully will not fail on configuration later.
    pub fn new<H>(client: C, handler: H, config: ConsumerConfig) -> Result<Self, ConfigurationError>
    where
        H: MessageHandler + 'static,
    {
        config.validate()?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Consumer {
            client,
            handler: Arc::new(handler),
            config,
            state: AtomicU8::new(STOPPED),
            events,
        })
    }

    /// Run the poll loop in the calling task until [`stop`](Self::stop) is
    /// observed. Callers normally `tokio::spawn` this.
    ///
    /// Idempotent: returns immediately when the consumer is already
    /// running. Calling `start` while a stop is pending cancels the stop
    /// and leaves the in-flight loop running, so a stopped consumer can
    /// always be started again.
    pub async fn start(&self) {
        loop {
            match self
                .state
                .compare_exchange(STOPPED, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => break,
                Err(RUNNING) => return,
                Err(_) => {
                    if self
                        .state
                        .compare_exchange(STOPPING, RUNNING, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        // The previous loop keeps running; the pending stop
                        // is cancelled.
                        return;
                    }
                    // The previous loop exited between the two exchanges.
                }
            }
        }
        debug!("consumer started");
        self.run_loop().await;
    }

    /// Request a stop and emit [`ConsumerEvent::Stopped`].
    ///
    /// Idempotent: a consumer that is already stopped (or stopping) is left
    /// untouched and nothing is emitted. There is no immediate-cancellation
    /// power over an in-flight fetch or handler call; the loop finishes its
    /// current unit of work, observes the flag at the next cycle boundary,
    /// and halts without issuing another fetch.
    pub fn stop(&self) {
        if self
            .state
            .compare_exchange(RUNNING, STOPPING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            debug!("consumer stop requested");
            self.emit(ConsumerEvent::Stopped);
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.load(Ordering::Acquire) == RUNNING
    }

    /// Subscribe to lifecycle notifications.
    ///
    /// Each receiver sees every event emitted after it subscribed. Slow
    /// receivers that fall more than the channel capacity behind lose the
    /// oldest events.
    pub fn subscribe(&self) -> broadcast::Receiver<ConsumerEvent> {
        self.events.subscribe()
    }

    pub(crate) fn emit(&self, event: ConsumerEvent) {
        // Nobody listening is fine; events are best-effort notifications.
        let _ = self.events.send(event);
    }

    /// Finalize a pending stop. True when the loop should terminate.
    fn observe_stop(&self) -> bool {
        self.state
            .compare_exchange(STOPPING, STOPPED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Non-consuming check used mid-cycle; the loop top finalizes.
    fn stop_requested(&self) -> bool {
        self.state.load(Ordering::Acquire) == STOPPING
    }
}
