//! # SQS Queue Consumer
//!
//! An asynchronous queue-polling message consumer that abstracts SQS polling
//! complexity: it fetches batches of messages, dispatches each to a
//! user-supplied handler, deletes successfully handled messages, and retries
//! or discards messages that repeatedly fail.
//!
//! ## Features
//!
//! - Asynchronous polling loop with tokio, restarted automatically after
//!   empty responses and transport errors
//! - Trait-based handlers; plain async functions and closures work directly
//! - Automatic message deletion on successful processing
//! - Retry budgets: messages delivered more than `max_retries` times are
//!   discarded instead of handled again
//! - Dedicated backoff for authentication failures
//! - Lifecycle events over a broadcast channel (received, processed,
//!   discarded, errors, empty, stopped)
//! - Pluggable queue clients, with an in-memory client for tests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rs_sqs_consumer::client::{SqsQueueClient, create_sqs_client_from_env};
//! use rs_sqs_consumer::consumer::{Consumer, config::ConsumerConfig};
//! use rs_sqs_consumer::errors::HandlerError;
//! use rs_sqs_consumer::queue::QueueMessage;
//!
//! async fn handle(message: QueueMessage) -> Result<(), HandlerError> {
//!     println!("processing message: {}", message.body);
//!     Ok(())
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sqs = create_sqs_client_from_env().await;
//!     let queue = SqsQueueClient::new(
//!         sqs,
//!         "https://sqs.region.amazonaws.com/account/queue-name",
//!     )?;
//!
//!     let consumer = Consumer::new(queue, handle, ConsumerConfig::default())?;
//!     consumer.start().await;
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod consumer;
pub mod errors;
pub mod queue;
