use std::future::Future;

use async_trait::async_trait;

use crate::errors::HandlerError;
use crate::queue::QueueMessage;

/// User-supplied message processing logic.
///
/// The handler receives each fetched message in arrival order. Returning
/// `Ok(())` acknowledges the message: the consumer deletes it from the
/// queue. Returning an error leaves the message queued; it becomes
/// redeliverable once its visibility timeout expires, so handlers should be
/// idempotent.
///
/// Any `Fn(QueueMessage) -> Future<Output = Result<(), HandlerError>>`
/// closure or async fn implements this trait, so most callers never
/// implement it by hand:
///
/// ```rust
/// use rs_sqs_consumer::consumer::handler::MessageHandler;
/// use rs_sqs_consumer::errors::HandlerError;
/// use rs_sqs_consumer::queue::QueueMessage;
///
/// async fn handle(message: QueueMessage) -> Result<(), HandlerError> {
///     println!("processing {}", message.body);
///     Ok(())
/// }
///
/// fn assert_handler(_: impl MessageHandler) {}
/// assert_handler(handle);
/// ```
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, message: QueueMessage) -> Result<(), HandlerError>;
}

#[async_trait]
impl<F, Fut> MessageHandler for F
where
    F: Fn(QueueMessage) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), HandlerError>> + Send,
{
    async fn handle(&self, message: QueueMessage) -> Result<(), HandlerError> {
        (self)(message).await
    }
}
