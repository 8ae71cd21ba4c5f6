use std::time::Duration;

use crate::errors::ConfigurationError;

/// Largest batch a single fetch may request; the SQS per-request cap.
pub const MAX_BATCH_SIZE: i32 = 10;

/// Configuration for the queue consumer.
///
/// Immutable after construction; [`Consumer::new`] validates it once and
/// never touches it again. Queue identity and credentials are not part of
/// this struct, they belong to the queue client (see
/// [`SqsQueueClient::new`]).
///
/// [`Consumer::new`]: crate::consumer::Consumer::new
/// [`SqsQueueClient::new`]: crate::client::SqsQueueClient::new
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Maximum number of messages requested per fetch, between 1 and
    /// [`MAX_BATCH_SIZE`].
    pub batch_size: i32,

    /// Delay before the next fetch after an empty response or a
    /// non-authentication fetch error.
    pub poll_delay: Duration,

    /// Per-fetch execution budget (long-poll wait time).
    pub wait_time: Duration,

    /// How long fetched messages stay hidden from other fetches. `None`
    /// uses the queue's configured default.
    pub visibility_timeout: Option<Duration>,

    /// Delay before retrying a fetch that failed with an authentication
    /// error.
    pub authentication_error_timeout: Duration,

    /// Deliveries allowed per message before it is discarded instead of
    /// handled. `None` means unlimited retries and no discard policy.
    pub max_retries: Option<u32>,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        ConsumerConfig {
            batch_size: 1,
            poll_delay: Duration::from_secs(1),
            wait_time: Duration::from_secs(20),
            visibility_timeout: None,
            authentication_error_timeout: Duration::from_secs(10),
            max_retries: None,
        }
    }
}

impl ConsumerConfig {
    /// Check the ranges that affect control flow. Runs once, at consumer
    /// construction; no side effects beyond the returned error.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.batch_size < 1 || self.batch_size > MAX_BATCH_SIZE {
            return Err(ConfigurationError::OutOfRange {
                field: "batch_size",
                message: format!("must be between 1 and {MAX_BATCH_SIZE}"),
            });
        }
        if let Some(visibility) = self.visibility_timeout {
            if visibility.is_zero() {
                return Err(ConfigurationError::OutOfRange {
                    field: "visibility_timeout",
                    message: "must be strictly positive".to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ConsumerConfig::default().validate().is_ok());
    }

    #[test]
    fn batch_size_bounds() {
        let mut config = ConsumerConfig::default();

        config.batch_size = 0;
        assert!(config.validate().is_err());

        config.batch_size = MAX_BATCH_SIZE + 1;
        assert!(config.validate().is_err());

        config.batch_size = MAX_BATCH_SIZE;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_visibility_timeout_is_rejected() {
        let config = ConsumerConfig {
            visibility_timeout: Some(Duration::ZERO),
            ..ConsumerConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            crate::errors::ConfigurationError::OutOfRange {
                field: "visibility_timeout",
                ..
            }
        ));
    }
}
