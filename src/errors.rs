use thiserror::Error;

/// Error type surfaced by user message handlers.
///
/// Handlers can return any error type; the consumer only needs to report it,
/// so a boxed error keeps the handler signature flexible.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while constructing a consumer or a queue client.
///
/// Configuration errors are fatal: they are returned once at construction
/// and never retried. No network traffic is involved in producing them.
#[derive(Debug, Clone, Error)]
pub enum ConfigurationError {
    /// A required configuration value was absent or empty.
    #[error("missing required configuration: {field}")]
    Missing { field: &'static str },

    /// A configuration value was outside its valid range.
    #[error("value out of range for {field}: {message}")]
    OutOfRange { field: &'static str, message: String },
}

/// Errors raised by the underlying queue transport.
///
/// Everything the queue service can do wrong ends up here: failed fetches,
/// failed deletes, expired delete tokens and rejected credentials. The
/// variants are structural so callers never have to compare error names or
/// message text to decide how to react.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The queue service rejected the request credentials.
    #[error("authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// The queue service could not be reached.
    #[error("connection failed: {message}")]
    ConnectionFailed { message: String },

    /// The message no longer exists or its delete token has expired.
    #[error("message not found or delete token expired: {message_id}")]
    MessageNotFound { message_id: String },

    /// Any other error reported by the queue service.
    #[error("queue service error ({code}): {message}")]
    Service { code: String, message: String },
}

impl TransportError {
    /// True for failures that should back off by the authentication-error
    /// timeout rather than the regular poll delay.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::AuthenticationFailed { .. })
    }
}
