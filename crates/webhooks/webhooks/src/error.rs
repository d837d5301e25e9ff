//! Webhook error types.

use thiserror::Error;

/// Result type for webhook verification.
pub type WebhookResult<T> = Result<T, VerificationError>;

/// Why an inbound webhook was rejected.
///
/// All variants are terminal: the payload is untrusted and must be
/// discarded, never retried or partially processed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerificationError {
    /// Signature header absent or empty.
    #[error("Missing signature header")]
    MissingSignature,

    /// Signature did not match the raw body.
    #[error("Webhook signature verification failed")]
    InvalidSignature,

    /// Timestamp header outside the tolerance window or unparsable.
    #[error("Stale or invalid webhook timestamp")]
    StaleTimestamp,

    /// Body was not valid JSON.
    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),

    /// Body parsed but `id` or `type` was missing or empty.
    #[error("Invalid webhook event structure")]
    InvalidStructure,
}

/// Error returned by a registered webhook handler.
///
/// Treated at the dispatch boundary exactly like a verification failure: the
/// delivery is answered with status 400 carrying this message.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct HandlerError(String);

impl HandlerError {
    /// Creates a handler error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self(message.to_string())
    }
}
