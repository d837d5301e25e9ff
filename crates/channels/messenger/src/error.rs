//! Messenger channel error types.

use thiserror::Error;

/// Result type for messenger webhook operations.
pub type MessengerResult<T> = Result<T, MessengerError>;

/// Error type for messenger webhook operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MessengerError {
    /// Handshake token did not match the configured verify token.
    #[error("Invalid verify token")]
    InvalidVerifyToken,

    /// `X-Hub-Signature-256` missing, malformed, or not matching the body.
    #[error("Invalid webhook signature")]
    InvalidSignature,

    /// Body was not a structurally valid webhook payload.
    #[error("Failed to parse webhook payload: {0}")]
    InvalidPayload(String),
}
