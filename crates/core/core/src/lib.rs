//! # Linktor Core
//!
//! Canonical data model shared across the Linktor crates: the tagged
//! `ChannelEvent` union every provider normalizes into, and the API response
//! `Envelope` used by the outbound client.

pub mod envelope;
pub mod event;

// Re-export commonly used items at the crate root
pub use envelope::{ApiErrorBody, Envelope, error_message};
pub use event::{
    Attachment, ChannelEvent, DeliveryStatus, InboundMessage, Postback, Reaction, ReactionAction,
    ReadStatus,
};
