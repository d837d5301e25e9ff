//! # Linktor Messenger Channel
//!
//! Messenger-style provider webhooks:
//! - GET subscription handshake (`hub.mode` / `hub.verify_token` / `hub.challenge`)
//! - `X-Hub-Signature-256` body validation
//! - Single-pass normalization of provider payloads into canonical
//!   [`linktor_core::ChannelEvent`] values

pub mod error;
pub mod normalizer;
pub mod types;
pub mod webhook;

pub use error::{MessengerError, MessengerResult};
pub use normalizer::normalize;
pub use types::{
    Coordinates, DeliveryPayload, InboundMessagePayload, MessagingEvent, MessagingParty,
    PostbackPayload, QuickReplyPayload, RawAttachment, RawAttachmentPayload, ReactionPayload,
    ReadPayload, ReplyTo, SubscriptionQuery, WebhookChange, WebhookEntry, WebhookPayload,
};
pub use webhook::{HUB_SIGNATURE_HEADER, parse_webhook, verify_subscription};
