//! # Linktor Webhooks
//!
//! Inbound platform webhook handling:
//! - HMAC-SHA256 signature verification over raw request bytes
//! - Timestamp freshness / replay window checks
//! - Typed event construction with structural validation
//! - Per-event-type dispatch to async handlers
//!
//! ## Example
//!
//! ```rust,ignore
//! use linktor_webhooks::{WebhookDispatcher, FnHandler};
//!
//! let dispatcher = WebhookDispatcher::new("whsec_...").on(
//!     "message.received",
//!     FnHandler::new(|event| Box::pin(async move {
//!         println!("message event {}", event.id);
//!         Ok(())
//!     })),
//! );
//!
//! let response = dispatcher.handle(&request).await;
//! ```

mod dispatcher;
mod error;
mod event;
mod freshness;
mod request;
mod signature;

pub use dispatcher::{
    FnHandler, WebhookDispatcher, WebhookHandler, WebhookResponse, construct_event, verify_request,
};
pub use error::{HandlerError, VerificationError, WebhookResult};
pub use event::{WebhookEvent, WebhookEventType};
pub use freshness::{DEFAULT_TOLERANCE_SECONDS, check_freshness, check_freshness_at};
pub use request::{
    HeaderMap, RawWebhookRequest, SIGNATURE_HEADER, TIMESTAMP_HEADER, VerifiedWebhookRequest,
};
pub use signature::{compute_signature, verify};
