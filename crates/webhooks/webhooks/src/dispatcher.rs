//! Webhook verification and typed dispatch.
//!
//! Verification always runs against the raw request bytes before any JSON
//! parsing; unverified bytes are never parsed.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{HandlerError, VerificationError, WebhookResult};
use crate::event::WebhookEvent;
use crate::freshness;
use crate::request::{
    HeaderMap, RawWebhookRequest, SIGNATURE_HEADER, TIMESTAMP_HEADER, VerifiedWebhookRequest,
};
use crate::signature;

/// Verifies signature and freshness of a raw request.
///
/// This is the only constructor of [`VerifiedWebhookRequest`].
pub fn verify_request<'a>(
    request: &'a RawWebhookRequest,
    secret: &str,
    tolerance_seconds: i64,
) -> WebhookResult<VerifiedWebhookRequest<'a>> {
    let signature_header = request.headers().get(SIGNATURE_HEADER).unwrap_or("");
    if signature_header.is_empty() {
        return Err(VerificationError::MissingSignature);
    }

    if !freshness::check_freshness(request.headers().get(TIMESTAMP_HEADER), tolerance_seconds) {
        return Err(VerificationError::StaleTimestamp);
    }

    if !signature::verify(request.body(), signature_header, secret) {
        return Err(VerificationError::InvalidSignature);
    }

    Ok(VerifiedWebhookRequest { raw: request })
}

impl VerifiedWebhookRequest<'_> {
    /// Parses the authenticated body into a typed event.
    pub fn event(&self) -> WebhookResult<WebhookEvent> {
        let event: WebhookEvent = serde_json::from_slice(self.body())
            .map_err(|e| VerificationError::InvalidPayload(e.to_string()))?;

        if event.id.is_empty() || event.event_type.is_empty() {
            return Err(VerificationError::InvalidStructure);
        }

        Ok(event)
    }
}

/// Verifies a raw request and constructs the typed event in one call.
pub fn construct_event(
    request: &RawWebhookRequest,
    secret: &str,
    tolerance_seconds: i64,
) -> WebhookResult<WebhookEvent> {
    verify_request(request, secret, tolerance_seconds)?.event()
}

/// Trait for webhook event handlers.
#[async_trait]
pub trait WebhookHandler: Send + Sync {
    /// Handles a verified event.
    async fn handle(&self, event: WebhookEvent) -> Result<(), HandlerError>;
}

/// Wrapper for function-based handlers.
pub struct FnHandler<F>
where
    F: Fn(
            WebhookEvent,
        ) -> std::pin::Pin<
            Box<dyn std::future::Future<Output = Result<(), HandlerError>> + Send>,
        > + Send
        + Sync,
{
    handler: F,
}

impl<F> FnHandler<F>
where
    F: Fn(
            WebhookEvent,
        ) -> std::pin::Pin<
            Box<dyn std::future::Future<Output = Result<(), HandlerError>> + Send>,
        > + Send
        + Sync,
{
    /// Creates a new function handler.
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl<F> WebhookHandler for FnHandler<F>
where
    F: Fn(
            WebhookEvent,
        ) -> std::pin::Pin<
            Box<dyn std::future::Future<Output = Result<(), HandlerError>> + Send>,
        > + Send
        + Sync,
{
    async fn handle(&self, event: WebhookEvent) -> Result<(), HandlerError> {
        (self.handler)(event).await
    }
}

/// Response produced for an inbound webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookResponse {
    /// HTTP status to answer with.
    pub status: u16,
    /// Response body, set on rejections.
    pub body: Option<String>,
}

impl WebhookResponse {
    fn ok() -> Self {
        Self {
            status: 200,
            body: None,
        }
    }

    fn rejected(message: impl Into<String>) -> Self {
        Self {
            status: 400,
            body: Some(message.into()),
        }
    }
}

/// Verifies inbound webhooks and routes them to typed handlers.
///
/// At most one handler is registered per event type; re-registering a type
/// replaces its handler. Unregistered types are acknowledged with 200 so the
/// platform does not redeliver events the integration does not care about.
pub struct WebhookDispatcher {
    secret: String,
    tolerance_seconds: i64,
    handlers: HashMap<String, Box<dyn WebhookHandler>>,
}

impl WebhookDispatcher {
    /// Creates a dispatcher for the given webhook secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            tolerance_seconds: freshness::DEFAULT_TOLERANCE_SECONDS,
            handlers: HashMap::new(),
        }
    }

    /// Sets the timestamp tolerance.
    pub fn with_tolerance(mut self, tolerance_seconds: i64) -> Self {
        self.tolerance_seconds = tolerance_seconds;
        self
    }

    /// Registers the handler for an event type, replacing any previous one.
    pub fn on(mut self, event_type: impl Into<String>, handler: impl WebhookHandler + 'static) -> Self {
        self.handlers.insert(event_type.into(), Box::new(handler));
        self
    }

    /// Registers a handler on an already-built dispatcher.
    pub fn register(&mut self, event_type: impl Into<String>, handler: impl WebhookHandler + 'static) {
        self.handlers.insert(event_type.into(), Box::new(handler));
    }

    /// Verifies a delivery and runs the registered handler, if any.
    ///
    /// The handler is awaited to completion before the response is produced;
    /// handlers never run concurrently for the same delivery. A handler
    /// error is answered exactly like a verification failure.
    pub async fn handle(&self, request: &RawWebhookRequest) -> WebhookResponse {
        let event = match construct_event(request, &self.secret, self.tolerance_seconds) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("webhook rejected: {}", e);
                return WebhookResponse::rejected(e.to_string());
            }
        };

        let Some(handler) = self.handlers.get(&event.event_type) else {
            tracing::debug!("no handler registered for '{}', acknowledging", event.event_type);
            return WebhookResponse::ok();
        };

        let event_type = event.event_type.clone();
        match handler.handle(event).await {
            Ok(()) => WebhookResponse::ok(),
            Err(e) => {
                tracing::error!("handler for '{}' failed: {}", event_type, e);
                WebhookResponse::rejected(e.to_string())
            }
        }
    }

    /// Handles a delivery whose body arrived already parsed.
    ///
    /// The value is re-serialized deterministically (object keys sorted) and
    /// then treated exactly like a raw delivery, so the signature must cover
    /// that canonical serialization.
    pub async fn handle_json(&self, body: &Value, headers: &HeaderMap) -> WebhookResponse {
        let bytes = match serde_json::to_vec(body) {
            Ok(bytes) => bytes,
            Err(e) => return WebhookResponse::rejected(e.to_string()),
        };
        self.handle(&RawWebhookRequest::new(bytes, headers.clone()))
            .await
    }
}
