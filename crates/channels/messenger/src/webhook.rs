//! Provider webhook endpoint: subscription handshake and delivery parsing.

use crate::error::{MessengerError, MessengerResult};
use crate::types::{SubscriptionQuery, WebhookPayload};

/// Signature header set by the provider on webhook deliveries.
pub const HUB_SIGNATURE_HEADER: &str = "X-Hub-Signature-256";

/// Handles the GET subscription handshake.
///
/// Returns the challenge to echo back iff the mode is `"subscribe"` and the
/// token matches the configured verify token.
pub fn verify_subscription(
    query: &SubscriptionQuery,
    verify_token: &str,
) -> MessengerResult<String> {
    if query.mode == "subscribe" && query.verify_token == verify_token {
        Ok(query.challenge.clone())
    } else {
        Err(MessengerError::InvalidVerifyToken)
    }
}

/// Parses and validates a POST webhook delivery.
///
/// When an app secret is configured, the `X-Hub-Signature-256` header must
/// carry `sha256=<hex>` over the exact raw body; the comparison is
/// fixed-time. A channel with no configured secret skips validation.
pub fn parse_webhook(
    body: &[u8],
    signature_header: Option<&str>,
    app_secret: Option<&str>,
) -> MessengerResult<WebhookPayload> {
    if let Some(secret) = app_secret.filter(|s| !s.is_empty()) {
        let header = signature_header.unwrap_or("");
        let Some(signature) = header.strip_prefix("sha256=") else {
            tracing::warn!("webhook delivery without a sha256 signature prefix");
            return Err(MessengerError::InvalidSignature);
        };

        if !linktor_webhooks::verify(body, signature, secret) {
            tracing::warn!("webhook delivery failed signature validation");
            return Err(MessengerError::InvalidSignature);
        }
    }

    serde_json::from_slice(body).map_err(|e| MessengerError::InvalidPayload(e.to_string()))
}
