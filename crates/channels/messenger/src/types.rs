//! Provider webhook payload types.
//!
//! These mirror the Messenger-style wire format. Missing sub-fields fall
//! back to defaults so a partially populated item still parses; only a type
//! mismatch is a structural error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level webhook payload: `{object, entry: [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    /// Subscription object, `"page"` for Messenger.
    #[serde(default)]
    pub object: String,
    /// Entries, one per subscribed page/account.
    #[serde(default)]
    pub entry: Vec<WebhookEntry>,
}

impl WebhookPayload {
    /// Checks whether this payload belongs to a Messenger page subscription.
    pub fn is_messenger(&self) -> bool {
        self.object == "page"
    }
}

/// A single entry in the webhook payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEntry {
    /// Page/account identifier owning the contained events.
    #[serde(default)]
    pub id: String,
    /// Entry time, epoch milliseconds.
    #[serde(default)]
    pub time: i64,
    /// Messaging events delivered to this app.
    #[serde(default)]
    pub messaging: Vec<MessagingEvent>,
    /// Messaging events this app observes while another app has control.
    #[serde(default)]
    pub standby: Vec<MessagingEvent>,
    /// Non-messaging change notifications; not messaging-shaped and ignored
    /// by the normalizer.
    #[serde(default)]
    pub changes: Vec<WebhookChange>,
}

/// A change notification entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookChange {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub value: Value,
}

/// One messaging-like item. A single item may carry several of the optional
/// payloads at once and then yields several canonical events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagingEvent {
    #[serde(default)]
    pub sender: MessagingParty,
    #[serde(default)]
    pub recipient: MessagingParty,
    /// Event time, epoch milliseconds.
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<InboundMessagePayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery: Option<DeliveryPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<ReadPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postback: Option<PostbackPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction: Option<ReactionPayload>,
}

/// A sender or recipient reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagingParty {
    #[serde(default)]
    pub id: String,
}

/// The `message` payload of a messaging item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessagePayload {
    /// Provider message id.
    #[serde(default)]
    pub mid: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub is_echo: bool,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub attachments: Vec<RawAttachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_reply: Option<QuickReplyPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<ReplyTo>,
}

/// An attachment as delivered by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAttachment {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub payload: RawAttachmentPayload,
}

/// Attachment content; which fields are set depends on the kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAttachmentPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticker_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

/// Location attachment coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub long: f64,
}

/// A quick reply the user tapped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickReplyPayload {
    #[serde(default)]
    pub payload: String,
}

/// Reference to the message being replied to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyTo {
    #[serde(default)]
    pub mid: String,
}

/// The `delivery` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryPayload {
    #[serde(default)]
    pub mids: Vec<String>,
    #[serde(default)]
    pub watermark: i64,
}

/// The `read` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadPayload {
    #[serde(default)]
    pub watermark: i64,
}

/// The `postback` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostbackPayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub payload: String,
}

/// The `reaction` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionPayload {
    /// Provider id of the message reacted to.
    #[serde(default)]
    pub mid: String,
    /// `"react"` or `"unreact"`.
    #[serde(default)]
    pub action: String,
    /// Reaction name, e.g. `"love"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction: Option<String>,
    /// The emoji itself, when supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

/// Webhook subscription handshake query parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionQuery {
    #[serde(rename = "hub.mode", default)]
    pub mode: String,
    #[serde(rename = "hub.verify_token", default)]
    pub verify_token: String,
    #[serde(rename = "hub.challenge", default)]
    pub challenge: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_parsing_with_defaults() {
        let json = r#"{
            "object": "page",
            "entry": [{
                "id": "page1",
                "time": 1700000000000,
                "messaging": [{
                    "sender": {"id": "u1"},
                    "recipient": {"id": "p1"},
                    "timestamp": 1700000000001,
                    "message": {"mid": "m1", "text": "hi"}
                }]
            }]
        }"#;

        let payload: WebhookPayload = serde_json::from_str(json).unwrap();
        assert!(payload.is_messenger());
        assert_eq!(payload.entry.len(), 1);

        let item = &payload.entry[0].messaging[0];
        let message = item.message.as_ref().unwrap();
        assert_eq!(message.mid, "m1");
        assert!(!message.is_echo);
        assert!(message.attachments.is_empty());
        assert!(item.delivery.is_none());
    }

    #[test]
    fn test_subscription_query_field_names() {
        let query: SubscriptionQuery = serde_json::from_str(
            r#"{"hub.mode": "subscribe", "hub.verify_token": "tok", "hub.challenge": "123"}"#,
        )
        .unwrap();
        assert_eq!(query.mode, "subscribe");
        assert_eq!(query.verify_token, "tok");
        assert_eq!(query.challenge, "123");
    }
}
