//! Canonical channel event model.
//!
//! Every provider adapter normalizes its webhook payloads into the
//! `ChannelEvent` union defined here. Consumers filter by variant instead of
//! re-scanning provider payloads per category.

use serde::{Deserialize, Serialize};

/// A single canonical event extracted from a provider webhook.
///
/// One raw provider item may satisfy more than one extraction rule and
/// therefore produce more than one `ChannelEvent`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChannelEvent {
    /// An inbound message from an end user (or an echo of an outbound one).
    Message(InboundMessage),
    /// Provider confirmation that messages were delivered.
    Delivery(DeliveryStatus),
    /// Provider confirmation that messages were read.
    Read(ReadStatus),
    /// A structured button-tap interaction.
    Postback(Postback),
    /// A reaction added to or removed from a message.
    Reaction(Reaction),
}

impl ChannelEvent {
    /// Returns the channel (provider entry) id this event belongs to.
    pub fn channel_id(&self) -> &str {
        match self {
            ChannelEvent::Message(m) => &m.channel_id,
            ChannelEvent::Delivery(d) => &d.channel_id,
            ChannelEvent::Read(r) => &r.channel_id,
            ChannelEvent::Postback(p) => &p.channel_id,
            ChannelEvent::Reaction(r) => &r.channel_id,
        }
    }
}

/// A normalized inbound message.
///
/// Echo and deletion flags are preserved as data; whether echoes are
/// suppressed is the consumer's decision, not the normalizer's.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InboundMessage {
    /// Internally assigned identifier.
    pub id: String,
    /// Provider-assigned message identifier.
    pub external_id: String,
    /// Sender identifier within the provider.
    pub sender_id: String,
    /// Recipient identifier within the provider.
    pub recipient_id: String,
    /// Owning channel (provider entry/page) identifier.
    pub channel_id: String,
    /// Message text, empty for attachment-only messages.
    #[serde(default)]
    pub text: String,
    /// Normalized attachments, in provider order.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// True when this is an echo of a message the platform sent.
    #[serde(default)]
    pub is_echo: bool,
    /// True when the sender deleted the message.
    #[serde(default)]
    pub is_deleted: bool,
    /// Payload of the quick reply the user tapped, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_reply_payload: Option<String>,
    /// Provider id of the message this one replies to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<String>,
    /// Provider timestamp, epoch milliseconds.
    pub timestamp: i64,
}

impl InboundMessage {
    /// Creates a message with a fresh internal id and empty optional fields.
    pub fn new(
        external_id: impl Into<String>,
        sender_id: impl Into<String>,
        recipient_id: impl Into<String>,
        channel_id: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            external_id: external_id.into(),
            sender_id: sender_id.into(),
            recipient_id: recipient_id.into(),
            channel_id: channel_id.into(),
            text: String::new(),
            attachments: Vec::new(),
            is_echo: false,
            is_deleted: false,
            quick_reply_payload: None,
            reply_to_id: None,
            timestamp: 0,
        }
    }
}

/// A normalized message attachment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Attachment {
    /// Image attachment with a media URL.
    Image { url: String },
    /// Video attachment with a media URL.
    Video { url: String },
    /// Audio attachment with a media URL.
    Audio { url: String },
    /// Generic file attachment with a media URL.
    File { url: String },
    /// Shared location.
    Location { lat: f64, long: f64 },
    /// Sticker, identified by the provider sticker id.
    Sticker { sticker_id: i64 },
    /// Link preview or unrecognized attachment.
    Fallback {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
}

/// Delivery confirmation for one or more messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryStatus {
    /// Provider-assigned ids of the delivered messages.
    #[serde(default)]
    pub message_ids: Vec<String>,
    /// All messages up to this marker are delivered. Epoch milliseconds,
    /// monotonic per conversation.
    pub watermark: i64,
    /// Owning channel identifier.
    pub channel_id: String,
}

/// Read confirmation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReadStatus {
    /// All messages up to this marker are read. Epoch milliseconds.
    pub watermark: i64,
    /// Owning channel identifier.
    pub channel_id: String,
}

/// A button postback interaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Postback {
    /// Button title as shown to the user.
    pub title: String,
    /// Developer-defined payload attached to the button.
    pub payload: String,
    /// Sender identifier.
    pub sender_id: String,
    /// Owning channel identifier.
    pub channel_id: String,
}

/// A reaction added to or removed from a message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    /// Provider id of the message reacted to.
    pub message_id: String,
    /// Whether the reaction was added or removed.
    pub action: ReactionAction,
    /// The emoji, when the provider supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    /// Sender identifier.
    pub sender_id: String,
    /// Owning channel identifier.
    pub channel_id: String,
}

/// Reaction direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReactionAction {
    React,
    Unreact,
}
