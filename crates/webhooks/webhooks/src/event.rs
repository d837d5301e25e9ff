//! Platform webhook event types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A verified platform webhook event.
///
/// `id` and `event_type` are guaranteed non-empty by construction; an event
/// failing that check is a verification failure, never a returned value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event identifier assigned by the platform.
    pub id: String,
    /// Event type string, e.g. `"message.received"`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event creation time, Unix seconds.
    pub timestamp: i64,
    /// Opaque event payload.
    #[serde(default)]
    pub data: Value,
}

impl WebhookEvent {
    /// Returns the known event type, if this event carries one.
    pub fn known_type(&self) -> Option<WebhookEventType> {
        WebhookEventType::from_str(&self.event_type)
    }

    /// Checks whether this event is of the given known type.
    pub fn is_event_type(&self, event_type: WebhookEventType) -> bool {
        self.event_type == event_type.as_str()
    }
}

/// Event types published by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WebhookEventType {
    #[serde(rename = "message.received")]
    MessageReceived,
    #[serde(rename = "message.sent")]
    MessageSent,
    #[serde(rename = "message.delivered")]
    MessageDelivered,
    #[serde(rename = "message.read")]
    MessageRead,
    #[serde(rename = "message.failed")]
    MessageFailed,

    #[serde(rename = "conversation.created")]
    ConversationCreated,
    #[serde(rename = "conversation.updated")]
    ConversationUpdated,
    #[serde(rename = "conversation.resolved")]
    ConversationResolved,
    #[serde(rename = "conversation.assigned")]
    ConversationAssigned,

    #[serde(rename = "contact.created")]
    ContactCreated,
    #[serde(rename = "contact.updated")]
    ContactUpdated,
    #[serde(rename = "contact.deleted")]
    ContactDeleted,

    #[serde(rename = "channel.connected")]
    ChannelConnected,
    #[serde(rename = "channel.disconnected")]
    ChannelDisconnected,
    #[serde(rename = "channel.error")]
    ChannelError,

    #[serde(rename = "bot.started")]
    BotStarted,
    #[serde(rename = "bot.stopped")]
    BotStopped,

    #[serde(rename = "flow.started")]
    FlowStarted,
    #[serde(rename = "flow.completed")]
    FlowCompleted,
    #[serde(rename = "flow.failed")]
    FlowFailed,
}

impl WebhookEventType {
    /// The wire string for this event type.
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookEventType::MessageReceived => "message.received",
            WebhookEventType::MessageSent => "message.sent",
            WebhookEventType::MessageDelivered => "message.delivered",
            WebhookEventType::MessageRead => "message.read",
            WebhookEventType::MessageFailed => "message.failed",
            WebhookEventType::ConversationCreated => "conversation.created",
            WebhookEventType::ConversationUpdated => "conversation.updated",
            WebhookEventType::ConversationResolved => "conversation.resolved",
            WebhookEventType::ConversationAssigned => "conversation.assigned",
            WebhookEventType::ContactCreated => "contact.created",
            WebhookEventType::ContactUpdated => "contact.updated",
            WebhookEventType::ContactDeleted => "contact.deleted",
            WebhookEventType::ChannelConnected => "channel.connected",
            WebhookEventType::ChannelDisconnected => "channel.disconnected",
            WebhookEventType::ChannelError => "channel.error",
            WebhookEventType::BotStarted => "bot.started",
            WebhookEventType::BotStopped => "bot.stopped",
            WebhookEventType::FlowStarted => "flow.started",
            WebhookEventType::FlowCompleted => "flow.completed",
            WebhookEventType::FlowFailed => "flow.failed",
        }
    }

    /// Parses a wire string into a known event type.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "message.received" => Some(WebhookEventType::MessageReceived),
            "message.sent" => Some(WebhookEventType::MessageSent),
            "message.delivered" => Some(WebhookEventType::MessageDelivered),
            "message.read" => Some(WebhookEventType::MessageRead),
            "message.failed" => Some(WebhookEventType::MessageFailed),
            "conversation.created" => Some(WebhookEventType::ConversationCreated),
            "conversation.updated" => Some(WebhookEventType::ConversationUpdated),
            "conversation.resolved" => Some(WebhookEventType::ConversationResolved),
            "conversation.assigned" => Some(WebhookEventType::ConversationAssigned),
            "contact.created" => Some(WebhookEventType::ContactCreated),
            "contact.updated" => Some(WebhookEventType::ContactUpdated),
            "contact.deleted" => Some(WebhookEventType::ContactDeleted),
            "channel.connected" => Some(WebhookEventType::ChannelConnected),
            "channel.disconnected" => Some(WebhookEventType::ChannelDisconnected),
            "channel.error" => Some(WebhookEventType::ChannelError),
            "bot.started" => Some(WebhookEventType::BotStarted),
            "bot.stopped" => Some(WebhookEventType::BotStopped),
            "flow.started" => Some(WebhookEventType::FlowStarted),
            "flow.completed" => Some(WebhookEventType::FlowCompleted),
            "flow.failed" => Some(WebhookEventType::FlowFailed),
            _ => None,
        }
    }
}

impl std::fmt::Display for WebhookEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_parsing() {
        let json = r#"{
            "id": "evt_1",
            "type": "message.received",
            "timestamp": 1700000000,
            "data": {"conversationId": "c1"}
        }"#;

        let event: WebhookEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.id, "evt_1");
        assert_eq!(event.event_type, "message.received");
        assert_eq!(event.known_type(), Some(WebhookEventType::MessageReceived));
        assert!(event.is_event_type(WebhookEventType::MessageReceived));
        assert!(!event.is_event_type(WebhookEventType::MessageRead));
    }

    #[test]
    fn test_event_type_round_trip() {
        for s in ["message.received", "conversation.assigned", "flow.failed"] {
            let parsed = WebhookEventType::from_str(s).unwrap();
            assert_eq!(parsed.as_str(), s);
        }
        assert_eq!(WebhookEventType::from_str("not.a.type"), None);
    }

    #[test]
    fn test_missing_data_defaults_to_null() {
        let json = r#"{"id": "evt_1", "type": "contact.created", "timestamp": 1}"#;
        let event: WebhookEvent = serde_json::from_str(json).unwrap();
        assert!(event.data.is_null());
    }
}
