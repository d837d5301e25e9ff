//! Single-pass webhook event normalization.
//!
//! Every messaging-like item is tested against all five extraction rules in
//! one pass; an item carrying, say, both a message and a delivery marker
//! yields one event per rule. Consumers filter the resulting tagged list by
//! variant instead of re-scanning the payload per category.

use linktor_core::{
    Attachment, ChannelEvent, DeliveryStatus, InboundMessage, Postback, Reaction, ReactionAction,
    ReadStatus,
};

use crate::types::{InboundMessagePayload, MessagingEvent, RawAttachment, WebhookPayload};

/// Normalizes a provider payload into canonical channel events.
///
/// Pure and infallible: items that satisfy no rule contribute nothing, and
/// missing sub-fields degrade to empty or absent fields. Both `messaging`
/// and `standby` lists are scanned, with the owning entry id attached as the
/// channel id. Echo and deleted flags are preserved, never filtered here.
pub fn normalize(payload: &WebhookPayload) -> Vec<ChannelEvent> {
    let mut events = Vec::new();

    for entry in &payload.entry {
        for item in entry.messaging.iter().chain(entry.standby.iter()) {
            extract_item(item, &entry.id, &mut events);
        }
    }

    events
}

fn extract_item(item: &MessagingEvent, channel_id: &str, out: &mut Vec<ChannelEvent>) {
    if let Some(message) = &item.message {
        out.push(ChannelEvent::Message(convert_message(item, message, channel_id)));
    }

    if let Some(delivery) = &item.delivery {
        out.push(ChannelEvent::Delivery(DeliveryStatus {
            message_ids: delivery.mids.clone(),
            watermark: delivery.watermark,
            channel_id: channel_id.to_string(),
        }));
    }

    if let Some(read) = &item.read {
        out.push(ChannelEvent::Read(ReadStatus {
            watermark: read.watermark,
            channel_id: channel_id.to_string(),
        }));
    }

    if let Some(postback) = &item.postback {
        out.push(ChannelEvent::Postback(Postback {
            title: postback.title.clone(),
            payload: postback.payload.clone(),
            sender_id: item.sender.id.clone(),
            channel_id: channel_id.to_string(),
        }));
    }

    if let Some(reaction) = &item.reaction {
        out.push(ChannelEvent::Reaction(Reaction {
            message_id: reaction.mid.clone(),
            action: if reaction.action == "unreact" {
                ReactionAction::Unreact
            } else {
                ReactionAction::React
            },
            emoji: reaction.emoji.clone().or_else(|| reaction.reaction.clone()),
            sender_id: item.sender.id.clone(),
            channel_id: channel_id.to_string(),
        }));
    }
}

fn convert_message(
    item: &MessagingEvent,
    message: &InboundMessagePayload,
    channel_id: &str,
) -> InboundMessage {
    let mut normalized =
        InboundMessage::new(&message.mid, &item.sender.id, &item.recipient.id, channel_id);
    normalized.text = message.text.clone();
    normalized.is_echo = message.is_echo;
    normalized.is_deleted = message.is_deleted;
    normalized.quick_reply_payload = message.quick_reply.as_ref().map(|q| q.payload.clone());
    normalized.reply_to_id = message.reply_to.as_ref().map(|r| r.mid.clone());
    normalized.timestamp = item.timestamp;
    normalized.attachments = message.attachments.iter().map(convert_attachment).collect();
    normalized
}

fn convert_attachment(raw: &RawAttachment) -> Attachment {
    // Stickers arrive as image attachments carrying a sticker id.
    if let Some(sticker_id) = raw.payload.sticker_id {
        return Attachment::Sticker { sticker_id };
    }

    match (raw.kind.as_str(), &raw.payload.url) {
        ("image", Some(url)) => Attachment::Image { url: url.clone() },
        ("video", Some(url)) => Attachment::Video { url: url.clone() },
        ("audio", Some(url)) => Attachment::Audio { url: url.clone() },
        ("file", Some(url)) => Attachment::File { url: url.clone() },
        ("location", _) => match raw.payload.coordinates {
            Some(coords) => Attachment::Location { lat: coords.lat, long: coords.long },
            None => Attachment::Fallback {
                title: raw.payload.title.clone(),
                url: raw.payload.url.clone(),
            },
        },
        _ => Attachment::Fallback {
            title: raw.payload.title.clone(),
            url: raw.payload.url.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> WebhookPayload {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_minimal_message() {
        let payload = parse(
            r#"{
                "object": "page",
                "entry": [{
                    "id": "p1",
                    "time": 1,
                    "messaging": [{
                        "sender": {"id": "u1"},
                        "recipient": {"id": "p1"},
                        "timestamp": 1,
                        "message": {"mid": "m1", "text": "hi"}
                    }]
                }]
            }"#,
        );

        let events = normalize(&payload);
        assert_eq!(events.len(), 1);
        match &events[0] {
            ChannelEvent::Message(msg) => {
                assert_eq!(msg.sender_id, "u1");
                assert_eq!(msg.recipient_id, "p1");
                assert_eq!(msg.text, "hi");
                assert_eq!(msg.external_id, "m1");
                assert_eq!(msg.channel_id, "p1");
                assert_eq!(msg.timestamp, 1);
            }
            other => panic!("expected message, got {other:?}"),
        }
    }

    #[test]
    fn test_item_with_message_and_delivery_yields_both() {
        let payload = parse(
            r#"{
                "object": "page",
                "entry": [{
                    "id": "p1",
                    "time": 1,
                    "messaging": [{
                        "sender": {"id": "u1"},
                        "recipient": {"id": "p1"},
                        "timestamp": 5,
                        "message": {"mid": "m1", "text": "hi"},
                        "delivery": {"mids": ["m0"], "watermark": 4}
                    }]
                }]
            }"#,
        );

        let events = normalize(&payload);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], ChannelEvent::Message(_)));
        match &events[1] {
            ChannelEvent::Delivery(delivery) => {
                assert_eq!(delivery.message_ids, vec!["m0".to_string()]);
                assert_eq!(delivery.watermark, 4);
            }
            other => panic!("expected delivery, got {other:?}"),
        }
    }

    #[test]
    fn test_standby_items_are_scanned() {
        let payload = parse(
            r#"{
                "object": "page",
                "entry": [{
                    "id": "p1",
                    "time": 1,
                    "standby": [{
                        "sender": {"id": "u2"},
                        "recipient": {"id": "p1"},
                        "timestamp": 2,
                        "message": {"mid": "m2", "text": "standby"}
                    }]
                }]
            }"#,
        );

        let events = normalize(&payload);
        assert_eq!(events.len(), 1);
        match &events[0] {
            ChannelEvent::Message(msg) => assert_eq!(msg.text, "standby"),
            other => panic!("expected message, got {other:?}"),
        }
    }

    #[test]
    fn test_read_postback_reaction() {
        let payload = parse(
            r#"{
                "object": "page",
                "entry": [{
                    "id": "p1",
                    "time": 1,
                    "messaging": [
                        {
                            "sender": {"id": "u1"},
                            "recipient": {"id": "p1"},
                            "timestamp": 1,
                            "read": {"watermark": 99}
                        },
                        {
                            "sender": {"id": "u1"},
                            "recipient": {"id": "p1"},
                            "timestamp": 2,
                            "postback": {"title": "Buy", "payload": "BUY_1"}
                        },
                        {
                            "sender": {"id": "u1"},
                            "recipient": {"id": "p1"},
                            "timestamp": 3,
                            "reaction": {"mid": "m1", "action": "unreact", "emoji": "❤️"}
                        }
                    ]
                }]
            }"#,
        );

        let events = normalize(&payload);
        assert_eq!(events.len(), 3);

        match &events[0] {
            ChannelEvent::Read(read) => assert_eq!(read.watermark, 99),
            other => panic!("expected read, got {other:?}"),
        }
        match &events[1] {
            ChannelEvent::Postback(postback) => {
                assert_eq!(postback.title, "Buy");
                assert_eq!(postback.payload, "BUY_1");
                assert_eq!(postback.sender_id, "u1");
            }
            other => panic!("expected postback, got {other:?}"),
        }
        match &events[2] {
            ChannelEvent::Reaction(reaction) => {
                assert_eq!(reaction.message_id, "m1");
                assert_eq!(reaction.action, ReactionAction::Unreact);
                assert_eq!(reaction.emoji.as_deref(), Some("❤️"));
            }
            other => panic!("expected reaction, got {other:?}"),
        }
    }

    #[test]
    fn test_echo_and_deleted_flags_preserved() {
        let payload = parse(
            r#"{
                "object": "page",
                "entry": [{
                    "id": "p1",
                    "time": 1,
                    "messaging": [{
                        "sender": {"id": "p1"},
                        "recipient": {"id": "u1"},
                        "timestamp": 1,
                        "message": {"mid": "m1", "text": "echo", "is_echo": true, "is_deleted": true}
                    }]
                }]
            }"#,
        );

        let events = normalize(&payload);
        assert_eq!(events.len(), 1);
        match &events[0] {
            ChannelEvent::Message(msg) => {
                assert!(msg.is_echo);
                assert!(msg.is_deleted);
            }
            other => panic!("expected message, got {other:?}"),
        }
    }

    #[test]
    fn test_quick_reply_and_reply_to_folded_into_fields() {
        let payload = parse(
            r#"{
                "object": "page",
                "entry": [{
                    "id": "p1",
                    "time": 1,
                    "messaging": [{
                        "sender": {"id": "u1"},
                        "recipient": {"id": "p1"},
                        "timestamp": 1,
                        "message": {
                            "mid": "m3",
                            "text": "Yes",
                            "quick_reply": {"payload": "CONFIRM_YES"},
                            "reply_to": {"mid": "m1"}
                        }
                    }]
                }]
            }"#,
        );

        let events = normalize(&payload);
        match &events[0] {
            ChannelEvent::Message(msg) => {
                assert_eq!(msg.quick_reply_payload.as_deref(), Some("CONFIRM_YES"));
                assert_eq!(msg.reply_to_id.as_deref(), Some("m1"));
            }
            other => panic!("expected message, got {other:?}"),
        }
    }

    #[test]
    fn test_attachment_shapes() {
        let payload = parse(
            r#"{
                "object": "page",
                "entry": [{
                    "id": "p1",
                    "time": 1,
                    "messaging": [{
                        "sender": {"id": "u1"},
                        "recipient": {"id": "p1"},
                        "timestamp": 1,
                        "message": {
                            "mid": "m4",
                            "attachments": [
                                {"type": "image", "payload": {"url": "https://cdn/img.png"}},
                                {"type": "image", "payload": {"sticker_id": 369}},
                                {"type": "location", "payload": {"coordinates": {"lat": -23.5, "long": -46.6}}},
                                {"type": "fallback", "payload": {"title": "A link", "url": "https://example.com"}},
                                {"type": "video", "payload": {}}
                            ]
                        }
                    }]
                }]
            }"#,
        );

        let events = normalize(&payload);
        let ChannelEvent::Message(msg) = &events[0] else {
            panic!("expected message");
        };

        assert_eq!(msg.attachments.len(), 5);
        assert_eq!(msg.attachments[0], Attachment::Image { url: "https://cdn/img.png".into() });
        assert_eq!(msg.attachments[1], Attachment::Sticker { sticker_id: 369 });
        assert_eq!(msg.attachments[2], Attachment::Location { lat: -23.5, long: -46.6 });
        assert_eq!(
            msg.attachments[3],
            Attachment::Fallback {
                title: Some("A link".into()),
                url: Some("https://example.com".into())
            }
        );
        // Media attachment without a URL degrades instead of failing.
        assert_eq!(msg.attachments[4], Attachment::Fallback { title: None, url: None });
    }

    #[test]
    fn test_changes_entries_ignored() {
        let payload = parse(
            r#"{
                "object": "page",
                "entry": [{
                    "id": "p1",
                    "time": 1,
                    "changes": [{"field": "feed", "value": {"item": "post"}}]
                }]
            }"#,
        );

        assert!(normalize(&payload).is_empty());
    }
}
