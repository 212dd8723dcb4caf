//! Chat records and server response envelopes for Parley.
//!
//! Field names follow the server's JSON exactly (`_id`, `senderId`,
//! `receiverId`, `createdAt`); the Rust side uses snake_case.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::{ChatError, MessageId, PeerId};

/// Content of a message. At least one of `text` or `image` is expected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    /// Plain text body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Image reference (URL or data URI, opaque to the client)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A locally authored message that has not been accepted by the server yet.
///
/// Drafts are only ever sent; the message list receives the server's echo.
pub type Draft = Payload;

impl Payload {
    /// Create a text-only payload.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            image: None,
        }
    }

    /// Attach an image reference.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// True when there is nothing to send.
    pub fn is_empty(&self) -> bool {
        let blank = |s: &Option<String>| s.as_deref().map_or(true, |v| v.trim().is_empty());
        blank(&self.text) && blank(&self.image)
    }
}

/// A chat message record as stored by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Server-assigned identifier
    #[serde(rename = "_id")]
    pub id: MessageId,
    /// Author of the message
    pub sender_id: PeerId,
    /// Addressee of the message
    #[serde(
        rename = "receiverId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub recipient_id: Option<PeerId>,
    /// Message content
    #[serde(flatten)]
    pub payload: Payload,
    /// Whether the recipient has viewed the message
    #[serde(default)]
    pub seen: bool,
    /// Server timestamp, kept verbatim (ISO-8601)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Message {
    /// Decode a message from a JSON value (a push payload or a history element).
    pub fn from_value(value: Value) -> Result<Self, ChatError> {
        serde_json::from_value(value).map_err(ChatError::Decode)
    }

    /// Encode this message as a JSON value.
    pub fn to_value(&self) -> Result<Value, ChatError> {
        serde_json::to_value(self).map_err(ChatError::Encode)
    }
}

/// A directory entry for the other side of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Peer {
    /// Server-assigned identifier
    #[serde(rename = "_id")]
    pub id: PeerId,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Contact email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Avatar reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,
    /// Free-form profile text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl Peer {
    /// Name to show for this peer, falling back to the raw identifier.
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(self.id.as_str())
    }
}

/// Body of a successful roster response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RosterResponse {
    /// All peers the user can talk to
    #[serde(default)]
    pub users: Vec<Peer>,
    /// Unread counts per peer; `null` or absent means none
    #[serde(default, rename = "unseenMessages")]
    pub unseen_messages: Option<HashMap<PeerId, u32>>,
}

impl RosterResponse {
    /// Split into the peer list and the unseen snapshot (absent ⇒ empty).
    pub fn into_parts(self) -> (Vec<Peer>, HashMap<PeerId, u32>) {
        (self.users, self.unseen_messages.unwrap_or_default())
    }
}

/// Body of a successful send response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SendResponse {
    /// The canonical record created by the server
    #[serde(rename = "newMessage")]
    pub new_message: Message,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ===========================================
    // Message Decoding
    // ===========================================

    #[test]
    fn message_decodes_server_shape() {
        let value = json!({
            "_id": "m1",
            "senderId": "alice",
            "receiverId": "bob",
            "text": "hi",
            "seen": false,
            "createdAt": "2024-05-01T10:00:00.000Z"
        });

        let msg = Message::from_value(value).unwrap();
        assert_eq!(msg.id, MessageId::from("m1"));
        assert_eq!(msg.sender_id, PeerId::from("alice"));
        assert_eq!(msg.recipient_id, Some(PeerId::from("bob")));
        assert_eq!(msg.payload.text.as_deref(), Some("hi"));
        assert!(msg.payload.image.is_none());
        assert!(!msg.seen);
        assert_eq!(msg.created_at.as_deref(), Some("2024-05-01T10:00:00.000Z"));
    }

    #[test]
    fn message_tolerates_missing_optional_fields() {
        let msg = Message::from_value(json!({ "_id": "x", "senderId": "A" })).unwrap();
        assert!(!msg.seen);
        assert!(msg.recipient_id.is_none());
        assert!(msg.created_at.is_none());
        assert_eq!(msg.payload, Payload::default());
    }

    #[test]
    fn message_without_sender_is_rejected() {
        let result = Message::from_value(json!({ "_id": "x", "text": "orphan" }));
        assert!(matches!(result, Err(ChatError::Decode(_))));
    }

    #[test]
    fn message_encodes_with_server_field_names() {
        let msg = Message {
            id: MessageId::from("m2"),
            sender_id: PeerId::from("a"),
            recipient_id: Some(PeerId::from("b")),
            payload: Payload::text("yo").with_image("https://img/1.png"),
            seen: true,
            created_at: None,
        };

        let value = msg.to_value().unwrap();
        assert_eq!(value["_id"], "m2");
        assert_eq!(value["senderId"], "a");
        assert_eq!(value["receiverId"], "b");
        assert_eq!(value["text"], "yo");
        assert_eq!(value["image"], "https://img/1.png");
        assert_eq!(value["seen"], true);
        assert!(value.get("createdAt").is_none());
    }

    // ===========================================
    // Payload
    // ===========================================

    #[test]
    fn blank_payload_is_empty() {
        assert!(Payload::default().is_empty());
        assert!(Payload::text("   ").is_empty());
        assert!(!Payload::text("hello").is_empty());
        assert!(!Payload::default().with_image("data:image/png;base64,AA").is_empty());
    }

    #[test]
    fn draft_serializes_only_present_fields() {
        let body = serde_json::to_value(Draft::text("hello")).unwrap();
        assert_eq!(body, json!({ "text": "hello" }));
    }

    // ===========================================
    // Roster / Send Envelopes
    // ===========================================

    #[test]
    fn roster_with_snapshot() {
        let roster: RosterResponse = serde_json::from_value(json!({
            "success": true,
            "users": [{ "_id": "A", "fullName": "Ann" }, { "_id": "B" }],
            "unseenMessages": { "A": 2 }
        }))
        .unwrap();

        let (peers, unseen) = roster.into_parts();
        assert_eq!(peers.len(), 2);
        assert_eq!(peers[0].display_name(), "Ann");
        assert_eq!(peers[1].display_name(), "B");
        assert_eq!(unseen.get(&PeerId::from("A")), Some(&2));
        assert_eq!(unseen.len(), 1);
    }

    #[test]
    fn roster_null_or_missing_snapshot_is_empty() {
        let missing: RosterResponse =
            serde_json::from_value(json!({ "success": true, "users": [] })).unwrap();
        assert!(missing.into_parts().1.is_empty());

        let null: RosterResponse = serde_json::from_value(
            json!({ "success": true, "users": [], "unseenMessages": null }),
        )
        .unwrap();
        assert!(null.into_parts().1.is_empty());
    }

    #[test]
    fn send_response_carries_canonical_record() {
        let resp: SendResponse = serde_json::from_value(json!({
            "success": true,
            "newMessage": { "_id": "srv-1", "senderId": "me", "receiverId": "A", "text": "hi" }
        }))
        .unwrap();
        assert_eq!(resp.new_message.id, MessageId::from("srv-1"));
    }
}
