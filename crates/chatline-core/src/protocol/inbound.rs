//! Inbound server events.
//!
//! Decoding is two-step: the `type` tag is read first so an unknown kind is
//! reported as `UnknownKind` (protocol) rather than a field error (decode).
//! Field structs are lenient about extra keys; required keys are required.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ChatlineError, Result};
use crate::protocol::{MessageId, UserId};

/// Kind tag of an inbound message (registry key for handlers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InboundKind {
    ChatMessage,
    MessageSent,
    MessagesRead,
    TypingStatus,
    Typing,
    UserStatus,
    RoomList,
    RoomChange,
    UserJoin,
    UserLeave,
    Notification,
}

impl InboundKind {
    /// Every kind this client models.
    pub const ALL: [InboundKind; 11] = [
        InboundKind::ChatMessage,
        InboundKind::MessageSent,
        InboundKind::MessagesRead,
        InboundKind::TypingStatus,
        InboundKind::Typing,
        InboundKind::UserStatus,
        InboundKind::RoomList,
        InboundKind::RoomChange,
        InboundKind::UserJoin,
        InboundKind::UserLeave,
        InboundKind::Notification,
    ];

    /// Wire tag (`type` field).
    pub fn as_str(self) -> &'static str {
        match self {
            InboundKind::ChatMessage => "chat_message",
            InboundKind::MessageSent => "message_sent",
            InboundKind::MessagesRead => "messages_read",
            InboundKind::TypingStatus => "typing_status",
            InboundKind::Typing => "typing",
            InboundKind::UserStatus => "user_status",
            InboundKind::RoomList => "room_list",
            InboundKind::RoomChange => "room_change",
            InboundKind::UserJoin => "user_join",
            InboundKind::UserLeave => "user_leave",
            InboundKind::Notification => "notification",
        }
    }

    pub fn from_wire(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == tag)
    }
}

impl std::fmt::Display for InboundKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `chat_message`: a message from a peer (direct) or a room member.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "ChatMessageWire")]
pub struct ChatMessage {
    pub message: String,
    pub sender_id: Option<UserId>,
    /// `sender_username` on direct messages, `username` in rooms.
    pub sender_username: Option<String>,
    pub message_id: Option<MessageId>,
    /// ISO-8601, as sent by the server.
    pub timestamp: Option<String>,
    pub room: Option<String>,
}

/// Both sender keys may be present; `sender_username` wins.
#[derive(Deserialize)]
struct ChatMessageWire {
    message: String,
    #[serde(default)]
    sender_id: Option<UserId>,
    #[serde(default)]
    sender_username: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    message_id: Option<MessageId>,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    room: Option<String>,
}

impl From<ChatMessageWire> for ChatMessage {
    fn from(w: ChatMessageWire) -> Self {
        Self {
            message: w.message,
            sender_id: w.sender_id,
            sender_username: w.sender_username.or(w.username),
            message_id: w.message_id,
            timestamp: w.timestamp,
            room: w.room,
        }
    }
}

/// `message_sent`: server confirmation of one of our direct messages.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageSent {
    pub message_id: MessageId,
    pub receiver_id: UserId,
    pub timestamp: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// `messages_read`: `reader_id` has read what we sent them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MessagesRead {
    pub reader_id: UserId,
}

/// `typing_status`: direct-message typing indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TypingStatus {
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub is_typing: bool,
}

/// `typing`: room typing indicator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoomTyping {
    #[serde(default)]
    pub username: Option<String>,
    pub typing: bool,
    #[serde(default)]
    pub room: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Online,
    Offline,
}

/// `user_status`: presence change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct UserStatus {
    pub user_id: UserId,
    pub status: Presence,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoomInfo {
    pub name: String,
    #[serde(default)]
    pub joined: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoomList {
    pub rooms: Vec<RoomInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoomChange {
    pub room: String,
    #[serde(default)]
    pub users: Vec<String>,
}

/// `user_join` / `user_leave`: roster change in the current room.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RosterChange {
    pub username: String,
    #[serde(default)]
    pub users: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Notification {
    pub message: String,
}

/// Decoded inbound message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inbound {
    ChatMessage(ChatMessage),
    MessageSent(MessageSent),
    MessagesRead(MessagesRead),
    TypingStatus(TypingStatus),
    Typing(RoomTyping),
    UserStatus(UserStatus),
    RoomList(RoomList),
    RoomChange(RoomChange),
    UserJoin(RosterChange),
    UserLeave(RosterChange),
    Notification(Notification),
}

impl Inbound {
    pub fn kind(&self) -> InboundKind {
        match self {
            Inbound::ChatMessage(_) => InboundKind::ChatMessage,
            Inbound::MessageSent(_) => InboundKind::MessageSent,
            Inbound::MessagesRead(_) => InboundKind::MessagesRead,
            Inbound::TypingStatus(_) => InboundKind::TypingStatus,
            Inbound::Typing(_) => InboundKind::Typing,
            Inbound::UserStatus(_) => InboundKind::UserStatus,
            Inbound::RoomList(_) => InboundKind::RoomList,
            Inbound::RoomChange(_) => InboundKind::RoomChange,
            Inbound::UserJoin(_) => InboundKind::UserJoin,
            Inbound::UserLeave(_) => InboundKind::UserLeave,
            Inbound::Notification(_) => InboundKind::Notification,
        }
    }
}

/// Decode one text frame.
pub fn decode_inbound(text: &str) -> Result<Inbound> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| ChatlineError::Decode(format!("invalid json: {e}")))?;

    let kind = match value.get("type").and_then(Value::as_str) {
        Some(tag) => InboundKind::from_wire(tag)
            .ok_or_else(|| ChatlineError::UnknownKind(tag.to_string()))?,
        None => return Err(ChatlineError::Decode("missing string field `type`".into())),
    };

    serde_json::from_value(value)
        .map_err(|e| ChatlineError::Decode(format!("invalid {kind}: {e}")))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn wire_tags_round_trip_through_from_wire() {
        for kind in InboundKind::ALL {
            assert_eq!(InboundKind::from_wire(kind.as_str()), Some(kind));
        }
        assert_eq!(InboundKind::from_wire("chat"), None);
    }

    #[test]
    fn decodes_direct_chat_message() {
        let msg = decode_inbound(
            r#"{"type":"chat_message","message":"hey","sender_id":3,"sender_username":"ana","message_id":9,"timestamp":"2024-01-01T10:00:00+00:00"}"#,
        )
        .unwrap();
        let Inbound::ChatMessage(m) = msg else { panic!("wrong variant") };
        assert_eq!(m.sender_id, Some(3));
        assert_eq!(m.sender_username.as_deref(), Some("ana"));
        assert_eq!(m.message_id, Some(9));
    }

    #[test]
    fn room_username_alias() {
        let msg = decode_inbound(r#"{"type":"chat_message","message":"hi","username":"bo","room":"lobby"}"#).unwrap();
        let Inbound::ChatMessage(m) = msg else { panic!("wrong variant") };
        assert_eq!(m.sender_username.as_deref(), Some("bo"));
        assert_eq!(m.room.as_deref(), Some("lobby"));
    }

    #[test]
    fn sender_username_wins_over_room_username() {
        let msg = decode_inbound(
            r#"{"type":"chat_message","message":"hi","sender_username":"ana","username":"bo"}"#,
        )
        .unwrap();
        let Inbound::ChatMessage(m) = msg else { panic!("wrong variant") };
        assert_eq!(m.sender_username.as_deref(), Some("ana"));
    }

    #[test]
    fn unknown_type_is_protocol_error() {
        let err = decode_inbound(r#"{"type":"reconnected"}"#).unwrap_err();
        assert_eq!(err.kind().as_str(), "PROTOCOL");
    }

    #[test]
    fn missing_required_field_is_decode_error() {
        let err = decode_inbound(r#"{"type":"message_sent","message_id":1}"#).unwrap_err();
        assert_eq!(err.kind().as_str(), "DECODE");
    }
}
