//! Outbound intents.
//!
//! An `Outbound` can only be built through its constructors, so an empty chat
//! body never exists as a value. Encoding goes through `json!` builders rather
//! than derived `Serialize` because the target decides which dialect (field
//! names and `type` tag) the server expects.

use serde_json::{json, Value};

use crate::error::{ChatlineError, Result};
use crate::protocol::{Target, UserId};

/// Kind tag of an outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutboundKind {
    ChatMessage,
    Typing,
    ReadReceipt,
    JoinRoom,
}

impl OutboundKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OutboundKind::ChatMessage => "chat_message",
            OutboundKind::Typing => "typing",
            OutboundKind::ReadReceipt => "read_messages",
            OutboundKind::JoinRoom => "join_room",
        }
    }
}

/// Kind-specific fields of an outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundBody {
    ChatMessage { target: Target, message: String },
    Typing { target: Target, is_typing: bool },
    ReadReceipt { sender_id: UserId },
    JoinRoom { room: String },
}

/// Immutable outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    body: OutboundBody,
}

impl Outbound {
    /// Chat message; the body is trimmed and must not be empty.
    pub fn chat(target: Target, text: &str) -> Result<Self> {
        let message = text.trim();
        if message.is_empty() {
            return Err(ChatlineError::EmptyMessage);
        }
        Ok(Self {
            body: OutboundBody::ChatMessage {
                target,
                message: message.to_string(),
            },
        })
    }

    pub fn typing(target: Target, is_typing: bool) -> Self {
        Self {
            body: OutboundBody::Typing { target, is_typing },
        }
    }

    /// Tell the server we read everything `sender_id` sent us.
    pub fn read_receipt(sender_id: UserId) -> Self {
        Self {
            body: OutboundBody::ReadReceipt { sender_id },
        }
    }

    pub fn join_room(room: impl Into<String>) -> Self {
        Self {
            body: OutboundBody::JoinRoom { room: room.into() },
        }
    }

    pub fn body(&self) -> &OutboundBody {
        &self.body
    }

    pub fn kind(&self) -> OutboundKind {
        match self.body {
            OutboundBody::ChatMessage { .. } => OutboundKind::ChatMessage,
            OutboundBody::Typing { .. } => OutboundKind::Typing,
            OutboundBody::ReadReceipt { .. } => OutboundKind::ReadReceipt,
            OutboundBody::JoinRoom { .. } => OutboundKind::JoinRoom,
        }
    }

    /// Wire JSON for this message.
    pub fn to_json(&self) -> Value {
        match &self.body {
            OutboundBody::ChatMessage { target: Target::User(id), message } => json!({
                "type": "chat_message",
                "message": message,
                "receiver_id": id,
            }),
            OutboundBody::ChatMessage { target: Target::Room(room), message } => json!({
                "type": "chat_message",
                "message": message,
                "room": room,
            }),
            OutboundBody::Typing { target: Target::User(id), is_typing } => json!({
                "type": "typing_status",
                "receiver_id": id,
                "is_typing": is_typing,
            }),
            OutboundBody::Typing { target: Target::Room(room), is_typing } => json!({
                "type": "typing",
                "room": room,
                "typing": is_typing,
            }),
            OutboundBody::ReadReceipt { sender_id } => json!({
                "type": "read_messages",
                "sender_id": sender_id,
            }),
            OutboundBody::JoinRoom { room } => json!({
                "type": "join_room",
                "room": room,
            }),
        }
    }

    /// Serialize to a text frame.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(&self.to_json())
            .map_err(|e| ChatlineError::Internal(format!("json encode failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn chat_rejects_blank_body() {
        let err = Outbound::chat(Target::User(7), "   \n").unwrap_err();
        assert_eq!(err.kind().as_str(), "USER_INPUT");
    }

    #[test]
    fn chat_body_is_trimmed() {
        let out = Outbound::chat(Target::User(7), "  hi \n").unwrap();
        assert_eq!(out.to_json(), json!({"type": "chat_message", "message": "hi", "receiver_id": 7}));
    }

    #[test]
    fn typing_dialect_follows_target() {
        let dm = Outbound::typing(Target::User(3), true).to_json();
        assert_eq!(dm, json!({"type": "typing_status", "receiver_id": 3, "is_typing": true}));

        let room = Outbound::typing(Target::room("lobby"), false).to_json();
        assert_eq!(room, json!({"type": "typing", "room": "lobby", "typing": false}));
    }

    #[test]
    fn room_chat_and_join() {
        let msg = Outbound::chat(Target::room("general"), "yo").unwrap();
        assert_eq!(msg.kind(), OutboundKind::ChatMessage);
        assert_eq!(msg.to_json(), json!({"type": "chat_message", "message": "yo", "room": "general"}));

        let join = Outbound::join_room("general");
        let wire: Value = serde_json::from_str(&join.encode().unwrap()).unwrap();
        assert_eq!(wire, json!({"type": "join_room", "room": "general"}));
    }
}
