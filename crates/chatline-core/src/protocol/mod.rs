//! Protocol modules (JSON text frames with a `type` discriminator).
//!
//! - Outbound: client intents (chat message, typing, read receipt, room join),
//!   validated at construction and encoded to the server's two dialects
//!   (direct messages keyed by `receiver_id`, rooms keyed by `room`).
//! - Inbound: server events decoded into a closed tagged enum.
//!
//! Decoding is panic-free: malformed input is reported as `ChatlineError`,
//! split between `Decode` (bad JSON / bad fields) and `UnknownKind` (a `type`
//! this client does not model).

pub mod inbound;
pub mod outbound;

pub use inbound::{decode_inbound, Inbound, InboundKind};
pub use outbound::{Outbound, OutboundBody, OutboundKind};

/// Server-assigned user id.
pub type UserId = i64;

/// Server-assigned durable message id.
pub type MessageId = i64;

/// Addressee of an outbound intent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// Direct conversation with one user (`receiver_id` on the wire).
    User(UserId),
    /// Named room (`room` on the wire).
    Room(String),
}

impl Target {
    pub fn room(name: impl Into<String>) -> Self {
        Target::Room(name.into())
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::User(id) => write!(f, "user:{id}"),
            Target::Room(name) => write!(f, "room:{name}"),
        }
    }
}
