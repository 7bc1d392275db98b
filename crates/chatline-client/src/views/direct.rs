//! One-to-one conversation with a peer.

use chrono::{DateTime, Utc};

use chatline_core::error::Result;
use chatline_core::protocol::inbound::Presence;
use chatline_core::protocol::{Inbound, InboundKind, Outbound, OutboundBody, Target, UserId};

use crate::rest::MessagesResponse;
use crate::views::conversation::{Conversation, Reconcile};
use crate::views::ChatView;

const KINDS: &[InboundKind] = &[
    InboundKind::ChatMessage,
    InboundKind::MessageSent,
    InboundKind::MessagesRead,
    InboundKind::TypingStatus,
    InboundKind::UserStatus,
];

#[derive(Debug)]
pub struct DirectChat {
    peer_id: UserId,
    peer_name: String,
    peer_online: bool,
    peer_typing: bool,
    log: Conversation,
}

impl DirectChat {
    pub fn new(peer_id: UserId, peer_name: impl Into<String>) -> Self {
        Self {
            peer_id,
            peer_name: peer_name.into(),
            peer_online: false,
            peer_typing: false,
            log: Conversation::new(),
        }
    }

    pub fn peer_id(&self) -> UserId {
        self.peer_id
    }

    pub fn peer_name(&self) -> &str {
        &self.peer_name
    }

    pub fn is_peer_online(&self) -> bool {
        self.peer_online
    }

    pub fn is_peer_typing(&self) -> bool {
        self.peer_typing
    }

    /// "<peer> is typing..." while the peer types.
    pub fn typing_banner(&self) -> Option<String> {
        self.peer_typing.then(|| format!("{} is typing...", self.peer_name))
    }

    pub fn log(&self) -> &Conversation {
        &self.log
    }

    pub fn target(&self) -> Target {
        Target::User(self.peer_id)
    }

    /// Build the outbound message for `text` and show it as pending.
    pub fn compose(&mut self, text: &str, now: DateTime<Utc>) -> Result<Outbound> {
        let out = Outbound::chat(self.target(), text)?;
        if let OutboundBody::ChatMessage { message, .. } = out.body() {
            self.log.push_pending(message, now);
        }
        Ok(out)
    }

    /// Replace the log with fetched history; returns the read receipt to send.
    pub fn load_history(&mut self, resp: &MessagesResponse) -> Outbound {
        self.peer_online = resp.user.is_online;
        self.log.load_history(&resp.messages);
        Outbound::read_receipt(self.peer_id)
    }
}

impl ChatView for DirectChat {
    fn kinds(&self) -> &'static [InboundKind] {
        KINDS
    }

    fn apply(&mut self, msg: &Inbound) -> Option<Outbound> {
        match msg {
            Inbound::ChatMessage(m) if m.room.is_none() && m.sender_id == Some(self.peer_id) => {
                if !self.log.receive(m.message_id, &m.message, m.timestamp.as_deref()) {
                    return None;
                }
                self.peer_typing = false;
                Some(Outbound::read_receipt(self.peer_id))
            }
            Inbound::MessageSent(m) if m.receiver_id == self.peer_id => {
                let r = self.log.confirm(m.message_id, m.message.as_deref(), &m.timestamp);
                if r == Reconcile::Ignored {
                    tracing::debug!(message_id = m.message_id, "confirmation without pending entry");
                }
                None
            }
            Inbound::MessagesRead(r) if r.reader_id == self.peer_id => {
                self.log.mark_sent_read();
                None
            }
            Inbound::TypingStatus(t) if t.user_id == Some(self.peer_id) => {
                self.peer_typing = t.is_typing;
                None
            }
            Inbound::UserStatus(s) if s.user_id == self.peer_id => {
                self.peer_online = s.status == Presence::Online;
                None
            }
            _ => None,
        }
    }
}
