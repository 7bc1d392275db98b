//! Chat views: conversation state folded from inbound events.
//!
//! Views are plain data plus `apply`; `attach` wires one into a client's
//! handler registry and forwards the replies it produces (read receipts).

pub mod conversation;
pub mod direct;
pub mod room;

use std::sync::{Arc, Mutex, PoisonError};

use chatline_core::protocol::{Inbound, InboundKind, Outbound};

use crate::realtime::ClientHandle;

pub use conversation::{ChatEntry, Conversation, EntryId, Reconcile};
pub use direct::DirectChat;
pub use room::{RoomChat, RoomLine};

pub trait ChatView: Send + 'static {
    /// Kinds this view consumes.
    fn kinds(&self) -> &'static [InboundKind];

    /// Fold one event; may return a message to send in reply.
    fn apply(&mut self, msg: &Inbound) -> Option<Outbound>;
}

/// Register `view` as the handler of every kind it consumes.
///
/// Replaces whatever handlers were registered for those kinds.
pub fn attach<V: ChatView>(view: Arc<Mutex<V>>, handle: &ClientHandle) {
    let kinds = view.lock().unwrap_or_else(PoisonError::into_inner).kinds();
    for &kind in kinds {
        let view = view.clone();
        let outbox = handle.outbox().clone();
        handle.on_message(kind, move |msg: &Inbound| {
            let reply = view.lock().unwrap_or_else(PoisonError::into_inner).apply(msg);
            if let Some(out) = reply {
                if let Err(e) = outbox.post(out) {
                    tracing::debug!(error = %e, "view reply dropped");
                }
            }
        });
    }
}
