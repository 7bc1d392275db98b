//! Optimistic message log of one conversation.
//!
//! Own messages are appended immediately under a temporary id and replaced in
//! place when the server confirms them with a durable id. An id is never
//! present twice.

use chrono::{DateTime, Utc};

use chatline_core::protocol::MessageId;

use crate::format::parse_timestamp;
use crate::rest::HistoryMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryId {
    /// Client-generated, awaiting confirmation.
    Pending(u64),
    Server(MessageId),
    /// Peer message delivered without an id.
    Unnumbered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    pub id: EntryId,
    pub content: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub is_sent_by_me: bool,
    pub is_read: bool,
}

impl ChatEntry {
    pub fn is_pending(&self) -> bool {
        matches!(self.id, EntryId::Pending(_))
    }
}

/// Result of folding a server confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconcile {
    /// The pending entry with this temporary id now carries the durable id.
    Replaced(u64),
    /// No pending entry matched; the confirmed message was appended.
    Appended,
    /// The durable id was already in the log.
    Duplicate,
    /// Nothing to reconcile and no content to append.
    Ignored,
}

#[derive(Debug, Default)]
pub struct Conversation {
    entries: Vec<ChatEntry>,
    next_temp: u64,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_pending()).count()
    }

    pub fn contains(&self, id: MessageId) -> bool {
        self.entries.iter().any(|e| e.id == EntryId::Server(id))
    }

    /// Append one of our messages before the server saw it.
    pub fn push_pending(&mut self, content: &str, now: DateTime<Utc>) -> u64 {
        self.next_temp += 1;
        let temp = self.next_temp;
        self.entries.push(ChatEntry {
            id: EntryId::Pending(temp),
            content: content.to_string(),
            timestamp: Some(now),
            is_sent_by_me: true,
            is_read: false,
        });
        temp
    }

    /// Fold a `message_sent` confirmation.
    ///
    /// Matches the oldest pending entry with the same content (or the oldest
    /// pending entry when the server omitted the content).
    pub fn confirm(&mut self, id: MessageId, content: Option<&str>, timestamp: &str) -> Reconcile {
        if self.contains(id) {
            return Reconcile::Duplicate;
        }
        let at = parse_timestamp(timestamp);

        let slot = self.entries.iter_mut().find(|e| match e.id {
            EntryId::Pending(_) => content.map_or(true, |c| c == e.content),
            EntryId::Server(_) | EntryId::Unnumbered => false,
        });
        if let Some(entry) = slot {
            let EntryId::Pending(temp) = entry.id else {
                return Reconcile::Ignored;
            };
            entry.id = EntryId::Server(id);
            if at.is_some() {
                entry.timestamp = at;
            }
            return Reconcile::Replaced(temp);
        }

        match content {
            Some(content) => {
                self.entries.push(ChatEntry {
                    id: EntryId::Server(id),
                    content: content.to_string(),
                    timestamp: at,
                    is_sent_by_me: true,
                    is_read: false,
                });
                Reconcile::Appended
            }
            None => Reconcile::Ignored,
        }
    }

    /// Append a message from the peer. Returns `false` for a known id.
    pub fn receive(&mut self, id: Option<MessageId>, content: &str, timestamp: Option<&str>) -> bool {
        if id.is_some_and(|id| self.contains(id)) {
            return false;
        }
        self.entries.push(ChatEntry {
            id: id.map_or(EntryId::Unnumbered, EntryId::Server),
            content: content.to_string(),
            timestamp: timestamp.and_then(parse_timestamp),
            is_sent_by_me: false,
            is_read: true,
        });
        true
    }

    /// The peer read everything we sent. Returns how many entries changed.
    pub fn mark_sent_read(&mut self) -> usize {
        let mut changed = 0;
        for e in self.entries.iter_mut().filter(|e| e.is_sent_by_me && !e.is_read) {
            e.is_read = true;
            changed += 1;
        }
        changed
    }

    /// Replace the log with server history; pending entries are kept at the tail.
    pub fn load_history(&mut self, history: &[HistoryMessage]) {
        let pending: Vec<ChatEntry> = self.entries.drain(..).filter(ChatEntry::is_pending).collect();
        self.entries = history
            .iter()
            .map(|m| ChatEntry {
                id: EntryId::Server(m.id),
                content: m.content.clone(),
                timestamp: parse_timestamp(&m.timestamp),
                is_sent_by_me: m.is_sent_by_me,
                is_read: m.is_read,
            })
            .collect();
        self.entries.extend(pending);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    const TS: &str = "2024-01-01T10:00:00+00:00";

    fn now() -> DateTime<Utc> {
        parse_timestamp(TS).unwrap()
    }

    #[test]
    fn confirmation_replaces_pending_entry_in_place() {
        let mut c = Conversation::new();
        let temp = c.push_pending("hi", now());
        assert_eq!(c.confirm(42, Some("hi"), "2024-01-01T10:00:05+00:00"), Reconcile::Replaced(temp));
        assert_eq!(c.len(), 1);
        assert_eq!(c.entries()[0].id, EntryId::Server(42));
        assert_eq!(c.pending_count(), 0);

        // a replayed confirmation never duplicates
        assert_eq!(c.confirm(42, Some("hi"), TS), Reconcile::Duplicate);
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn confirmations_match_by_content_oldest_first() {
        let mut c = Conversation::new();
        let a = c.push_pending("same", now());
        c.push_pending("other", now());
        let b = c.push_pending("same", now());

        assert_eq!(c.confirm(1, Some("same"), TS), Reconcile::Replaced(a));
        assert_eq!(c.confirm(2, Some("same"), TS), Reconcile::Replaced(b));
        assert_eq!(c.pending_count(), 1);
        assert_eq!(c.entries()[1].content, "other");
    }

    #[test]
    fn unmatched_confirmation_is_appended_once() {
        let mut c = Conversation::new();
        assert_eq!(c.confirm(9, Some("sent elsewhere"), TS), Reconcile::Appended);
        assert_eq!(c.confirm(9, Some("sent elsewhere"), TS), Reconcile::Duplicate);
        assert_eq!(c.confirm(10, None, TS), Reconcile::Ignored);
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn read_receipt_marks_only_own_messages() {
        let mut c = Conversation::new();
        c.push_pending("mine", now());
        assert!(c.receive(Some(5), "theirs", Some(TS)));
        assert!(!c.receive(Some(5), "theirs", Some(TS)));
        assert_eq!(c.mark_sent_read(), 1);
        assert_eq!(c.mark_sent_read(), 0);
    }

    #[test]
    fn history_replaces_log_and_keeps_pending() {
        let mut c = Conversation::new();
        c.receive(Some(1), "stale", None);
        c.push_pending("in flight", now());
        c.load_history(&[HistoryMessage {
            id: 3,
            content: "from server".into(),
            timestamp: TS.into(),
            is_read: true,
            is_sent_by_me: true,
        }]);
        let contents: Vec<_> = c.entries().iter().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, vec!["from server", "in flight"]);
        assert!(!c.contains(1));
    }
}
