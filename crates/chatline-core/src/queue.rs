//! Bounded outbound queue for messages issued while disconnected.
//!
//! Messages leave the queue only through `pop_front`, which the driver calls
//! after the transport accepted the head; a failed send leaves it in place.

use std::collections::VecDeque;

use crate::error::{ChatlineError, Result};
use crate::protocol::Outbound;

/// What to do when a message arrives and the queue is at capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Evict the oldest queued message to make room.
    #[default]
    DropOldest,
    /// Refuse the new message with `QueueFull`.
    Reject,
}

#[derive(Debug)]
pub struct OutboundQueue {
    items: VecDeque<Outbound>,
    capacity: usize,
    overflow: OverflowPolicy,
}

impl OutboundQueue {
    pub fn new(capacity: usize, overflow: OverflowPolicy) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity.min(64)),
            capacity,
            overflow,
        }
    }

    /// Append at the tail. Returns the evicted message under `DropOldest`.
    pub fn push(&mut self, msg: Outbound) -> Result<Option<Outbound>> {
        if self.items.len() < self.capacity {
            self.items.push_back(msg);
            return Ok(None);
        }
        match self.overflow {
            OverflowPolicy::Reject => Err(ChatlineError::QueueFull),
            OverflowPolicy::DropOldest => {
                let evicted = self.items.pop_front();
                self.items.push_back(msg);
                Ok(evicted)
            }
        }
    }

    pub fn front(&self) -> Option<&Outbound> {
        self.items.front()
    }

    pub fn pop_front(&mut self) -> Option<Outbound> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Outbound> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::protocol::Target;

    fn msg(text: &str) -> Outbound {
        Outbound::chat(Target::User(1), text).unwrap()
    }

    #[test]
    fn drop_oldest_evicts_head() {
        let mut q = OutboundQueue::new(2, OverflowPolicy::DropOldest);
        assert!(q.push(msg("a")).unwrap().is_none());
        assert!(q.push(msg("b")).unwrap().is_none());
        let evicted = q.push(msg("c")).unwrap();
        assert_eq!(evicted, Some(msg("a")));
        let left: Vec<_> = q.iter().cloned().collect();
        assert_eq!(left, vec![msg("b"), msg("c")]);
    }

    #[test]
    fn reject_keeps_existing_items() {
        let mut q = OutboundQueue::new(1, OverflowPolicy::Reject);
        q.push(msg("a")).unwrap();
        let err = q.push(msg("b")).unwrap_err();
        assert_eq!(err.kind().as_str(), "QUEUE_FULL");
        assert_eq!(q.len(), 1);
        assert_eq!(q.front(), Some(&msg("a")));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let q = OutboundQueue::new(0, OverflowPolicy::Reject);
        assert_eq!(q.capacity(), 1);
    }
}
