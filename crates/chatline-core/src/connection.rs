//! Realtime connection lifecycle state machine.
//!
//! Pure: methods take time as input and return decisions for the driver to
//! execute (start a connect attempt, transmit, arm the reconnect timer). The
//! driver owns the actual transport.
//!
//! ```text
//!          connect()            on_open()
//! Closed ───────────> Connecting ─────────> Open
//!   ^                   │    ^               │
//!   │ close()           │    │ poll_reconnect│ on_lost()
//!   │ (from any state)  │    │               v
//!   └───────────────    └──> Reconnecting <──┘
//!                  on_lost()
//! ```
//!
//! `close()` is terminal until the next explicit `connect()`: while closed by
//! the user, `on_lost` never arms a reconnect.

use std::time::Instant;

use crate::backoff::ReconnectPolicy;
use crate::error::Result;
use crate::protocol::Outbound;
use crate::queue::OutboundQueue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Reconnecting,
    Closed,
}

impl ConnectionState {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Reconnecting => "reconnecting",
            ConnectionState::Closed => "closed",
        }
    }
}

/// Result of `Connection::send`.
#[derive(Debug, PartialEq, Eq)]
pub enum SendDecision {
    /// Open with nothing queued ahead: hand this to the transport now.
    Transmit(Outbound),
    /// Stored for the next flush; `evicted` is set when the queue overflowed
    /// under the drop-oldest policy.
    Queued { evicted: Option<Outbound> },
}

#[derive(Debug)]
pub struct Connection {
    endpoint: Option<String>,
    state: ConnectionState,
    attempts: u32,
    queue: OutboundQueue,
    policy: ReconnectPolicy,
    closed_by_user: bool,
    reconnect_at: Option<Instant>,
}

impl Connection {
    pub fn new(policy: ReconnectPolicy, queue: OutboundQueue) -> Self {
        Self {
            endpoint: None,
            state: ConnectionState::Closed,
            attempts: 0,
            queue,
            policy,
            closed_by_user: false,
            reconnect_at: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub fn reconnect_at(&self) -> Option<Instant> {
        self.reconnect_at
    }

    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_closed_by_user(&self) -> bool {
        self.closed_by_user
    }

    /// Begin a connection attempt to `endpoint`.
    ///
    /// Returns `false` when already connecting to or connected to the same
    /// endpoint; otherwise the driver must drop any current transport and
    /// start an attempt.
    pub fn connect(&mut self, endpoint: impl Into<String>) -> bool {
        let endpoint = endpoint.into();
        let same = self.endpoint.as_deref() == Some(endpoint.as_str());
        if same
            && matches!(self.state, ConnectionState::Connecting | ConnectionState::Open)
        {
            return false;
        }
        tracing::debug!(%endpoint, from = self.state.as_str(), "connect requested");
        self.endpoint = Some(endpoint);
        self.closed_by_user = false;
        self.reconnect_at = None;
        self.state = ConnectionState::Connecting;
        true
    }

    /// The pending attempt succeeded.
    ///
    /// Returns `false` if the user closed in the meantime; the driver must then
    /// shut the fresh transport down instead of using it.
    pub fn on_open(&mut self) -> bool {
        if self.closed_by_user || self.state != ConnectionState::Connecting {
            return false;
        }
        self.state = ConnectionState::Open;
        self.attempts = 0;
        self.reconnect_at = None;
        true
    }

    /// Transport error, failed attempt, or close not requested by the user.
    ///
    /// Returns the instant of the next attempt, or `None` when reconnection
    /// is suppressed (user close).
    pub fn on_lost(&mut self, now: Instant) -> Option<Instant> {
        if self.closed_by_user || self.state == ConnectionState::Closed {
            return None;
        }
        self.attempts = self.attempts.saturating_add(1);
        let at = now + self.policy.delay_for(self.attempts);
        self.state = ConnectionState::Reconnecting;
        self.reconnect_at = Some(at);
        Some(at)
    }

    /// `true` when the reconnect timer is due; state moves to Connecting.
    pub fn poll_reconnect(&mut self, now: Instant) -> bool {
        match self.reconnect_at {
            Some(at) if self.state == ConnectionState::Reconnecting && now >= at => {
                self.reconnect_at = None;
                self.state = ConnectionState::Connecting;
                true
            }
            _ => false,
        }
    }

    /// Route an outbound message: transmit now or queue.
    pub fn send(&mut self, msg: Outbound) -> Result<SendDecision> {
        if self.state == ConnectionState::Open && self.queue.is_empty() {
            return Ok(SendDecision::Transmit(msg));
        }
        let evicted = self.queue.push(msg)?;
        Ok(SendDecision::Queued { evicted })
    }

    /// Head of the queue, only while Open (the flush cursor).
    pub fn next_queued(&self) -> Option<&Outbound> {
        if self.state != ConnectionState::Open {
            return None;
        }
        self.queue.front()
    }

    /// The transport accepted the head of the queue.
    pub fn ack_queued(&mut self) -> Option<Outbound> {
        self.queue.pop_front()
    }

    /// User-initiated terminal disconnect. Queued messages are kept for a
    /// later explicit `connect()`.
    pub fn close(&mut self) {
        tracing::debug!(from = self.state.as_str(), queued = self.queue.len(), "closed by user");
        self.closed_by_user = true;
        self.state = ConnectionState::Closed;
        self.reconnect_at = None;
    }
}
