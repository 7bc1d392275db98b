//! Realtime client runtime.
//!
//! `RealtimeClient` is the driver: one task owning the transport, the
//! connection state machine, typing debouncers and timers. `ClientHandle` is
//! the cloneable front every other party uses; its methods enqueue commands
//! and return immediately.

pub mod client;
pub mod handle;

pub use client::{ClientStatus, RealtimeClient};
pub use handle::{ClientHandle, Outbox, SendTicket};

use tokio::sync::oneshot;

use chatline_core::error::Result;
use chatline_core::protocol::{Outbound, Target};

/// Driver input.
#[derive(Debug)]
pub(crate) enum Command {
    Connect { url: String },
    Send { msg: Outbound, reply: Option<oneshot::Sender<Result<()>>> },
    Keystroke(Target),
    StopTyping(Target),
    Close,
    Shutdown,
}
