//! chatline client library entry.
//!
//! Wires the WebSocket transport, handler registry, and the async realtime
//! driver on top of the sans-IO state machines in `chatline-core`. Chat views
//! (direct and room) and REST payload types sit beside the driver so a UI
//! layer only has to render them. Consumed by the demo binary (`main.rs`) and
//! by integration tests.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub mod config;
pub mod dispatch;
pub mod endpoint;
pub mod format;
pub mod realtime;
pub mod rest;
pub mod transport;
pub mod views;

pub use realtime::{ClientHandle, ClientStatus, RealtimeClient};
