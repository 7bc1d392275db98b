//! chatline core: transport-agnostic protocol primitives, error types, and the
//! connection state machine.
//!
//! This crate defines the wire-level contracts of the chat socket and the pure
//! pieces of the realtime client (reconnect policy, outbound queue, typing
//! debounce, lifecycle state machine). It carries no transport or runtime
//! dependencies: every time-dependent method takes an `Instant` as input.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed frames surface as `ChatlineError` so a hostile or buggy server
//! cannot crash the host process.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod backoff;
pub mod connection;
pub mod debounce;
pub mod error;
pub mod protocol;
pub mod queue;

/// Shared result type.
pub use error::{ChatlineError, Result};
