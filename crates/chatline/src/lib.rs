//! Top-level facade crate for chatline.
//!
//! Re-exports core types and the client library so users can depend on a single crate.

pub mod core {
    pub use chatline_core::*;
}

pub mod client {
    pub use chatline_client::*;
}
