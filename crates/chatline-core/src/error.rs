//! Shared error type across chatline crates.

use thiserror::Error;

/// Stable error classes, used in logs and by callers that branch on the
/// recovery strategy rather than the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connection refused/reset; always recovered by reconnecting.
    Transport,
    /// Malformed inbound payload.
    Decode,
    /// Well-formed payload with an unknown `type` discriminator.
    Protocol,
    /// Rejected at the UI boundary (e.g. empty message body).
    UserInput,
    /// Outbound queue at capacity under the `reject` overflow policy.
    QueueFull,
    /// The client driver is no longer running.
    Closed,
    /// Invalid configuration.
    Config,
    /// Internal error.
    Internal,
}

impl ErrorKind {
    /// String representation used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Transport => "TRANSPORT",
            ErrorKind::Decode => "DECODE",
            ErrorKind::Protocol => "PROTOCOL",
            ErrorKind::UserInput => "USER_INPUT",
            ErrorKind::QueueFull => "QUEUE_FULL",
            ErrorKind::Closed => "CLOSED",
            ErrorKind::Config => "CONFIG",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ChatlineError>;

/// Unified error type used by core and client.
#[derive(Debug, Error)]
pub enum ChatlineError {
    #[error("transport: {0}")]
    Transport(String),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("unknown message type: {0}")]
    UnknownKind(String),
    #[error("message body is empty")]
    EmptyMessage,
    #[error("outbound queue is full")]
    QueueFull,
    #[error("client is no longer running")]
    ClientGone,
    #[error("config: {0}")]
    Config(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl ChatlineError {
    /// Map to the stable error class.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChatlineError::Transport(_) => ErrorKind::Transport,
            ChatlineError::Decode(_) => ErrorKind::Decode,
            ChatlineError::UnknownKind(_) => ErrorKind::Protocol,
            ChatlineError::EmptyMessage => ErrorKind::UserInput,
            ChatlineError::QueueFull => ErrorKind::QueueFull,
            ChatlineError::ClientGone => ErrorKind::Closed,
            ChatlineError::Config(_) | ChatlineError::UnsupportedVersion => ErrorKind::Config,
            ChatlineError::Internal(_) => ErrorKind::Internal,
        }
    }
}
