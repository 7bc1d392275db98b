//! Reconnect delay policy.

use std::time::Duration;

/// Default cap for exponential backoff.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

/// Default delay for the fixed policy.
pub const DEFAULT_FIXED_DELAY: Duration = Duration::from_secs(3);

/// How long to wait before reconnect attempt `n` (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectPolicy {
    /// Same delay for every attempt.
    Fixed { delay: Duration },
    /// `min(max, 2^attempt)` seconds.
    Exponential { max: Duration },
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        ReconnectPolicy::Exponential {
            max: DEFAULT_MAX_DELAY,
        }
    }
}

impl ReconnectPolicy {
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match *self {
            ReconnectPolicy::Fixed { delay } => delay,
            ReconnectPolicy::Exponential { max } => {
                // 2^63 seconds already dwarfs any sane cap
                let secs = 1u64.checked_shl(attempt.min(63)).unwrap_or(u64::MAX);
                Duration::from_secs(secs).min(max)
            }
        }
    }
}
