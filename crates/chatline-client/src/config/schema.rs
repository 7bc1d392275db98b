use std::time::Duration;

use serde::Deserialize;

use chatline_core::backoff::ReconnectPolicy;
use chatline_core::error::{ChatlineError, Result};
use chatline_core::queue::{OutboundQueue, OverflowPolicy};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub version: u32,

    pub endpoint: EndpointSection,

    #[serde(default)]
    pub reconnect: ReconnectSection,

    #[serde(default)]
    pub queue: QueueSection,

    #[serde(default)]
    pub typing: TypingSection,

    #[serde(default)]
    pub keepalive: KeepaliveSection,
}

impl ClientConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ChatlineError::UnsupportedVersion);
        }
        if self.endpoint.url.trim().is_empty() {
            return Err(ChatlineError::Config("endpoint.url must not be empty".into()));
        }

        self.reconnect.validate()?;
        self.queue.validate()?;
        self.typing.validate()?;
        self.keepalive.validate()?;

        Ok(())
    }

    /// Config for `url` with every other section at its default.
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            version: 1,
            endpoint: EndpointSection {
                url: url.into(),
                token: None,
            },
            reconnect: ReconnectSection::default(),
            queue: QueueSection::default(),
            typing: TypingSection::default(),
            keepalive: KeepaliveSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointSection {
    /// `ws://`, `wss://`, or an `http(s)://` page origin.
    pub url: String,

    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyName {
    Exponential,
    Fixed,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconnectSection {
    #[serde(default = "default_policy")]
    pub policy: PolicyName,

    #[serde(default = "default_fixed_delay_ms")]
    pub fixed_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Upper bound on one connect attempt, WebSocket upgrade included.
    #[serde(default = "default_handshake_timeout_ms")]
    pub handshake_timeout_ms: u64,
}

impl Default for ReconnectSection {
    fn default() -> Self {
        Self {
            policy: default_policy(),
            fixed_delay_ms: default_fixed_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            handshake_timeout_ms: default_handshake_timeout_ms(),
        }
    }
}

impl ReconnectSection {
    pub fn validate(&self) -> Result<()> {
        if !(100..=600000).contains(&self.fixed_delay_ms) {
            return Err(ChatlineError::Config(
                "reconnect.fixed_delay_ms must be between 100 and 600000".into(),
            ));
        }
        if !(1000..=600000).contains(&self.max_delay_ms) {
            return Err(ChatlineError::Config(
                "reconnect.max_delay_ms must be between 1000 and 600000".into(),
            ));
        }
        if !(1000..=120000).contains(&self.handshake_timeout_ms) {
            return Err(ChatlineError::Config(
                "reconnect.handshake_timeout_ms must be between 1000 and 120000".into(),
            ));
        }
        Ok(())
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }

    pub fn policy(&self) -> ReconnectPolicy {
        match self.policy {
            PolicyName::Exponential => ReconnectPolicy::Exponential {
                max: Duration::from_millis(self.max_delay_ms),
            },
            PolicyName::Fixed => ReconnectPolicy::Fixed {
                delay: Duration::from_millis(self.fixed_delay_ms),
            },
        }
    }
}

fn default_policy() -> PolicyName {
    PolicyName::Exponential
}
fn default_fixed_delay_ms() -> u64 {
    3000
}
fn default_max_delay_ms() -> u64 {
    30000
}
fn default_handshake_timeout_ms() -> u64 {
    10000
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowName {
    DropOldest,
    Reject,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueueSection {
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    #[serde(default = "default_overflow")]
    pub overflow: OverflowName,
}

impl Default for QueueSection {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            overflow: default_overflow(),
        }
    }
}

impl QueueSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=65536).contains(&self.capacity) {
            return Err(ChatlineError::Config(
                "queue.capacity must be between 1 and 65536".into(),
            ));
        }
        Ok(())
    }

    pub fn build(&self) -> OutboundQueue {
        let overflow = match self.overflow {
            OverflowName::DropOldest => OverflowPolicy::DropOldest,
            OverflowName::Reject => OverflowPolicy::Reject,
        };
        OutboundQueue::new(self.capacity, overflow)
    }
}

fn default_capacity() -> usize {
    256
}
fn default_overflow() -> OverflowName {
    OverflowName::DropOldest
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypingSection {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for TypingSection {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl TypingSection {
    pub fn validate(&self) -> Result<()> {
        if !(100..=60000).contains(&self.debounce_ms) {
            return Err(ChatlineError::Config(
                "typing.debounce_ms must be between 100 and 60000".into(),
            ));
        }
        Ok(())
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn default_debounce_ms() -> u64 {
    2000
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeepaliveSection {
    /// 0 disables the ping.
    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,

    /// Silence from the server for this long drops the connection. 0 disables.
    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,
}

impl Default for KeepaliveSection {
    fn default() -> Self {
        Self {
            ping_interval_ms: default_ping_interval_ms(),
            idle_timeout_ms: default_idle_timeout_ms(),
        }
    }
}

impl KeepaliveSection {
    pub fn validate(&self) -> Result<()> {
        if self.ping_interval_ms != 0 && !(1000..=300000).contains(&self.ping_interval_ms) {
            return Err(ChatlineError::Config(
                "keepalive.ping_interval_ms must be 0 or between 1000 and 300000".into(),
            ));
        }
        if self.idle_timeout_ms != 0 && !(1000..=3600000).contains(&self.idle_timeout_ms) {
            return Err(ChatlineError::Config(
                "keepalive.idle_timeout_ms must be 0 or between 1000 and 3600000".into(),
            ));
        }
        if self.idle_timeout_ms != 0
            && self.ping_interval_ms != 0
            && self.idle_timeout_ms <= self.ping_interval_ms
        {
            return Err(ChatlineError::Config(
                "keepalive.idle_timeout_ms must be greater than ping_interval_ms".into(),
            ));
        }
        Ok(())
    }

    pub fn interval(&self) -> Option<Duration> {
        (self.ping_interval_ms > 0).then(|| Duration::from_millis(self.ping_interval_ms))
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_ms > 0).then(|| Duration::from_millis(self.idle_timeout_ms))
    }
}

fn default_ping_interval_ms() -> u64 {
    20000
}
fn default_idle_timeout_ms() -> u64 {
    60000
}
