//! Typing indicator debounce (sans-IO).
//!
//! The first keystroke of a burst yields `Start`; every keystroke pushes the
//! stop deadline out by `window`; `Stop` is yielded once, by `poll` after the
//! deadline or by `stop` when the message is sent.

use std::time::{Duration, Instant};

/// Default quiet period before "stopped typing" is signalled.
pub const DEFAULT_TYPING_WINDOW: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingSignal {
    Start,
    Stop,
}

#[derive(Debug, Clone)]
pub struct TypingDebouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl TypingDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Record a keystroke at `now`; rearms the stop deadline.
    pub fn keystroke(&mut self, now: Instant) -> Option<TypingSignal> {
        let starting = self.deadline.is_none();
        self.deadline = Some(now + self.window);
        starting.then_some(TypingSignal::Start)
    }

    /// Fire the pending stop if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<TypingSignal> {
        match self.deadline {
            Some(d) if now >= d => {
                self.deadline = None;
                Some(TypingSignal::Stop)
            }
            _ => None,
        }
    }

    /// Stop immediately (message sent); no-op when idle.
    pub fn stop(&mut self) -> Option<TypingSignal> {
        self.deadline.take().map(|_| TypingSignal::Stop)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_typing(&self) -> bool {
        self.deadline.is_some()
    }
}

impl Default for TypingDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_TYPING_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn burst_yields_one_start_and_one_stop_after_last_keystroke() {
        let t0 = Instant::now();
        let mut d = TypingDebouncer::new(ms(2000));

        assert_eq!(d.keystroke(t0), Some(TypingSignal::Start));
        assert_eq!(d.keystroke(t0 + ms(500)), None);
        assert_eq!(d.keystroke(t0 + ms(1000)), None);
        assert_eq!(d.deadline(), Some(t0 + ms(3000)));

        let mut stops = Vec::new();
        for step in (0..=5000).step_by(100) {
            let now = t0 + ms(step);
            if d.poll(now) == Some(TypingSignal::Stop) {
                stops.push(step);
            }
        }
        assert_eq!(stops, vec![3000]);
    }

    #[test]
    fn explicit_stop_cancels_timer() {
        let t0 = Instant::now();
        let mut d = TypingDebouncer::default();
        d.keystroke(t0);
        assert_eq!(d.stop(), Some(TypingSignal::Stop));
        assert_eq!(d.stop(), None);
        assert_eq!(d.poll(t0 + ms(10_000)), None);
    }

    #[test]
    fn new_burst_after_stop_starts_again() {
        let t0 = Instant::now();
        let mut d = TypingDebouncer::new(ms(100));
        d.keystroke(t0);
        assert_eq!(d.poll(t0 + ms(100)), Some(TypingSignal::Stop));
        assert_eq!(d.keystroke(t0 + ms(150)), Some(TypingSignal::Start));
    }
}
