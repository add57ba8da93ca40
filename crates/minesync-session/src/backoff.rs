//! Capped exponential backoff.

use std::time::Duration;

use crate::ReconnectConfig;

/// Delay schedule for consecutive reconnect attempts.
///
/// ```rust
/// use std::time::Duration;
/// use minesync_session::{Backoff, ReconnectConfig};
///
/// let mut backoff = Backoff::new(&ReconnectConfig::default());
/// let delays: Vec<_> = (0..6).map(|_| backoff.next_delay().as_millis()).collect();
/// assert_eq!(delays, [100, 200, 400, 800, 1000, 1000]);
///
/// backoff.reset();
/// assert_eq!(backoff.next_delay(), Duration::from_millis(100));
/// ```
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(config: &ReconnectConfig) -> Self {
        Self {
            initial: config.initial_backoff(),
            max: config.max_backoff(),
            current: config.initial_backoff(),
        }
    }

    /// Returns the delay to use now and doubles the next one, capped.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_mul(2).min(self.max);
        delay
    }

    /// The delay the next failure would get, without consuming it.
    pub fn peek(&self) -> Duration {
        self.current
    }

    /// Back to the initial delay. Called after a successful open.
    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}
