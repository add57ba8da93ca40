//! Reconnect settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::SessionError;

/// How long to wait before reconnecting after a connection is lost.
///
/// The first delay is `initial_backoff_ms`; each further consecutive
/// failure doubles it, up to `max_backoff_ms`. A successful open starts
/// over from the initial value. Retries never stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    /// Default: 100 ms.
    pub initial_backoff_ms: u64,
    /// Default: 1000 ms.
    pub max_backoff_ms: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_backoff_ms: 100,
            max_backoff_ms: 1000,
        }
    }
}

impl ReconnectConfig {
    /// Checks that the delays are positive and ordered.
    ///
    /// # Errors
    /// [`SessionError::InvalidConfig`] describing the first problem found.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.initial_backoff_ms == 0 {
            return Err(SessionError::InvalidConfig(
                "initial_backoff_ms must be positive".into(),
            ));
        }
        if self.initial_backoff_ms > self.max_backoff_ms {
            return Err(SessionError::InvalidConfig(format!(
                "initial_backoff_ms ({}) exceeds max_backoff_ms ({})",
                self.initial_backoff_ms, self.max_backoff_ms
            )));
        }
        Ok(())
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}
