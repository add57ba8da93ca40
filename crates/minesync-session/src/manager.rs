//! The connection manager: a sans-IO state machine over transport events.
//!
//! The manager never touches a socket. The driver that owns the transport
//! reports what happened (`begin_connect`, `on_open`, `on_error`,
//! `on_close`) and the manager answers with what to do next, most
//! importantly how long to wait before the next attempt.
//!
//! ```text
//!                 begin_connect()
//!  Disconnected ───────────────────→ Connecting(a)
//!       ↑                                 │ on_open(a)
//!       │ on_close(a) → delay             ▼
//!       └──────────────────────────── Connected(a)
//! ```
//!
//! Every attempt gets a fresh [`AttemptId`]. Callbacks carrying any other
//! id are stale and rejected, so a late close from a superseded connection
//! cannot schedule a second reconnect.

use std::fmt;
use std::time::Duration;

use crate::{Backoff, ReconnectConfig, SessionError};

/// Identifies one connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttemptId(u64);

impl AttemptId {
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attempt-{}", self.0)
    }
}

/// Where the connection currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting(AttemptId),
    Connected(AttemptId),
}

impl ConnectionState {
    /// The attempt this state belongs to, if any.
    pub fn attempt(&self) -> Option<AttemptId> {
        match *self {
            Self::Disconnected => None,
            Self::Connecting(id) | Self::Connected(id) => Some(id),
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected(_))
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting(id) => write!(f, "connecting ({id})"),
            Self::Connected(id) => write!(f, "connected ({id})"),
        }
    }
}

/// Owns connection lifecycle and reconnect backoff.
///
/// Not thread-safe by itself; the client driver owns it from a single
/// task.
#[derive(Debug)]
pub struct ConnectionManager {
    state: ConnectionState,
    backoff: Backoff,
    next_attempt: u64,
}

impl ConnectionManager {
    /// Creates a manager in the `Disconnected` state.
    ///
    /// # Errors
    /// [`SessionError::InvalidConfig`] if `config` does not validate.
    pub fn new(config: ReconnectConfig) -> Result<Self, SessionError> {
        config.validate()?;
        Ok(Self {
            state: ConnectionState::Disconnected,
            backoff: Backoff::new(&config),
            next_attempt: 1,
        })
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Outbound packets may only be sent while connected.
    pub fn can_send(&self) -> bool {
        self.state.is_connected()
    }

    /// Starts a new attempt, superseding whatever attempt was current.
    pub fn begin_connect(&mut self) -> AttemptId {
        let id = AttemptId(self.next_attempt);
        self.next_attempt += 1;

        if let Some(old) = self.state.attempt() {
            tracing::debug!(%old, new = %id, "superseding connection attempt");
        }
        self.state = ConnectionState::Connecting(id);
        tracing::debug!(attempt = %id, "connecting");
        id
    }

    /// The transport for `id` opened. Resets the backoff.
    ///
    /// # Errors
    /// [`SessionError::StaleAttempt`] unless `id` is the attempt currently
    /// connecting.
    pub fn on_open(&mut self, id: AttemptId) -> Result<(), SessionError> {
        match self.state {
            ConnectionState::Connecting(current) if current == id => {
                self.state = ConnectionState::Connected(id);
                self.backoff.reset();
                tracing::info!(attempt = %id, "connection open");
                Ok(())
            }
            _ => Err(self.stale(id)),
        }
    }

    /// The transport for `id` reported an error.
    ///
    /// Nothing is scheduled here; the caller must force-close the
    /// connection and report that through [`Self::on_close`], so one
    /// failure yields exactly one reconnect.
    ///
    /// # Errors
    /// [`SessionError::StaleAttempt`] if `id` is not the current attempt.
    pub fn on_error(&mut self, id: AttemptId) -> Result<(), SessionError> {
        if self.state.attempt() != Some(id) {
            return Err(self.stale(id));
        }
        tracing::warn!(attempt = %id, "connection error, forcing close");
        Ok(())
    }

    /// The transport for `id` closed, or never opened. Returns the delay
    /// to wait before calling [`Self::begin_connect`] again.
    ///
    /// # Errors
    /// [`SessionError::StaleAttempt`] if `id` is not the current attempt,
    /// including a second close for an attempt already closed.
    pub fn on_close(&mut self, id: AttemptId) -> Result<Duration, SessionError> {
        if self.state.attempt() != Some(id) {
            return Err(self.stale(id));
        }
        self.state = ConnectionState::Disconnected;
        let delay = self.backoff.next_delay();
        tracing::info!(attempt = %id, ?delay, "connection closed, reconnect scheduled");
        Ok(delay)
    }

    /// Returns `true` if a message received on `id` should be processed.
    pub fn accepts_message(&self, id: AttemptId) -> bool {
        self.state == ConnectionState::Connected(id)
    }

    fn stale(&self, attempt: AttemptId) -> SessionError {
        tracing::debug!(%attempt, state = %self.state, "ignoring stale callback");
        SessionError::StaleAttempt {
            attempt,
            current: self.state.attempt(),
        }
    }
}
