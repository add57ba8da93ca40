//! Error types for the session layer.

use crate::AttemptId;

/// Errors reported by the connection state machine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// A transport callback belongs to an attempt that has since been
    /// superseded or already closed. The callback must be ignored.
    #[error("stale callback from {attempt} (current: {current:?})")]
    StaleAttempt {
        attempt: AttemptId,
        current: Option<AttemptId>,
    },

    /// The reconnect settings are unusable.
    #[error("invalid reconnect config: {0}")]
    InvalidConfig(String),
}
