//! Unified error type for the minesync client.

use minesync_protocol::ProtocolError;
use minesync_session::SessionError;
use minesync_state::StateError;
use minesync_transport::TransportError;

/// An outbound intent that cannot be sent as given.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntentError {
    /// Width or height is above the configured board limit.
    #[error("{field} {value} exceeds the limit of {max}")]
    SideTooLarge {
        field: &'static str,
        value: u64,
        max: u16,
    },

    /// Mine count is above `u32::MAX` minus the safety margin.
    #[error("mine count {value} exceeds the limit of {max}")]
    TooManyMines { value: u64, max: u32 },
}

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impls, so
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum MinesyncError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Session(#[from] SessionError),

    /// The JSON config could not be parsed.
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    InvalidIntent(#[from] IntentError),

    /// The client task has already stopped.
    #[error("client is closed")]
    ClientClosed,
}
