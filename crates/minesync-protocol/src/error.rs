//! Error types for the protocol layer.
//!
//! Every variant is recoverable: the offending buffer is dropped and the
//! next message is processed normally.

/// Errors that can occur while encoding or decoding packets.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// The buffer violates the length or shape rules of its packet type.
    #[error("malformed {packet} packet: {reason}")]
    Malformed {
        /// Packet name, or `"empty"` when there was no type byte at all.
        packet: &'static str,
        reason: String,
    },

    /// The leading type byte names no known packet.
    #[error("unknown packet type {0}")]
    UnknownPacketType(u8),

    /// A packet value cannot be represented on the wire.
    ///
    /// Raised on encode, e.g. a snapshot whose grids disagree with its
    /// declared dimensions.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

impl ProtocolError {
    pub(crate) fn malformed(packet: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            packet,
            reason: reason.into(),
        }
    }
}
