//! Wire protocol for minesync.
//!
//! This crate defines what the game authority and its clients say to each
//! other:
//!
//! - **Types** ([`ServerPacket`], [`ClientPacket`], [`Entry`], ...): the
//!   packet payloads and the value types they are built from.
//! - **Codec** ([`Codec`] trait, [`BinaryCodec`]): the little-endian
//!   binary encoding, one packet per transport message.
//! - **Errors** ([`ProtocolError`]): malformed or unrepresentable packets.
//!
//! # Architecture
//!
//! The protocol layer knows nothing about connections or board state. It
//! turns bytes into packets and back.
//!
//! ```text
//! Transport (frames) → Protocol (packets) → State (board, players, scores)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{BinaryCodec, Codec, WirePacket};
pub use error::ProtocolError;
pub use types::{
    BoardConfig, BoardState, CellUpdate, ClientPacket, Color, Entry, FullBoard,
    LossReport, PlayerId, PlayerInfo, Position, ServerPacket,
};

impl ServerPacket {
    /// Decodes one authority packet with the [`BinaryCodec`].
    pub fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        BinaryCodec.decode(data)
    }

    /// Encodes this packet with the [`BinaryCodec`].
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        BinaryCodec.encode(self)
    }
}

impl ClientPacket {
    /// Decodes one client packet with the [`BinaryCodec`].
    pub fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        BinaryCodec.decode(data)
    }

    /// Encodes this packet with the [`BinaryCodec`].
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        BinaryCodec.encode(self)
    }
}
