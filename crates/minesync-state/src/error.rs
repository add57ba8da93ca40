//! Error types for the state layer.

use minesync_protocol::{PlayerId, Position};

/// Errors raised while applying packets to the local mirror.
///
/// Neither variant leaves the store half-mutated: a rejected snapshot is
/// discarded whole, an out-of-bounds record is skipped on its own.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// A snapshot's grids disagree with its declared dimensions.
    #[error(
        "snapshot declares {width}x{height} ({expected} cells) \
         but carries {entries} entries and {owners} owners"
    )]
    ShapeMismatch {
        width: u16,
        height: u16,
        expected: usize,
        entries: usize,
        owners: usize,
    },

    /// A coordinate falls outside the current board.
    #[error("cell {pos} is outside the {width}x{height} board")]
    OutOfBounds { pos: Position, width: u16, height: u16 },
}

/// Incrementally maintained bookkeeping disagrees with the grids.
///
/// Reported by [`crate::StateStore::check_invariants`]. Seeing one means a
/// reducer bug, not bad input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Inconsistency {
    #[error("incremental scores {incremental:?} differ from recomputed {recomputed:?}")]
    Scores {
        incremental: Vec<(PlayerId, u32)>,
        recomputed: Vec<(PlayerId, u32)>,
    },

    #[error("flag count is {tracked} but the board holds {counted} flags")]
    FlagCount { tracked: usize, counted: usize },
}
