//! Turning user input into outbound packets.
//!
//! Pointer geometry and device events live outside this crate. What
//! arrives here is already a cell position plus which button was used;
//! this module decides which packet that means given the round state.

use minesync_protocol::{BoardConfig, BoardState, ClientPacket, Position};

use crate::{BoardLimits, IntentError};

/// What the primary button does on an unfinished board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActionMode {
    #[default]
    Reveal,
    ToggleFlag,
}

impl ActionMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            Self::Reveal => Self::ToggleFlag,
            Self::ToggleFlag => Self::Reveal,
        }
    }
}

/// Resolves a primary action at `pos`.
///
/// On a finished round any primary action asks for a new board. Otherwise
/// `chord` (shift-click) wins over the mode.
pub fn resolve_primary(
    board_state: BoardState,
    mode: ActionMode,
    pos: Position,
    chord: bool,
) -> ClientPacket {
    if board_state.is_finished() {
        return ClientPacket::NewBoard;
    }
    if chord {
        return ClientPacket::ChordSquare(pos);
    }
    match mode {
        ActionMode::Reveal => ClientPacket::RevealSquare(pos),
        ActionMode::ToggleFlag => ClientPacket::ToggleFlag(pos),
    }
}

/// Resolves a secondary action at `pos`: always a flag toggle.
pub fn resolve_secondary(pos: Position) -> ClientPacket {
    ClientPacket::ToggleFlag(pos)
}

impl BoardLimits {
    /// Largest mine count these limits accept.
    pub fn max_mines(&self) -> u32 {
        u32::MAX.saturating_sub(self.mine_margin)
    }

    /// Validates a requested next-round config and builds its packet.
    ///
    /// # Errors
    /// [`IntentError`] if a side exceeds `max_side` or the mine count
    /// exceeds [`Self::max_mines`].
    pub fn next_board_config(
        &self,
        width: u64,
        height: u64,
        mines: u64,
    ) -> Result<ClientPacket, IntentError> {
        let width = self.side("width", width)?;
        let height = self.side("height", height)?;
        let max = self.max_mines();
        let mine_count = u32::try_from(mines)
            .ok()
            .filter(|&m| m <= max)
            .ok_or(IntentError::TooManyMines { value: mines, max })?;

        Ok(ClientPacket::NextBoardConfig(BoardConfig {
            width,
            height,
            mine_count,
        }))
    }

    fn side(&self, field: &'static str, value: u64) -> Result<u16, IntentError> {
        let too_large = IntentError::SideTooLarge {
            field,
            value,
            max: self.max_side,
        };
        match u16::try_from(value) {
            Ok(side) if side <= self.max_side => Ok(side),
            _ => Err(too_large),
        }
    }
}
