//! Core protocol types for the minesync wire format.
//!
//! Every type in this module either travels on the wire or is a field of
//! something that does. Server packets flow authority → client, client
//! packets flow client → authority.

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A player identifier as assigned by the authority.
///
/// `PlayerId(0)` is reserved: it marks cells revealed by the authority
/// itself (for example mines exposed by a loss) and never scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// The reserved "no owner" id.
    pub const NONE: PlayerId = PlayerId(0);

    /// Returns `true` for the reserved id 0.
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A cell coordinate, row first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: u16,
    pub col: u16,
}

impl Position {
    pub const fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

// ---------------------------------------------------------------------------
// Board values
// ---------------------------------------------------------------------------

/// The value of one board cell, exactly as carried on the wire.
///
/// `0..=8` are revealed adjacency counts, `9` is reserved but scores like a
/// revealed cell, and the top three byte values are sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entry(pub u8);

impl Entry {
    /// Unrevealed and unflagged.
    pub const UNKNOWN: Entry = Entry(253);
    /// Unrevealed, flagged by a player.
    pub const FLAGGED: Entry = Entry(254);
    /// A revealed mine. Only shows up once a round is lost.
    pub const MINE: Entry = Entry(255);

    /// A revealed cell with `count` adjacent mines.
    pub const fn revealed(count: u8) -> Self {
        Self(count)
    }

    /// Returns `true` for values that earn the owner a point (`0..=9`).
    pub const fn is_scoring(self) -> bool {
        self.0 <= 9
    }

    pub const fn is_flagged(self) -> bool {
        self.0 == Self::FLAGGED.0
    }

    pub const fn is_mine(self) -> bool {
        self.0 == Self::MINE.0
    }

    pub const fn is_unknown(self) -> bool {
        self.0 == Self::UNKNOWN.0
    }
}

impl Default for Entry {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

/// Round lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BoardState {
    /// No snapshot received yet.
    #[default]
    Unknown,
    Ongoing,
    Lost,
    Won,
}

impl BoardState {
    /// Wire representation.
    pub const fn to_byte(self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::Ongoing => 1,
            Self::Lost => 2,
            Self::Won => 3,
        }
    }

    /// Parses the wire representation. Returns `None` for unassigned bytes.
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Unknown),
            1 => Some(Self::Ongoing),
            2 => Some(Self::Lost),
            3 => Some(Self::Won),
            _ => None,
        }
    }

    /// Returns `true` once the round has been lost or won.
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Lost | Self::Won)
    }
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "Unknown"),
            Self::Ongoing => write!(f, "Ongoing"),
            Self::Lost => write!(f, "Lost"),
            Self::Won => write!(f, "Won"),
        }
    }
}

/// Board dimensions and mine count of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BoardConfig {
    pub width: u16,
    pub height: u16,
    pub mine_count: u32,
}

/// Player display color. `a` is the raw wire byte; see [`Color::alpha`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opacity in `0.0..=1.0`.
    pub fn alpha(&self) -> f32 {
        f32::from(self.a) / 255.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {:.3})", self.r, self.g, self.b, self.alpha())
    }
}

/// A player's public identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerInfo {
    pub player_id: PlayerId,
    pub color: Color,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Packet payloads
// ---------------------------------------------------------------------------

/// One sparse update record: the new value and owner of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellUpdate {
    pub pos: Position,
    pub entry: Entry,
    pub owner: PlayerId,
}

/// A complete board snapshot. Grids are row-major, `height × width`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullBoard {
    pub config: BoardConfig,
    pub state: BoardState,
    pub entries: Vec<Entry>,
    pub owners: Vec<PlayerId>,
}

impl FullBoard {
    /// Number of cells the declared dimensions call for.
    pub fn cell_count(&self) -> usize {
        usize::from(self.config.width) * usize::from(self.config.height)
    }
}

/// Details the authority reveals when a round is lost.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LossReport {
    pub loser: PlayerId,
    /// Mines that were revealed by the losing move(s).
    pub hit_mines: Vec<Position>,
    /// Flags that were placed on cells without a mine.
    pub wrong_flags: Vec<Position>,
}

// ---------------------------------------------------------------------------
// Packets
// ---------------------------------------------------------------------------

/// Authority → client packets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerPacket {
    FullBoard(FullBoard),
    SparseBoard(Vec<CellUpdate>),
    PlayerInfo(PlayerInfo),
    /// Same shape as `PlayerInfo`, but names the receiving client.
    YourPlayerInfo(PlayerInfo),
    BoardLoss(LossReport),
    BoardWin,
    /// Advisory config of the next round.
    NextBoardConfig(BoardConfig),
}

impl ServerPacket {
    pub const FULL_BOARD: u8 = 0;
    pub const SPARSE_BOARD: u8 = 1;
    pub const PLAYER_INFO: u8 = 2;
    pub const YOUR_PLAYER_INFO: u8 = 3;
    pub const BOARD_LOSS: u8 = 4;
    pub const BOARD_WIN: u8 = 5;
    pub const NEXT_BOARD_CONFIG: u8 = 6;

    /// The leading type byte of this packet.
    pub const fn tag(&self) -> u8 {
        match self {
            Self::FullBoard(_) => Self::FULL_BOARD,
            Self::SparseBoard(_) => Self::SPARSE_BOARD,
            Self::PlayerInfo(_) => Self::PLAYER_INFO,
            Self::YourPlayerInfo(_) => Self::YOUR_PLAYER_INFO,
            Self::BoardLoss(_) => Self::BOARD_LOSS,
            Self::BoardWin => Self::BOARD_WIN,
            Self::NextBoardConfig(_) => Self::NEXT_BOARD_CONFIG,
        }
    }

    /// Short name for logs and error messages.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::FullBoard(_) => "FullBoard",
            Self::SparseBoard(_) => "SparseBoard",
            Self::PlayerInfo(_) => "PlayerInfo",
            Self::YourPlayerInfo(_) => "YourPlayerInfo",
            Self::BoardLoss(_) => "BoardLoss",
            Self::BoardWin => "BoardWin",
            Self::NextBoardConfig(_) => "NextBoardConfig",
        }
    }
}

/// Client → authority intents. Fire-and-forget; there is no reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientPacket {
    RevealSquare(Position),
    /// Reveal all unflagged neighbours of a satisfied number.
    ChordSquare(Position),
    ToggleFlag(Position),
    /// Ask for a fresh round once the current one is over.
    NewBoard,
    NextBoardConfig(BoardConfig),
}

impl ClientPacket {
    pub const REVEAL_SQUARE: u8 = 0;
    pub const CHORD_SQUARE: u8 = 1;
    pub const TOGGLE_FLAG: u8 = 2;
    pub const NEW_BOARD: u8 = 3;
    pub const NEXT_BOARD_CONFIG: u8 = 4;

    pub const fn tag(&self) -> u8 {
        match self {
            Self::RevealSquare(_) => Self::REVEAL_SQUARE,
            Self::ChordSquare(_) => Self::CHORD_SQUARE,
            Self::ToggleFlag(_) => Self::TOGGLE_FLAG,
            Self::NewBoard => Self::NEW_BOARD,
            Self::NextBoardConfig(_) => Self::NEXT_BOARD_CONFIG,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::RevealSquare(_) => "RevealSquare",
            Self::ChordSquare(_) => "ChordSquare",
            Self::ToggleFlag(_) => "ToggleFlag",
            Self::NewBoard => "NewBoard",
            Self::NextBoardConfig(_) => "NextBoardConfig",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_is_scoring_covers_zero_through_nine() {
        for value in 0..=9 {
            assert!(Entry(value).is_scoring(), "{value} should score");
        }
        assert!(!Entry(10).is_scoring());
        assert!(!Entry::UNKNOWN.is_scoring());
        assert!(!Entry::FLAGGED.is_scoring());
        assert!(!Entry::MINE.is_scoring());
    }

    #[test]
    fn test_board_state_from_byte_rejects_unassigned_values() {
        for state in [
            BoardState::Unknown,
            BoardState::Ongoing,
            BoardState::Lost,
            BoardState::Won,
        ] {
            assert_eq!(BoardState::from_byte(state.to_byte()), Some(state));
        }
        assert_eq!(BoardState::from_byte(4), None);
    }

    #[test]
    fn test_color_alpha_scales_wire_byte() {
        assert_eq!(Color::new(0, 0, 0, 255).alpha(), 1.0);
        assert_eq!(Color::new(0, 0, 0, 0).alpha(), 0.0);
        assert_eq!(Color::new(1, 2, 3, 51).to_string(), "rgba(1, 2, 3, 0.200)");
    }

    #[test]
    fn test_player_id_none_is_reserved_zero() {
        assert!(PlayerId::NONE.is_none());
        assert!(!PlayerId(3).is_none());
        assert_eq!(PlayerId(3).to_string(), "P-3");
    }
}
