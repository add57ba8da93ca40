//! The mirrored board: entry and owner grids of one round.

use minesync_protocol::{BoardConfig, Entry, FullBoard, PlayerId, Position};
use ndarray::Array2;

use crate::StateError;

/// Entry and owner grids, `height × width`, indexed `[row, col]`.
///
/// Dimensions are fixed for the lifetime of a `Board`; a new round
/// replaces the whole value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    config: BoardConfig,
    entries: Array2<Entry>,
    owners: Array2<PlayerId>,
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl Board {
    /// A 0×0 board with no mines, used before the first snapshot.
    pub fn empty() -> Self {
        Self {
            config: BoardConfig::default(),
            entries: Array2::default((0, 0)),
            owners: Array2::default((0, 0)),
        }
    }

    /// Builds a board from a decoded snapshot.
    ///
    /// # Errors
    /// [`StateError::ShapeMismatch`] if either grid has the wrong length.
    pub fn from_snapshot(snapshot: FullBoard) -> Result<Self, StateError> {
        let FullBoard {
            config,
            entries,
            owners,
            ..
        } = snapshot;
        let shape = (usize::from(config.height), usize::from(config.width));
        let mismatch = StateError::ShapeMismatch {
            width: config.width,
            height: config.height,
            expected: shape.0 * shape.1,
            entries: entries.len(),
            owners: owners.len(),
        };

        let entries = Array2::from_shape_vec(shape, entries).map_err(|_| mismatch.clone())?;
        let owners = Array2::from_shape_vec(shape, owners).map_err(|_| mismatch)?;

        Ok(Self {
            config,
            entries,
            owners,
        })
    }

    pub fn config(&self) -> BoardConfig {
        self.config
    }

    pub fn width(&self) -> u16 {
        self.config.width
    }

    pub fn height(&self) -> u16 {
        self.config.height
    }

    /// Returns `true` if `pos` names a cell of this board.
    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.config.height && pos.col < self.config.width
    }

    pub fn entry(&self, pos: Position) -> Option<Entry> {
        self.entries.get(index(pos)).copied()
    }

    pub fn owner(&self, pos: Position) -> Option<PlayerId> {
        self.owners.get(index(pos)).copied()
    }

    /// The entry grid, for renderers.
    pub fn entries(&self) -> &Array2<Entry> {
        &self.entries
    }

    /// The owner grid, for renderers.
    pub fn owners(&self) -> &Array2<PlayerId> {
        &self.owners
    }

    /// Iterates `(position, entry, owner)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Position, Entry, PlayerId)> + '_ {
        self.entries
            .indexed_iter()
            .zip(self.owners.iter())
            .map(|(((row, col), &entry), &owner)| {
                // Both dimensions come from u16 fields, so these never truncate.
                (Position::new(row as u16, col as u16), entry, owner)
            })
    }

    /// Counts flagged cells by scanning the grid.
    pub fn count_flags(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_flagged()).count()
    }

    /// Writes one cell and returns its previous `(entry, owner)`.
    ///
    /// # Errors
    /// [`StateError::OutOfBounds`] if `pos` is outside the board; nothing
    /// is written in that case.
    pub(crate) fn replace(
        &mut self,
        pos: Position,
        entry: Entry,
        owner: PlayerId,
    ) -> Result<(Entry, PlayerId), StateError> {
        let out_of_bounds = || StateError::OutOfBounds {
            pos,
            width: self.config.width,
            height: self.config.height,
        };
        let idx = index(pos);
        let prev_entry = self.entries.get(idx).copied().ok_or_else(out_of_bounds)?;
        let prev_owner = self.owners.get(idx).copied().ok_or_else(out_of_bounds)?;

        self.entries[idx] = entry;
        self.owners[idx] = owner;
        Ok((prev_entry, prev_owner))
    }
}

fn index(pos: Position) -> (usize, usize) {
    (usize::from(pos.row), usize::from(pos.col))
}
