//! Per-player scores derived from the board.
//!
//! A player's score is the number of cells they own whose entry is a
//! revealed value (`0..=9`). The reducer keeps [`Scores`] current with
//! [`Scores::credit`]/[`Scores::debit`] per sparse record; the result must
//! always equal [`Scores::recompute`] over the same grids.

use std::collections::BTreeMap;

use minesync_protocol::{Entry, PlayerId};

use crate::Board;

/// Points a single cell is worth to its owner.
pub fn entry_score(entry: Entry) -> u32 {
    u32::from(entry.is_scoring())
}

/// Score table keyed by player.
///
/// Only positive scores are stored and the reserved id 0 is never stored,
/// so two tables describing the same standings always compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scores {
    by_player: BTreeMap<PlayerId, u32>,
}

impl Scores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full recomputation from the grids.
    pub fn recompute(board: &Board) -> Self {
        let mut scores = Self::new();
        for (_, entry, owner) in board.cells() {
            if entry.is_scoring() {
                scores.credit(owner);
            }
        }
        scores
    }

    /// Score of `player`; unknown players have 0.
    pub fn get(&self, player: PlayerId) -> u32 {
        self.by_player.get(&player).copied().unwrap_or(0)
    }

    /// Sum over all players.
    pub fn total(&self) -> u64 {
        self.by_player.values().map(|&s| u64::from(s)).sum()
    }

    /// Players with a positive score, by ascending id.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, u32)> + '_ {
        self.by_player.iter().map(|(&id, &score)| (id, score))
    }

    pub fn len(&self) -> usize {
        self.by_player.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_player.is_empty()
    }

    /// Players holding the highest score. Ties yield several winners.
    ///
    /// When nobody has scored, the reserved id 0 is the sole winner.
    pub fn winners(&self) -> Vec<PlayerId> {
        let Some(best) = self.by_player.values().copied().max() else {
            return vec![PlayerId::NONE];
        };
        self.by_player
            .iter()
            .filter(|&(_, &score)| score == best)
            .map(|(&id, _)| id)
            .collect()
    }

    /// Adds one point. No-op for id 0.
    pub(crate) fn credit(&mut self, player: PlayerId) {
        if player.is_none() {
            return;
        }
        *self.by_player.entry(player).or_insert(0) += 1;
    }

    /// Removes one point. No-op for id 0.
    pub(crate) fn debit(&mut self, player: PlayerId) {
        if player.is_none() {
            return;
        }
        let Some(score) = self.by_player.get_mut(&player) else {
            tracing::warn!(%player, "score debit for a player with no points");
            return;
        };
        *score -= 1;
        if *score == 0 {
            self.by_player.remove(&player);
        }
    }
}
