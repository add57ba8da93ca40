//! Player identities announced by the authority.

use std::collections::BTreeMap;

use minesync_protocol::{PlayerId, PlayerInfo};

/// Upsert-only map from player id to identity.
///
/// Entries are never removed; a player that left keeps their name and
/// color so that cells they own still render.
#[derive(Debug, Clone, Default)]
pub struct PlayerRegistry {
    players: BTreeMap<PlayerId, PlayerInfo>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the identity of `info.player_id`.
    ///
    /// Returns `true` if the player was not known before.
    pub fn upsert(&mut self, info: PlayerInfo) -> bool {
        self.players.insert(info.player_id, info).is_none()
    }

    /// Looks a player up. Identity packets may arrive after the player's
    /// first cells, so a miss is normal.
    pub fn get(&self, id: PlayerId) -> Option<&PlayerInfo> {
        self.players.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerInfo> {
        self.players.values()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
