//! The local mirror of the shared game and the reducer that feeds it.
//!
//! [`StateStore::apply`] is the only way state changes. It takes one
//! decoded [`ServerPacket`] at a time, in arrival order, and returns a
//! [`StateChange`] the renderer can use to redraw incrementally. Scores
//! and the flag count are adjusted per record rather than recomputed, so a
//! sparse update costs time proportional to its records, not the board.

use minesync_protocol::{
    BoardConfig, BoardState, CellUpdate, Color, FullBoard, LossReport, PlayerId,
    PlayerInfo, Position, ServerPacket,
};

use crate::{Board, Inconsistency, PlayerRegistry, Scores, StateError};

/// Extra information the authority sends when a round is lost.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LossDetail {
    pub loser: PlayerId,
    /// Mines uncovered by the losing move(s). Each names a mine cell.
    pub hit_mines: Vec<Position>,
    /// Flags placed on safe cells. Each names a flagged cell.
    pub wrong_flags: Vec<Position>,
}

/// What a single [`StateStore::apply`] call changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    /// A snapshot replaced the whole board and started a new round.
    BoardReplaced {
        config: BoardConfig,
        state: BoardState,
    },
    /// Sparse records were applied in order. `applied` holds the records
    /// that landed; `skipped` counts out-of-bounds ones.
    CellsUpdated {
        applied: Vec<CellUpdate>,
        skipped: usize,
    },
    PlayerUpdated(PlayerInfo),
    SelfUpdated(PlayerInfo),
    /// `skipped` counts loss coordinates that fell outside the board.
    RoundLost { loser: PlayerId, skipped: usize },
    RoundWon { winners: Vec<PlayerId> },
    /// Advisory config of the next round; nothing else changed.
    NextBoardConfig(BoardConfig),
}

/// One row of the scoreboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRow {
    pub player: PlayerId,
    pub name: String,
    pub color: Color,
    pub score: u32,
    pub is_self: bool,
    pub is_winner: bool,
    pub is_loser: bool,
}

/// Summary line shown next to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardInfo {
    pub width: u16,
    pub height: u16,
    pub mine_count: u32,
    pub flag_count: usize,
    /// `mine_count - flag_count`; negative when players over-flag.
    pub mines_left: i64,
}

/// The client-side mirror of board, owners, scores and players.
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    board: Board,
    state: BoardState,
    scores: Scores,
    flag_count: usize,
    players: PlayerRegistry,
    self_info: Option<PlayerInfo>,
    loss: Option<LossDetail>,
    next_config: Option<BoardConfig>,
}

impl StateStore {
    /// An empty store: 0×0 board, state `Unknown`, no players.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------
    // Reducer
    // -----------------------------------------------------------------

    /// Applies one packet.
    ///
    /// # Errors
    /// [`StateError::ShapeMismatch`] for a snapshot whose grids disagree
    /// with its dimensions. The store is left untouched in that case.
    /// Out-of-bounds records never fail the call; they are skipped and
    /// counted in the returned [`StateChange`].
    pub fn apply(&mut self, packet: ServerPacket) -> Result<StateChange, StateError> {
        let change = match packet {
            ServerPacket::FullBoard(snapshot) => self.apply_full_board(snapshot)?,
            ServerPacket::SparseBoard(updates) => self.apply_sparse(updates),
            ServerPacket::PlayerInfo(info) => {
                let inserted = self.players.upsert(info.clone());
                tracing::debug!(player = %info.player_id, name = %info.name, inserted, "player info");
                StateChange::PlayerUpdated(info)
            }
            ServerPacket::YourPlayerInfo(info) => {
                tracing::info!(player = %info.player_id, name = %info.name, "assigned own identity");
                self.self_info = Some(info.clone());
                StateChange::SelfUpdated(info)
            }
            ServerPacket::BoardLoss(report) => self.apply_loss(report),
            ServerPacket::BoardWin => {
                self.state = BoardState::Won;
                let winners = self.winners();
                tracing::info!(?winners, "round won");
                StateChange::RoundWon { winners }
            }
            ServerPacket::NextBoardConfig(config) => {
                tracing::debug!(?config, "next board config");
                self.next_config = Some(config);
                StateChange::NextBoardConfig(config)
            }
        };
        Ok(change)
    }

    fn apply_full_board(&mut self, snapshot: FullBoard) -> Result<StateChange, StateError> {
        let (config, state) = (snapshot.config, snapshot.state);
        let board = Board::from_snapshot(snapshot)?;

        self.scores = Scores::recompute(&board);
        self.flag_count = board.count_flags();
        self.board = board;
        self.state = state;
        self.loss = None;

        tracing::info!(
            width = config.width,
            height = config.height,
            mines = config.mine_count,
            %state,
            "full board received"
        );
        Ok(StateChange::BoardReplaced { config, state })
    }

    fn apply_sparse(&mut self, updates: Vec<CellUpdate>) -> StateChange {
        self.state = BoardState::Ongoing;

        let mut applied = Vec::with_capacity(updates.len());
        let mut skipped = 0;
        for update in updates {
            let (prev_entry, prev_owner) =
                match self.board.replace(update.pos, update.entry, update.owner) {
                    Ok(prev) => prev,
                    Err(err) => {
                        tracing::warn!(%err, "skipping sparse record");
                        skipped += 1;
                        continue;
                    }
                };

            if prev_entry.is_scoring() {
                self.scores.debit(prev_owner);
            }
            match (prev_entry.is_flagged(), update.entry.is_flagged()) {
                (true, false) => self.flag_count = self.flag_count.saturating_sub(1),
                (false, true) => self.flag_count += 1,
                _ => {}
            }
            if update.entry.is_scoring() {
                self.scores.credit(update.owner);
            }

            tracing::trace!(
                pos = %update.pos,
                entry = update.entry.0,
                owner = %update.owner,
                "cell updated"
            );
            applied.push(update);
        }

        StateChange::CellsUpdated { applied, skipped }
    }

    fn apply_loss(&mut self, report: LossReport) -> StateChange {
        self.state = BoardState::Lost;

        let mut skipped = 0;
        let mut keep = |positions: Vec<Position>, board: &Board| -> Vec<Position> {
            positions
                .into_iter()
                .filter(|&pos| {
                    let inside = board.contains(pos);
                    if !inside {
                        tracing::warn!(%pos, "loss coordinate outside the board");
                        skipped += 1;
                    }
                    inside
                })
                .collect()
        };
        let hit_mines = keep(report.hit_mines, &self.board);
        let wrong_flags = keep(report.wrong_flags, &self.board);

        for &pos in &hit_mines {
            if self.board.entry(pos).is_some_and(|e| !e.is_mine()) {
                tracing::warn!(%pos, "reported hit mine is not a mine cell");
            }
        }
        for &pos in &wrong_flags {
            if self.board.entry(pos).is_some_and(|e| !e.is_flagged()) {
                tracing::warn!(%pos, "reported wrong flag is not a flagged cell");
            }
        }

        tracing::info!(
            loser = %report.loser,
            hit_mines = hit_mines.len(),
            wrong_flags = wrong_flags.len(),
            "round lost"
        );
        self.loss = Some(LossDetail {
            loser: report.loser,
            hit_mines,
            wrong_flags,
        });
        StateChange::RoundLost {
            loser: report.loser,
            skipped,
        }
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_state(&self) -> BoardState {
        self.state
    }

    pub fn scores(&self) -> &Scores {
        &self.scores
    }

    pub fn flag_count(&self) -> usize {
        self.flag_count
    }

    pub fn players(&self) -> &PlayerRegistry {
        &self.players
    }

    /// The local viewer's identity, once the authority has sent it.
    pub fn self_info(&self) -> Option<&PlayerInfo> {
        self.self_info.as_ref()
    }

    /// Loss detail of the current round, if it was lost.
    pub fn loss_detail(&self) -> Option<&LossDetail> {
        self.loss.as_ref()
    }

    pub fn next_board_config(&self) -> Option<BoardConfig> {
        self.next_config
    }

    // -----------------------------------------------------------------
    // Derived views
    // -----------------------------------------------------------------

    /// Highest scorers; `[PlayerId(0)]` when nobody has scored.
    pub fn winners(&self) -> Vec<PlayerId> {
        self.scores.winners()
    }

    /// Owners of the cells named by the loss detail, hit mines first, then
    /// wrong flags. Each player appears once.
    pub fn losers(&self) -> Vec<PlayerId> {
        let Some(loss) = &self.loss else {
            return Vec::new();
        };
        let mut losers = Vec::new();
        for &pos in loss.hit_mines.iter().chain(&loss.wrong_flags) {
            if let Some(owner) = self.board.owner(pos) {
                if !losers.contains(&owner) {
                    losers.push(owner);
                }
            }
        }
        losers
    }

    /// Identity lookup: the local viewer first, then the registry.
    pub fn player(&self, id: PlayerId) -> Option<&PlayerInfo> {
        self.self_info
            .as_ref()
            .filter(|me| me.player_id == id)
            .or_else(|| self.players.get(id))
    }

    /// Scoreboard rows: the local viewer first, then everyone else by
    /// descending score, ties by ascending id.
    pub fn scoreboard(&self) -> Vec<ScoreRow> {
        let winners = match self.state {
            BoardState::Won => self.winners(),
            _ => Vec::new(),
        };
        let losers = match self.state {
            BoardState::Lost => self.losers(),
            _ => Vec::new(),
        };
        let me = self.self_info.as_ref().map(|info| info.player_id);
        let row = |player: PlayerId, info: Option<&PlayerInfo>| ScoreRow {
            player,
            name: info.map_or_else(|| player.to_string(), |i| i.name.clone()),
            color: info.map(|i| i.color).unwrap_or_default(),
            score: self.scores.get(player),
            is_self: Some(player) == me,
            is_winner: winners.contains(&player),
            is_loser: losers.contains(&player),
        };

        let mut others: Vec<ScoreRow> = self
            .players
            .iter()
            .filter(|info| Some(info.player_id) != me)
            .map(|info| row(info.player_id, Some(info)))
            .collect();
        for (player, _) in self.scores.iter() {
            if Some(player) != me && self.players.get(player).is_none() {
                others.push(row(player, None));
            }
        }
        others.sort_by(|a, b| b.score.cmp(&a.score).then(a.player.cmp(&b.player)));

        let mut rows = Vec::with_capacity(others.len() + 1);
        if let Some(info) = &self.self_info {
            rows.push(row(info.player_id, Some(info)));
        }
        rows.extend(others);
        rows
    }

    pub fn board_info(&self) -> BoardInfo {
        let config = self.board.config();
        BoardInfo {
            width: config.width,
            height: config.height,
            mine_count: config.mine_count,
            flag_count: self.flag_count,
            mines_left: i64::from(config.mine_count) - self.flag_count as i64,
        }
    }

    /// Re-derives scores and flag count from the grids and compares them
    /// with the incrementally maintained values.
    pub fn check_invariants(&self) -> Result<(), Inconsistency> {
        let recomputed = Scores::recompute(&self.board);
        if recomputed != self.scores {
            return Err(Inconsistency::Scores {
                incremental: self.scores.iter().collect(),
                recomputed: recomputed.iter().collect(),
            });
        }
        let counted = self.board.count_flags();
        if counted != self.flag_count {
            return Err(Inconsistency::FlagCount {
                tracked: self.flag_count,
                counted,
            });
        }
        Ok(())
    }
}
