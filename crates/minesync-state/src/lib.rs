//! Client-side state mirror for minesync.
//!
//! The authority owns the game; this crate keeps a faithful local copy of
//! it and nothing more. Mine placement, adjacency and win/loss decisions
//! all happen remotely and arrive here as packets.
//!
//! # Key types
//!
//! - [`StateStore`]: the mirror plus the reducer ([`StateStore::apply`])
//! - [`Board`]: entry and owner grids of the current round
//! - [`Scores`]: per-player scores, kept incrementally
//! - [`PlayerRegistry`]: names and colors by player id
//! - [`StateChange`]: what one `apply` call changed

mod board;
mod error;
mod registry;
mod score;
mod store;

pub use board::Board;
pub use error::{Inconsistency, StateError};
pub use registry::PlayerRegistry;
pub use score::{Scores, entry_score};
pub use store::{BoardInfo, LossDetail, ScoreRow, StateChange, StateStore};
