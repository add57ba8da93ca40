//! # minesync
//!
//! Client-side synchronization of a shared multiplayer minesweeper board.
//!
//! A remote authority owns the game. minesync keeps a local mirror of it
//! current over a binary WebSocket protocol, reconnects with backoff when
//! the connection drops, and sends the player's intents back.
//!
//! ```text
//! transport → decode → StateStore::apply → ClientEvent
//!     ↑                                        │
//!     └──── encode ←── intents ←── embedding app
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use minesync::prelude::*;
//!
//! # async fn demo() -> Result<(), MinesyncError> {
//! minesync::init_tracing("info");
//!
//! let (client, mut events) = MinesyncClient::builder()
//!     .url("ws://127.0.0.1:8080/websocket/")
//!     .start_websocket()?;
//!
//! client.reveal(Position::new(0, 0))?;
//! while let Some(event) = events.recv().await {
//!     tracing::info!(?event, "client event");
//! }
//! client.shutdown().await
//! # }
//! ```

mod client;
mod config;
mod error;
mod handler;
mod intent;

pub use client::{ClientEvent, EventReceiver, MinesyncClient, MinesyncClientBuilder};
pub use config::{BoardLimits, ClientConfig};
pub use error::{IntentError, MinesyncError};
pub use intent::{ActionMode, resolve_primary, resolve_secondary};

pub use minesync_protocol as protocol;
pub use minesync_session as session;
pub use minesync_state as state;
pub use minesync_transport as transport;

use tracing_subscriber::EnvFilter;

/// Installs a `tracing-subscriber` formatter as the global default.
///
/// `RUST_LOG` overrides `default_filter` when set. Returns `false` if a
/// global subscriber was already installed.
pub fn init_tracing(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}

/// Everything an embedding application usually needs.
pub mod prelude {
    pub use crate::{
        ActionMode, BoardLimits, ClientConfig, ClientEvent, EventReceiver, IntentError,
        MinesyncClient, MinesyncClientBuilder, MinesyncError, resolve_primary,
        resolve_secondary,
    };
    pub use minesync_protocol::{
        BoardConfig, BoardState, CellUpdate, ClientPacket, Color, Entry, PlayerId,
        PlayerInfo, Position, ServerPacket,
    };
    pub use minesync_session::{ConnectionState, ReconnectConfig};
    pub use minesync_state::{BoardInfo, ScoreRow, StateChange, StateStore};
    pub use minesync_transport::{Connector, WebSocketConnector};
}
