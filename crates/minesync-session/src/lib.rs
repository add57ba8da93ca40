//! Connection lifecycle for minesync.
//!
//! This crate decides *when* to connect; it never performs I/O itself.
//!
//! 1. **State machine**: [`ConnectionManager`] tracks
//!    `Disconnected → Connecting → Connected` and rejects callbacks from
//!    superseded attempts ([`AttemptId`]).
//! 2. **Backoff**: [`Backoff`] doubles the reconnect delay per consecutive
//!    failure up to a cap, and resets on a successful open.
//! 3. **Config**: [`ReconnectConfig`] holds the two delay bounds.
//!
//! # How it fits in the stack
//!
//! ```text
//! Client driver (above)  ← owns the transport, reports events here
//!     ↕
//! Session layer (this crate)  ← answers with state and reconnect delays
//! ```

mod backoff;
mod config;
mod error;
mod manager;

pub use backoff::Backoff;
pub use config::ReconnectConfig;
pub use error::SessionError;
pub use manager::{AttemptId, ConnectionManager, ConnectionState};
