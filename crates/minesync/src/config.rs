//! Client configuration.
//!
//! Everything has a default, so an empty JSON object is a valid config:
//!
//! ```json
//! {
//!   "url": "ws://127.0.0.1:8080/websocket/",
//!   "reconnect": { "initial_backoff_ms": 100, "max_backoff_ms": 1000 },
//!   "limits": { "max_side": 100, "mine_margin": 3 },
//!   "log_filter": "info"
//! }
//! ```

use minesync_session::ReconnectConfig;
use serde::{Deserialize, Serialize};

use crate::MinesyncError;

/// Bounds applied to outbound `NextBoardConfig` intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardLimits {
    /// Largest accepted width or height. Default: 100.
    pub max_side: u16,
    /// Mine counts above `u32::MAX - mine_margin` are rejected. Default: 3.
    pub mine_margin: u32,
}

impl Default for BoardLimits {
    fn default() -> Self {
        Self {
            max_side: 100,
            mine_margin: 3,
        }
    }
}

/// Settings for a [`MinesyncClient`](crate::MinesyncClient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// WebSocket endpoint of the game authority.
    pub url: String,
    pub reconnect: ReconnectConfig,
    pub limits: BoardLimits,
    /// Default `tracing` filter; `RUST_LOG` takes precedence.
    pub log_filter: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:8080/websocket/".to_string(),
            reconnect: ReconnectConfig::default(),
            limits: BoardLimits::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl ClientConfig {
    /// Parses a JSON config and validates its reconnect settings.
    ///
    /// # Errors
    /// [`MinesyncError::Config`] for malformed JSON,
    /// [`MinesyncError::Session`] for unusable reconnect delays.
    pub fn from_json_str(json: &str) -> Result<Self, MinesyncError> {
        let config: Self = serde_json::from_str(json)?;
        config.reconnect.validate()?;
        Ok(config)
    }
}
