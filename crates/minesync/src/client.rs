//! `MinesyncClient` builder and handle.
//!
//! This is the entry point for embedding a minesync client. It ties the
//! layers together: transport → protocol → state, with the session layer
//! deciding when to (re)connect.

use std::sync::Arc;
use std::time::Duration;

use minesync_protocol::{ClientPacket, Position};
use minesync_session::{ConnectionManager, ConnectionState, ReconnectConfig};
use minesync_state::{StateChange, StateStore};
use minesync_transport::{Connector, WebSocketConnector};
use tokio::sync::{Mutex, MutexGuard, mpsc, watch};
use tokio::task::JoinHandle;

use crate::handler::{Command, Driver};
use crate::{ActionMode, BoardLimits, ClientConfig, MinesyncError, resolve_primary};

/// Something the driver task wants the embedding application to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// A connection attempt started.
    Connecting,
    /// The connection is open; intents will be sent.
    Connected,
    /// The connection ended; the next attempt starts after `retry_in`.
    Disconnected { retry_in: Duration },
    /// A packet was applied to the store.
    State(StateChange),
    /// A packet was malformed or rejected and had no effect.
    PacketDropped(String),
}

/// Receives [`ClientEvent`]s in the order they happened.
pub type EventReceiver = mpsc::UnboundedReceiver<ClientEvent>;

/// Builder for configuring and starting a client.
///
/// # Example
///
/// ```rust,no_run
/// use minesync::prelude::*;
///
/// # async fn demo() -> Result<(), MinesyncError> {
/// let (client, mut events) = MinesyncClient::builder()
///     .url("ws://127.0.0.1:8080/websocket/")
///     .start_websocket()?;
///
/// while let Some(event) = events.recv().await {
///     if let ClientEvent::State(_) = event {
///         let state = client.state().await;
///         println!("{} flags", state.flag_count());
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MinesyncClientBuilder {
    config: ClientConfig,
}

impl MinesyncClientBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every setting at once, e.g. with a loaded config file.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the endpoint used by [`Self::start_websocket`].
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.url = url.into();
        self
    }

    pub fn reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.config.reconnect = reconnect;
        self
    }

    pub fn limits(mut self, limits: BoardLimits) -> Self {
        self.config.limits = limits;
        self
    }

    /// Spawns the driver task on the current Tokio runtime.
    ///
    /// Returns immediately; the first connection attempt happens in the
    /// background and is reported through the returned receiver.
    ///
    /// # Errors
    /// [`MinesyncError::Session`] if the reconnect settings are invalid.
    pub fn start<C: Connector>(
        self,
        connector: C,
    ) -> Result<(MinesyncClient, EventReceiver), MinesyncError> {
        let manager = ConnectionManager::new(self.config.reconnect)?;
        let store = Arc::new(Mutex::new(StateStore::new()));
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(manager.state());

        let driver = Driver {
            connector,
            manager,
            store: Arc::clone(&store),
            commands: command_rx,
            events: event_tx,
            status: status_tx,
        };
        let task = tokio::spawn(driver.run());

        let client = MinesyncClient {
            commands: command_tx,
            status: status_rx,
            store,
            limits: self.config.limits,
            task,
        };
        Ok((client, event_rx))
    }

    /// Starts with a [`WebSocketConnector`] dialing the configured URL.
    pub fn start_websocket(self) -> Result<(MinesyncClient, EventReceiver), MinesyncError> {
        let connector = WebSocketConnector::new(self.config.url.clone());
        self.start(connector)
    }
}

/// Handle to a running client.
///
/// Intents are fire-and-forget: they are queued to the driver task and
/// silently dropped if no connection is open when they are processed.
pub struct MinesyncClient {
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<ConnectionState>,
    store: Arc<Mutex<StateStore>>,
    limits: BoardLimits,
    task: JoinHandle<()>,
}

impl MinesyncClient {
    /// Creates a new builder.
    pub fn builder() -> MinesyncClientBuilder {
        MinesyncClientBuilder::new()
    }

    /// Locks the mirrored state for reading.
    ///
    /// The driver cannot apply packets while the guard is held, so keep
    /// it short.
    pub async fn state(&self) -> MutexGuard<'_, StateStore> {
        self.store.lock().await
    }

    /// Current connection state.
    pub fn status(&self) -> ConnectionState {
        *self.status.borrow()
    }

    /// A receiver that observes every connection state change.
    pub fn watch_status(&self) -> watch::Receiver<ConnectionState> {
        self.status.clone()
    }

    /// The limits applied by [`Self::next_board_config`].
    pub fn limits(&self) -> BoardLimits {
        self.limits
    }

    /// Queues a packet for the authority.
    ///
    /// # Errors
    /// [`MinesyncError::ClientClosed`] if the driver task has stopped.
    pub fn send(&self, packet: ClientPacket) -> Result<(), MinesyncError> {
        self.commands
            .send(Command::Send(packet))
            .map_err(|_| MinesyncError::ClientClosed)
    }

    pub fn reveal(&self, pos: Position) -> Result<(), MinesyncError> {
        self.send(ClientPacket::RevealSquare(pos))
    }

    pub fn chord(&self, pos: Position) -> Result<(), MinesyncError> {
        self.send(ClientPacket::ChordSquare(pos))
    }

    pub fn toggle_flag(&self, pos: Position) -> Result<(), MinesyncError> {
        self.send(ClientPacket::ToggleFlag(pos))
    }

    pub fn new_board(&self) -> Result<(), MinesyncError> {
        self.send(ClientPacket::NewBoard)
    }

    /// Validates and sends an advisory config for the next round.
    ///
    /// # Errors
    /// [`MinesyncError::InvalidIntent`] if the values exceed the limits.
    pub fn next_board_config(&self, width: u64, height: u64, mines: u64) -> Result<(), MinesyncError> {
        let packet = self.limits.next_board_config(width, height, mines)?;
        self.send(packet)
    }

    /// Resolves a primary click against the current round state and sends
    /// the result. Returns the packet that was queued.
    pub async fn primary_action(
        &self,
        mode: ActionMode,
        pos: Position,
        chord: bool,
    ) -> Result<ClientPacket, MinesyncError> {
        let board_state = self.store.lock().await.board_state();
        let packet = resolve_primary(board_state, mode, pos, chord);
        self.send(packet)?;
        Ok(packet)
    }

    /// Closes the live connection, if any, and waits for the driver task
    /// to finish.
    ///
    /// # Errors
    /// [`MinesyncError::ClientClosed`] if the task had already stopped
    /// abnormally.
    pub async fn shutdown(self) -> Result<(), MinesyncError> {
        // The task may already be gone; joining below reports that.
        let _ = self.commands.send(Command::Shutdown);
        self.task.await.map_err(|err| {
            tracing::warn!(error = %err, "client task ended abnormally");
            MinesyncError::ClientClosed
        })
    }
}
