//! The client driver task: connect, receive, apply, reconnect.
//!
//! One task owns the transport and the [`ConnectionManager`]. Each turn of
//! the outer loop is one connection attempt:
//!   1. Connect, while dropping any intents that arrive meanwhile
//!   2. Session: decode → apply → emit for every binary frame, and send
//!      queued intents, until the connection ends
//!   3. Report the close and sleep for the backoff delay
//!
//! A shutdown command ends the loop from any phase.

use std::sync::Arc;

use minesync_protocol::{ClientPacket, ServerPacket};
use minesync_session::{AttemptId, ConnectionManager, ConnectionState};
use minesync_state::StateStore;
use minesync_transport::{Connection, Connector, Frame, TransportError};
use tokio::sync::{Mutex, mpsc, watch};

use crate::ClientEvent;

/// Requests from [`MinesyncClient`](crate::MinesyncClient) handles.
#[derive(Debug)]
pub(crate) enum Command {
    Send(ClientPacket),
    Shutdown,
}

/// How a session phase ended.
enum SessionEnd {
    /// The peer closed the connection.
    Closed,
    /// The transport failed and the connection must be force-closed.
    Failed(TransportError),
    /// Shutdown was requested, or every client handle is gone.
    Shutdown,
}

pub(crate) struct Driver<C: Connector> {
    pub(crate) connector: C,
    pub(crate) manager: ConnectionManager,
    pub(crate) store: Arc<Mutex<StateStore>>,
    pub(crate) commands: mpsc::UnboundedReceiver<Command>,
    pub(crate) events: mpsc::UnboundedSender<ClientEvent>,
    pub(crate) status: watch::Sender<ConnectionState>,
}

impl<C: Connector> Driver<C> {
    /// Runs until shutdown. Connection loss is never fatal.
    pub(crate) async fn run(mut self) {
        loop {
            let attempt = self.manager.begin_connect();
            self.publish(ClientEvent::Connecting);

            let connected = tokio::select! {
                result = self.connector.connect() => result,
                () = drain_commands(&mut self.commands) => break,
            };

            match connected {
                Ok(conn) => {
                    if !self.open(attempt, &conn) {
                        close_quietly(&conn).await;
                        continue;
                    }
                    if self.session(attempt, &conn).await {
                        close_quietly(&conn).await;
                        break;
                    }
                }
                Err(err) => {
                    tracing::warn!(%attempt, error = %err, "connect failed");
                }
            }

            let retry_in = match self.manager.on_close(attempt) {
                Ok(delay) => delay,
                Err(err) => {
                    tracing::debug!(error = %err, "close already handled");
                    continue;
                }
            };
            self.publish(ClientEvent::Disconnected { retry_in });

            tokio::select! {
                () = tokio::time::sleep(retry_in) => {}
                () = drain_commands(&mut self.commands) => break,
            }
        }

        self.status.send_replace(ConnectionState::Disconnected);
        tracing::info!("client stopped");
    }

    /// Marks `attempt` open. Returns `false` if the manager rejected it.
    fn open<Conn: Connection>(&mut self, attempt: AttemptId, conn: &Conn) -> bool {
        match self.manager.on_open(attempt) {
            Ok(()) => {
                tracing::info!(%attempt, conn = %conn.id(), "connected");
                self.publish(ClientEvent::Connected);
                true
            }
            Err(err) => {
                tracing::debug!(error = %err, "dropping connection of stale attempt");
                false
            }
        }
    }

    /// Runs one connection until it ends. Returns `true` on shutdown.
    async fn session<Conn: Connection>(&mut self, attempt: AttemptId, conn: &Conn) -> bool {
        let end = loop {
            tokio::select! {
                frame = conn.recv() => match frame {
                    Ok(Some(Frame::Binary(data))) => {
                        if self.manager.accepts_message(attempt) {
                            self.handle_packet(&data).await;
                        }
                    }
                    Ok(Some(Frame::Text(text))) => {
                        tracing::debug!(%text, "ignoring text frame");
                    }
                    Ok(None) => break SessionEnd::Closed,
                    Err(err) => break SessionEnd::Failed(err),
                },
                command = self.commands.recv() => match command {
                    Some(Command::Send(packet)) => {
                        if let Err(err) = send_packet(conn, packet).await {
                            break SessionEnd::Failed(err);
                        }
                    }
                    Some(Command::Shutdown) | None => break SessionEnd::Shutdown,
                },
            }
        };

        match end {
            SessionEnd::Closed => {
                tracing::info!(%attempt, "connection closed by peer");
                false
            }
            SessionEnd::Failed(err) => {
                tracing::warn!(%attempt, error = %err, "transport error");
                if self.manager.on_error(attempt).is_ok() {
                    close_quietly(conn).await;
                }
                false
            }
            SessionEnd::Shutdown => true,
        }
    }

    /// Decodes one binary frame and applies it under the store lock.
    async fn handle_packet(&self, data: &[u8]) {
        let packet = match ServerPacket::decode(data) {
            Ok(packet) => packet,
            Err(err) => {
                tracing::warn!(error = %err, len = data.len(), "dropping packet");
                self.emit(ClientEvent::PacketDropped(err.to_string()));
                return;
            }
        };
        tracing::debug!(packet = packet.name(), len = data.len(), "packet received");

        let applied = self.store.lock().await.apply(packet);
        match applied {
            Ok(change) => self.emit(ClientEvent::State(change)),
            Err(err) => {
                tracing::warn!(error = %err, "packet rejected by store");
                self.emit(ClientEvent::PacketDropped(err.to_string()));
            }
        }
    }

    fn publish(&self, event: ClientEvent) {
        self.status.send_replace(self.manager.state());
        self.emit(event);
    }

    fn emit(&self, event: ClientEvent) {
        // Nobody listening is fine; the store still holds the state.
        let _ = self.events.send(event);
    }
}

async fn send_packet<Conn: Connection>(conn: &Conn, packet: ClientPacket) -> Result<(), TransportError> {
    let bytes = match packet.encode() {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(packet = packet.name(), error = %err, "cannot encode intent");
            return Ok(());
        }
    };
    tracing::debug!(packet = packet.name(), "sending intent");
    conn.send(&bytes).await
}

async fn close_quietly<Conn: Connection>(conn: &Conn) {
    if let Err(err) = conn.close().await {
        tracing::debug!(conn = %conn.id(), error = %err, "close failed");
    }
}

/// Consumes commands while no connection is open. Sends are dropped.
/// Completes on shutdown or when every client handle is gone.
async fn drain_commands(commands: &mut mpsc::UnboundedReceiver<Command>) {
    loop {
        match commands.recv().await {
            Some(Command::Send(packet)) => {
                tracing::debug!(packet = packet.name(), "not connected, dropping intent");
            }
            Some(Command::Shutdown) | None => return,
        }
    }
}
