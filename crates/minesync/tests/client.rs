//! Integration tests for the client driver over a real loopback WebSocket.
//!
//! The test plays the game authority with a `WebSocketListener` and
//! speaks the binary protocol with the same packet types the client uses.

use std::time::Duration;

use minesync::prelude::*;
use minesync::transport::{Connection, Frame, Listener, ServerConnection, WebSocketListener};

// =========================================================================
// Helpers
// =========================================================================

async fn bind() -> (WebSocketListener, String) {
    let listener = WebSocketListener::bind("127.0.0.1:0")
        .await
        .expect("should bind");
    let addr = listener.local_addr().expect("should have addr");
    (listener, format!("ws://{addr}/websocket/"))
}

fn fast_reconnect() -> ReconnectConfig {
    ReconnectConfig {
        initial_backoff_ms: 10,
        max_backoff_ms: 20,
    }
}

fn start(url: String) -> (MinesyncClient, EventReceiver) {
    MinesyncClient::builder()
        .url(url)
        .reconnect(fast_reconnect())
        .start_websocket()
        .expect("client should start")
}

async fn next_event(events: &mut EventReceiver) -> ClientEvent {
    tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel should be open")
}

/// Skips events until one matches.
async fn wait_for(
    events: &mut EventReceiver,
    matches: impl Fn(&ClientEvent) -> bool,
) -> ClientEvent {
    loop {
        let event = next_event(events).await;
        if matches(&event) {
            return event;
        }
    }
}

async fn push(server: &ServerConnection, packet: ServerPacket) {
    let bytes = packet.encode().expect("test packet should encode");
    server.send(&bytes).await.expect("server send should succeed");
}

fn two_by_two() -> ServerPacket {
    ServerPacket::FullBoard(minesync::protocol::FullBoard {
        config: BoardConfig {
            width: 2,
            height: 2,
            mine_count: 1,
        },
        state: BoardState::Ongoing,
        entries: vec![Entry(0), Entry(1), Entry(1), Entry::UNKNOWN],
        owners: vec![PlayerId(1), PlayerId(1), PlayerId(2), PlayerId(0)],
    })
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_client_mirrors_authority_and_sends_intents() {
    let (mut listener, url) = bind().await;
    let (client, mut events) = start(url);

    let server = listener.accept().await.expect("should accept");
    assert_eq!(next_event(&mut events).await, ClientEvent::Connecting);
    assert_eq!(next_event(&mut events).await, ClientEvent::Connected);
    assert!(client.status().is_connected());

    // --- Authority → client ---
    push(
        &server,
        ServerPacket::YourPlayerInfo(PlayerInfo {
            player_id: PlayerId(1),
            color: Color::new(200, 10, 10, 255),
            name: "me".to_string(),
        }),
    )
    .await;
    push(&server, two_by_two()).await;
    push(
        &server,
        ServerPacket::SparseBoard(vec![CellUpdate {
            pos: Position::new(1, 1),
            entry: Entry::FLAGGED,
            owner: PlayerId(2),
        }]),
    )
    .await;

    let event = wait_for(&mut events, |e| {
        matches!(e, ClientEvent::State(StateChange::CellsUpdated { .. }))
    })
    .await;
    assert_eq!(
        event,
        ClientEvent::State(StateChange::CellsUpdated {
            applied: vec![CellUpdate {
                pos: Position::new(1, 1),
                entry: Entry::FLAGGED,
                owner: PlayerId(2),
            }],
            skipped: 0,
        })
    );

    {
        let state = client.state().await;
        assert_eq!(state.board_state(), BoardState::Ongoing);
        assert_eq!(state.flag_count(), 1);
        assert_eq!(state.scores().get(PlayerId(1)), 2);
        assert_eq!(state.scores().get(PlayerId(2)), 1);
        assert_eq!(state.self_info().map(|me| me.name.as_str()), Some("me"));
        assert_eq!(state.check_invariants(), Ok(()));
    }

    // --- Client → authority ---
    client.reveal(Position::new(0, 1)).expect("client is running");
    let frame = tokio::time::timeout(Duration::from_secs(5), server.recv())
        .await
        .expect("timed out waiting for intent")
        .expect("recv should succeed")
        .expect("connection should be open");
    assert_eq!(frame, Frame::Binary(vec![0, 0, 0, 1, 0]));

    client.shutdown().await.expect("shutdown should succeed");
}

#[tokio::test]
async fn test_client_drops_malformed_packet_and_keeps_going() {
    let (mut listener, url) = bind().await;
    let (client, mut events) = start(url);
    let server = listener.accept().await.unwrap();
    wait_for(&mut events, |e| *e == ClientEvent::Connected).await;

    // A FullBoard that declares 2x2 but carries no grids.
    server.send(&[0, 2, 0, 2, 0, 1, 0, 0, 0, 1]).await.unwrap();
    let event = next_event(&mut events).await;
    assert!(matches!(event, ClientEvent::PacketDropped(_)), "{event:?}");
    assert_eq!(client.state().await.board_state(), BoardState::Unknown);

    // The next valid packet still applies.
    push(&server, two_by_two()).await;
    let event = next_event(&mut events).await;
    assert!(
        matches!(event, ClientEvent::State(StateChange::BoardReplaced { .. })),
        "{event:?}"
    );

    client.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_client_ignores_text_frames() {
    use futures_util::SinkExt;
    use tokio_tungstenite::tungstenite::Message;

    // A raw peer, since the transport only sends binary frames.
    let tcp = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = tcp.local_addr().unwrap();
    let (client, mut events) = start(format!("ws://{addr}/websocket/"));
    let (stream, _) = tcp.accept().await.unwrap();
    let mut server = tokio_tungstenite::accept_async(stream).await.unwrap();
    wait_for(&mut events, |e| *e == ClientEvent::Connected).await;

    server.send(Message::text("hello from the authority")).await.unwrap();
    let board = two_by_two().encode().expect("test packet should encode");
    server.send(Message::binary(board)).await.unwrap();

    // The text frame produced no event; the first one is the snapshot.
    let event = next_event(&mut events).await;
    assert!(
        matches!(event, ClientEvent::State(StateChange::BoardReplaced { .. })),
        "{event:?}"
    );
    assert!(client.status().is_connected());
    assert_eq!(client.state().await.board().width(), 2);

    client.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_client_reconnects_after_authority_closes() {
    let (mut listener, url) = bind().await;
    let (client, mut events) = start(url);

    let first = listener.accept().await.unwrap();
    wait_for(&mut events, |e| *e == ClientEvent::Connected).await;
    push(&first, two_by_two()).await;
    wait_for(&mut events, |e| matches!(e, ClientEvent::State(_))).await;

    first.close().await.unwrap();

    let event = wait_for(&mut events, |e| {
        matches!(e, ClientEvent::Disconnected { .. })
    })
    .await;
    assert_eq!(
        event,
        ClientEvent::Disconnected {
            retry_in: Duration::from_millis(10)
        }
    );

    let second = listener.accept().await.expect("client should reconnect");
    wait_for(&mut events, |e| *e == ClientEvent::Connected).await;

    // The mirror survives the reconnect until the authority resends.
    assert_eq!(client.state().await.board().width(), 2);

    push(&second, ServerPacket::BoardWin).await;
    let event = wait_for(&mut events, |e| matches!(e, ClientEvent::State(_))).await;
    assert_eq!(
        event,
        ClientEvent::State(StateChange::RoundWon {
            winners: vec![PlayerId(1)]
        })
    );

    client.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_client_without_authority_backs_off_and_shuts_down() {
    let (listener, url) = bind().await;
    drop(listener);
    let (client, mut events) = start(url);

    assert_eq!(next_event(&mut events).await, ClientEvent::Connecting);
    assert_eq!(
        next_event(&mut events).await,
        ClientEvent::Disconnected {
            retry_in: Duration::from_millis(10)
        }
    );
    assert_eq!(next_event(&mut events).await, ClientEvent::Connecting);
    assert_eq!(
        next_event(&mut events).await,
        ClientEvent::Disconnected {
            retry_in: Duration::from_millis(20)
        }
    );

    // Intents while disconnected are accepted and silently dropped.
    client.reveal(Position::new(0, 0)).expect("client is running");
    assert!(!client.status().is_connected());

    let status = client.watch_status();
    client.shutdown().await.expect("shutdown should succeed");
    assert_eq!(*status.borrow(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_next_board_config_over_limit_is_rejected_locally() {
    let (listener, url) = bind().await;
    drop(listener);
    let (client, _events) = start(url);

    let result = client.next_board_config(101, 10, 10);

    assert!(matches!(result, Err(MinesyncError::InvalidIntent(_))));
    assert!(client.next_board_config(100, 100, 10).is_ok());
    client.shutdown().await.unwrap();
}
