//! Integration tests for the game server
//!
//! These tests run a real server on an ephemeral port and talk to it over
//! WebSocket connections, checking what each connection actually receives.

use futures_util::{SinkExt, StreamExt};
use server::network::{Server, ServerMessage};
use shared::{starting_roster, PieceKind, PieceRef, Player, ServerEvent, SessionSnapshot};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

const RECV_TIMEOUT: Duration = Duration::from_secs(2);
const QUIET_PERIOD: Duration = Duration::from_millis(200);

/// A full game in which A's H1 captures all five of B's pieces.
const WINNING_GAME: [(&str, &str); 13] = [
    ("A", "A-H1:B"),
    ("B", "B-H1:F"),
    ("A", "A-H1:B"),
    ("B", "B-P2:F"),
    ("A", "A-H1:B"),
    ("B", "B-P1:R"),
    ("A", "A-H1:L"),
    ("B", "B-H2:F"),
    ("A", "A-H1:B"),
    ("B", "B-P3:L"),
    ("A", "A-H1:R"),
    ("B", "B-H2:BL"),
    ("A", "A-H1:R"),
];

struct TestClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    async fn connect(addr: SocketAddr) -> Self {
        let (ws, _) = connect_async(format!("ws://{}", addr))
            .await
            .expect("Failed to connect");
        Self { ws }
    }

    /// Connects and consumes the `init` event.
    async fn join(addr: SocketAddr) -> (Self, SessionSnapshot) {
        let mut client = Self::connect(addr).await;
        match client.next_event().await {
            ServerEvent::Init { state } => (client, state),
            other => panic!("Expected init, got {:?}", other),
        }
    }

    async fn send_raw(&mut self, raw: &str) {
        self.ws
            .send(Message::Text(raw.to_string()))
            .await
            .expect("Failed to send");
    }

    async fn send_move(&mut self, player: &str, notation: &str) {
        let raw = serde_json::json!({ "type": "move", "player": player, "move": notation });
        self.send_raw(&raw.to_string()).await;
    }

    async fn next_event(&mut self) -> ServerEvent {
        loop {
            let frame = timeout(RECV_TIMEOUT, self.ws.next())
                .await
                .expect("Timed out waiting for event")
                .expect("Connection closed")
                .expect("Read error");
            if let Message::Text(text) = frame {
                return serde_json::from_str(&text).expect("Undecodable event");
            }
        }
    }

    async fn next_update(&mut self) -> SessionSnapshot {
        match self.next_event().await {
            ServerEvent::Update { state } => state,
            other => panic!("Expected update, got {:?}", other),
        }
    }

    /// Asserts nothing arrives for a short while.
    async fn expect_silence(&mut self) {
        if let Ok(frame) = timeout(QUIET_PERIOD, self.ws.next()).await {
            panic!("Expected no event, got {:?}", frame);
        }
    }
}

async fn start_server() -> (SocketAddr, mpsc::UnboundedSender<ServerMessage>) {
    let mut server = Server::new("127.0.0.1:0", 8)
        .await
        .expect("Failed to bind server");
    let addr = server.local_addr().unwrap();
    let handle = server.handle();

    tokio::spawn(async move {
        if let Err(e) = server.run().await {
            eprintln!("Server error: {}", e);
        }
    });

    (addr, handle)
}

/// CONNECTION AND SYNC TESTS
mod sync_tests {
    use super::*;

    #[tokio::test]
    async fn join_receives_initial_state() {
        let (addr, _handle) = start_server().await;
        let (_client, state) = TestClient::join(addr).await;

        assert_eq!(state.turn, Player::A);
        assert!(state.move_history.is_empty());
        assert_eq!(state.players.a, starting_roster(Player::A));
        assert_eq!(state.players.b, starting_roster(Player::B));
        assert_eq!(state.board[0][0], Some(PieceRef::new(Player::A, PieceKind::P1)));
        assert_eq!(state.board[4][2], Some(PieceRef::new(Player::B, PieceKind::H1)));
        assert!(state.board[2].iter().all(Option::is_none));
    }

    #[tokio::test]
    async fn late_joiner_sees_current_state() {
        let (addr, _handle) = start_server().await;
        let (mut first, _) = TestClient::join(addr).await;

        first.send_move("A", "A-H1:B").await;
        let after_move = first.next_update().await;

        let (_late, state) = TestClient::join(addr).await;
        assert_eq!(state, after_move);
        assert_eq!(state.move_history, vec!["A - A-H1:B".to_string()]);
    }

    #[tokio::test]
    async fn disconnect_does_not_disturb_others() {
        let (addr, _handle) = start_server().await;
        let (mut player_a, _) = TestClient::join(addr).await;
        let (gone, _) = TestClient::join(addr).await;
        drop(gone);

        player_a.send_move("A", "A-P3:B").await;
        let state = player_a.next_update().await;
        assert_eq!(state.turn, Player::B);
    }

    #[tokio::test]
    async fn shutdown_closes_server() {
        let (addr, handle) = start_server().await;
        tokio_test::assert_ok!(handle.send(ServerMessage::Shutdown));

        tokio::time::sleep(Duration::from_millis(100)).await;
        let attempt = timeout(RECV_TIMEOUT, connect_async(format!("ws://{}", addr))).await;
        assert!(!matches!(attempt, Ok(Ok(_))), "server still accepting after shutdown");
    }
}

/// MOVE PROTOCOL TESTS
mod move_tests {
    use super::*;

    #[tokio::test]
    async fn accepted_move_is_broadcast_to_everyone() {
        let (addr, _handle) = start_server().await;
        let (mut player_a, _) = TestClient::join(addr).await;
        let (mut player_b, _) = TestClient::join(addr).await;
        let (mut spectator, _) = TestClient::join(addr).await;

        player_a.send_move("A", "A-H1:B").await;

        for client in [&mut player_a, &mut player_b, &mut spectator] {
            let state = client.next_update().await;
            assert_eq!(state.turn, Player::B);
            assert_eq!(state.board[0][2], None);
            assert_eq!(state.board[1][2], Some(PieceRef::new(Player::A, PieceKind::H1)));
        }
    }

    #[tokio::test]
    async fn friendly_fire_is_rejected_privately() {
        let (addr, _handle) = start_server().await;
        let (mut player_a, _) = TestClient::join(addr).await;
        let (mut player_b, _) = TestClient::join(addr).await;

        player_a.send_move("A", "A-H1:R").await;

        assert_eq!(player_a.next_event().await, ServerEvent::Invalid);
        player_b.expect_silence().await;

        // Still A's turn.
        player_a.send_move("A", "A-H1:B").await;
        assert_eq!(player_a.next_update().await.turn, Player::B);
    }

    #[tokio::test]
    async fn out_of_turn_move_is_rejected() {
        let (addr, _handle) = start_server().await;
        let (mut player_a, _) = TestClient::join(addr).await;
        let (mut player_b, _) = TestClient::join(addr).await;

        player_a.send_move("A", "A-P1:B").await;
        player_a.next_update().await;
        player_b.next_update().await;

        player_a.send_move("A", "A-P2:B").await;
        assert_eq!(player_a.next_event().await, ServerEvent::Invalid);
        player_b.expect_silence().await;

        player_b.send_move("B", "B-P2:F").await;
        let state = player_b.next_update().await;
        assert_eq!(state.turn, Player::A);
        assert_eq!(state.move_history.len(), 2);
    }

    #[tokio::test]
    async fn unknown_and_malformed_moves_are_rejected() {
        let (addr, _handle) = start_server().await;
        let (mut client, initial) = TestClient::join(addr).await;

        client.send_move("A", "B-H1:F").await;
        assert_eq!(client.next_event().await, ServerEvent::Invalid);

        client.send_move("A", "A-H1:NOWHERE").await;
        assert_eq!(client.next_event().await, ServerEvent::Invalid);

        client.send_raw("this is not json").await;
        assert_eq!(client.next_event().await, ServerEvent::Invalid);

        client.send_raw(r#"{"type":"move","move":"A-H1:B"}"#).await;
        assert_eq!(client.next_event().await, ServerEvent::Invalid);

        let (_other, state) = TestClient::join(addr).await;
        assert_eq!(state, initial);
    }

    #[tokio::test]
    async fn winning_move_ends_and_resets_game() {
        let (addr, _handle) = start_server().await;
        let (mut player_a, _) = TestClient::join(addr).await;
        let (mut player_b, _) = TestClient::join(addr).await;

        let (last, opening) = WINNING_GAME.split_last().unwrap();
        for (i, (player, notation)) in opening.iter().enumerate() {
            let mover = if *player == "A" { &mut player_a } else { &mut player_b };
            mover.send_move(player, notation).await;

            let state_a = player_a.next_update().await;
            let state_b = player_b.next_update().await;
            assert_eq!(state_a, state_b);
            assert_eq!(state_a.move_history.len(), i + 1);
        }

        player_a.expect_silence().await;

        player_a.send_move(last.0, last.1).await;

        for client in [&mut player_a, &mut player_b] {
            assert_eq!(
                client.next_event().await,
                ServerEvent::GameOver { winner: Player::A }
            );
            let reset = client.next_update().await;
            assert_eq!(reset.turn, Player::A);
            assert!(reset.move_history.is_empty());
            assert_eq!(reset.players.a, starting_roster(Player::A));
            assert_eq!(reset.players.b, starting_roster(Player::B));
        }
    }
}
