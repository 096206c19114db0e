//! Server network layer handling WebSocket connections and the event loop
//!
//! Connection tasks only move bytes. Every inbound text frame is forwarded to
//! the main loop over one channel, and the main loop alone owns the session,
//! so moves are applied one at a time in arrival order without locks.

use crate::client_manager::ClientManager;
use crate::game::GameSession;
use crate::protocol::{handle_message, welcome, Delivery};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::ServerEvent;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// Messages sent from connection tasks to the main server loop
#[derive(Debug)]
pub enum ServerMessage {
    TextReceived { client_id: u32, text: String },
    Disconnected { client_id: u32 },
    Shutdown,
}

/// Main server owning the game session and all connections
pub struct Server {
    listener: TcpListener,
    clients: ClientManager,
    session: GameSession,

    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
}

impl Server {
    pub async fn new(addr: &str, max_clients: usize) -> Result<Self, Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(addr).await?;
        info!("Server listening on {}", listener.local_addr()?);

        let (server_tx, server_rx) = mpsc::unbounded_channel();

        Ok(Server {
            listener,
            clients: ClientManager::new(max_clients),
            session: GameSession::new(),
            server_tx,
            server_rx,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Sender into the main loop; send [`ServerMessage::Shutdown`] to stop it.
    pub fn handle(&self) -> mpsc::UnboundedSender<ServerMessage> {
        self.server_tx.clone()
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Registers a new connection, queues its `init` event and spawns its task.
    fn accept_connection(&mut self, stream: TcpStream, addr: SocketAddr) {
        let (client_tx, client_rx) = mpsc::unbounded_channel();

        let Some(client_id) = self.clients.add_client(addr, client_tx) else {
            warn!("Rejecting connection from {}: server full", addr);
            return;
        };

        self.send_event(client_id, &welcome(&self.session));
        tokio::spawn(serve_connection(
            client_id,
            stream,
            client_rx,
            self.server_tx.clone(),
        ));
    }

    fn handle_text(&mut self, client_id: u32, text: &str) {
        debug!("Client {} sent {}", client_id, text);

        for delivery in handle_message(&mut self.session, text) {
            match delivery {
                Delivery::Reply(event) => self.send_event(client_id, &event),
                Delivery::Broadcast(event) => self.broadcast_event(&event),
            }
        }
    }

    fn send_event(&self, client_id: u32, event: &ServerEvent) {
        match serde_json::to_string(event) {
            Ok(payload) => {
                self.clients.send_to(client_id, &payload);
            }
            Err(e) => error!("Failed to encode event for client {}: {}", client_id, e),
        }
    }

    fn broadcast_event(&self, event: &ServerEvent) {
        match serde_json::to_string(event) {
            Ok(payload) => {
                let delivered = self.clients.broadcast(&payload);
                debug!("Broadcast reached {}/{} clients", delivered, self.clients.len());
            }
            Err(e) => error!("Failed to encode broadcast: {}", e),
        }
    }

    /// Main server loop: accepts connections and processes client messages
    /// until shut down.
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        info!("Server started successfully");

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => self.accept_connection(stream, addr),
                        Err(e) => error!("Failed to accept connection: {}", e),
                    }
                },

                message = self.server_rx.recv() => {
                    match message {
                        Some(ServerMessage::TextReceived { client_id, text }) => {
                            self.handle_text(client_id, &text);
                        },
                        Some(ServerMessage::Disconnected { client_id }) => {
                            self.clients.remove_client(&client_id);
                        },
                        Some(ServerMessage::Shutdown) | None => {
                            info!("Server shutting down");
                            break;
                        }
                    }
                },
            }
        }

        Ok(())
    }
}

/// Performs the WebSocket handshake and shuttles frames for one connection
/// until either side closes.
async fn serve_connection(
    client_id: u32,
    stream: TcpStream,
    mut outbound: mpsc::UnboundedReceiver<String>,
    server_tx: mpsc::UnboundedSender<ServerMessage>,
) {
    match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => {
            let (mut sink, mut source) = ws.split();

            let writer = tokio::spawn(async move {
                while let Some(payload) = outbound.recv().await {
                    if let Err(e) = sink.send(Message::Text(payload)).await {
                        debug!("Write to client {} failed: {}", client_id, e);
                        break;
                    }
                }
                let _ = sink.close().await;
            });

            while let Some(frame) = source.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        if server_tx
                            .send(ServerMessage::TextReceived { client_id, text })
                            .is_err()
                        {
                            break;
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        debug!("Read from client {} failed: {}", client_id, e);
                        break;
                    }
                }
            }

            writer.abort();
        }
        Err(e) => warn!("WebSocket handshake with client {} failed: {}", client_id, e),
    }

    if server_tx
        .send(ServerMessage::Disconnected { client_id })
        .is_err()
    {
        debug!("Server loop gone before client {} was unregistered", client_id);
    }
}
