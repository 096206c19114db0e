//! Connection registry and outbound fan-out for the game server
//!
//! This module tracks every open connection, including spectators, together
//! with the queue its writer task drains:
//! - Connection lifecycle (register on accept, unregister on close)
//! - Capacity enforcement
//! - Private sends and best-effort broadcasts
//!
//! Connections are not players. Which side a message acts for comes from the
//! message itself, so any number of connections may watch the same session.

use log::{info, warn};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Instant;
use tokio::sync::mpsc;

/// A connected client and the queue feeding its socket
#[derive(Debug)]
pub struct Client {
    /// Unique connection identifier assigned by the server
    pub id: u32,
    /// Peer address, for logging
    pub addr: SocketAddr,
    /// When the connection was accepted
    pub connected_at: Instant,
    /// Serialized events waiting to be written to the socket
    sender: mpsc::UnboundedSender<String>,
}

impl Client {
    pub fn new(id: u32, addr: SocketAddr, sender: mpsc::UnboundedSender<String>) -> Self {
        Self {
            id,
            addr,
            connected_at: Instant::now(),
            sender,
        }
    }

    /// Queues a payload for this client
    ///
    /// Returns false if the writer side has already gone away. The failure is
    /// not retried.
    pub fn send(&self, payload: &str) -> bool {
        self.sender.send(payload.to_string()).is_ok()
    }
}

/// Manages all open connections
///
/// Owned by the server's event loop; nothing else holds a reference, so no
/// locking is needed.
pub struct ClientManager {
    /// Connected clients indexed by their unique ID
    clients: HashMap<u32, Client>,
    /// Next available client ID for new connections
    next_client_id: u32,
    /// Maximum number of concurrent connections allowed
    max_clients: usize,
}

impl ClientManager {
    /// Creates an empty registry. Client IDs start from 1.
    pub fn new(max_clients: usize) -> Self {
        Self {
            clients: HashMap::new(),
            next_client_id: 1,
            max_clients,
        }
    }

    /// Registers a new connection
    ///
    /// Returns Some(client_id) if successful, None if the server is at capacity.
    pub fn add_client(
        &mut self,
        addr: SocketAddr,
        sender: mpsc::UnboundedSender<String>,
    ) -> Option<u32> {
        if self.clients.len() >= self.max_clients {
            return None;
        }

        let client_id = self.next_client_id;
        self.next_client_id += 1;

        info!("Client {} connected from {}", client_id, addr);
        self.clients
            .insert(client_id, Client::new(client_id, addr, sender));

        Some(client_id)
    }

    /// Removes a connection. Returns false if it was already gone.
    pub fn remove_client(&mut self, client_id: &u32) -> bool {
        if let Some(client) = self.clients.remove(client_id) {
            info!(
                "Client {} disconnected after {:.1}s",
                client.id,
                client.connected_at.elapsed().as_secs_f32()
            );
            true
        } else {
            false
        }
    }

    /// Sends a payload to one client
    pub fn send_to(&self, client_id: u32, payload: &str) -> bool {
        match self.clients.get(&client_id) {
            Some(client) if client.send(payload) => true,
            Some(client) => {
                warn!("Dropping message for client {} ({})", client.id, client.addr);
                false
            }
            None => {
                warn!("Dropping message for unknown client {}", client_id);
                false
            }
        }
    }

    /// Sends a payload to every client
    ///
    /// Each send is independent: a client whose queue is closed is skipped
    /// without affecting the others. Returns the number of clients reached.
    pub fn broadcast(&self, payload: &str) -> usize {
        let mut delivered = 0;
        for client in self.clients.values() {
            if client.send(payload) {
                delivered += 1;
            } else {
                warn!("Broadcast to client {} ({}) failed", client.id, client.addr);
            }
        }
        delivered
    }

    /// Gets all client IDs and their peer addresses
    pub fn get_client_addrs(&self) -> Vec<(u32, SocketAddr)> {
        self.clients
            .iter()
            .map(|(id, client)| (*id, client.addr))
            .collect()
    }

    /// Returns the number of currently connected clients
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns true if no clients are currently connected
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
