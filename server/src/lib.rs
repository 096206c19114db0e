//! # Game Server Library
//!
//! Authoritative rules engine and synchronization core for a two-player,
//! turn-based combat game on a 5x5 grid. The server holds the one true
//! session; clients send move intents and receive full-state broadcasts.
//!
//! ## Core Responsibilities
//!
//! ### Rules
//! Every piece may step one cell in any of the eight compass directions.
//! A step off the board or onto a friendly piece is refused; a step onto an
//! opposing piece captures it. The side that empties the other's roster wins
//! and the session starts over.
//!
//! ### State Broadcasting
//! A joining connection receives an `init` event with the full session. Each
//! accepted move is followed by an `update` to every connection, and a
//! winning move by `gameOver` plus an `update` carrying the fresh game.
//! Rejected moves get a private `invalid` reply and change nothing.
//!
//! ## Architecture Design
//!
//! ### Single-Threaded Event Loop
//! Connection tasks forward raw text into one channel. The main loop owns the
//! session and processes each message to completion before the next, so the
//! session is never shared and never locked.
//!
//! ### Derived Board
//! The board is re-projected from both rosters after every mutation rather
//! than patched, so it cannot disagree with them.
//!
//! ## Module Organization
//!
//! - `board`: occupancy grid projected from the rosters
//! - `rules`: move validation and the error taxonomy
//! - `game`: the session, move application, turn order, win and reset
//! - `protocol`: inbound payload to outbound event mapping
//! - `client_manager`: connection registry and fan-out
//! - `network`: WebSocket transport and the event loop
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Accept up to 32 simultaneous connections, players and spectators alike
//!     let mut server = Server::new("127.0.0.1:8080", 32).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod board;
pub mod client_manager;
pub mod game;
pub mod network;
pub mod protocol;
pub mod rules;
