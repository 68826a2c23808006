//! # Bulletin Board Server Library
//!
//! This library implements the authoritative server for the shared bulletin
//! board. Clients connect over TCP and issue line-oriented commands to post
//! notes, pin and unpin them, and query the board with filters.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Board State
//! The server owns the only copy of the board. All validation (bounds, color
//! palette, duplicate placement, pin coverage) happens here, and clients only
//! ever see snapshots of the current state.
//!
//! ### Connection Handling
//! Every accepted connection runs in its own task. A connection reads one line,
//! answers with exactly one response and repeats until the peer disconnects.
//! A misbehaving or failing connection never affects the others.
//!
//! ## Architecture Design
//!
//! ### Task Per Connection, One Lock
//! All connections share a single `Arc<Board>`. The board guards its notes and
//! pins with one async mutex, so every command is applied atomically and the
//! sequence of operations seen by all clients is linearizable. No lock is held
//! across socket I/O.
//!
//! ### Closed Command Set
//! Protocol lines are parsed into a closed `Command` enum and dispatched with
//! an exhaustive match. Unknown verbs are an explicit error case.
//!
//! ## Module Organization
//!
//! ### Board Module (`board`)
//! Note and pin collections, filtering, and every board invariant.
//!
//! ### Command Module (`command`)
//! Tokenizing and parsing of raw protocol lines.
//!
//! ### Handlers Module (`handlers`)
//! One handler per verb, mapping board results to wire responses.
//!
//! ### Protocol Module (`protocol`)
//! The per-connection entry point: parse, dispatch, reply.
//!
//! ### Connection Module (`connection`)
//! The read-dispatch-write loop for a single client.
//!
//! ### Network Module (`network`)
//! TCP listener, server configuration and task spawning.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::{Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig {
//!         bind_addr: "127.0.0.1:4200".to_string(),
//!         ..Default::default()
//!     };
//!
//!     // Binds the listener and builds the shared board
//!     let server = Server::bind(config).await?;
//!
//!     // Accepts clients forever, one task per connection
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod board;
pub mod command;
pub mod config;
pub mod connection;
pub mod error;
pub mod handlers;
pub mod network;
pub mod protocol;
