//! # Bulletin Board Client Library
//!
//! A small, line-oriented client for the bulletin board server. It speaks the
//! same text protocol a user would type by hand and turns the server's
//! responses back into typed values from the `shared` crate.
//!
//! ## Module Organization
//!
//! ### Network Module (`network`)
//! [`BoardClient`] owns the TCP connection:
//! - Reading the `BOARD_CONFIG` banner on connect
//! - Sending one command and reading one complete response
//! - Convenience queries that parse notes and pins
//!
//! ### Error Module (`error`)
//! [`ClientError`] for transport failures, malformed server output and
//! rejected requests.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::BoardClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), client::ClientError> {
//!     let mut board = BoardClient::connect("127.0.0.1:4200").await?;
//!
//!     board.send("POST 10 10 yellow hello world").await?;
//!     for note in board.notes("contains=15 15").await? {
//!         println!("{}", note);
//!     }
//!
//!     board.disconnect().await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod network;

pub use error::{ClientError, Result};
pub use network::BoardClient;
