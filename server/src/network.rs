//! TCP listener that spawns one task per accepted client

use crate::board::Board;
use crate::connection::{CloseReason, Connection};
use crate::error::Result;
use crate::protocol::ProtocolHandler;
use log::{error, info, warn};
use shared::{BoardConfig, DEFAULT_PORT};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};

/// Everything needed to start a server, fixed for the process lifetime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: String,
    /// Board geometry and palette
    pub board: BoardConfig,
    /// Send the `BOARD_CONFIG` banner when a client connects
    pub send_banner: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: format!("127.0.0.1:{}", DEFAULT_PORT),
            board: BoardConfig::default(),
            send_banner: true,
        }
    }
}

/// Bulletin board server owning the listener and the one shared board
pub struct Server {
    listener: TcpListener,
    board: Arc<Board>,
    send_banner: bool,
    next_client_id: AtomicU32,
}

impl Server {
    /// Validates the board configuration and binds the listener
    pub async fn bind(config: ServerConfig) -> Result<Self> {
        let board_config = config.board.validated()?;
        let listener = TcpListener::bind(&config.bind_addr).await?;
        info!("Server listening on {}", listener.local_addr()?);
        info!("{}", board_config.banner());

        Ok(Server {
            listener,
            board: Arc::new(Board::new(board_config)),
            send_banner: config.send_banner,
            next_client_id: AtomicU32::new(1),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn board(&self) -> Arc<Board> {
        Arc::clone(&self.board)
    }

    /// Accept loop; runs until the task is dropped
    pub async fn run(self) -> Result<()> {
        info!("Server started successfully");

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => self.spawn_connection(stream, addr),
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        }
    }

    fn spawn_connection(&self, stream: TcpStream, addr: SocketAddr) {
        let client_id = self.next_client_id.fetch_add(1, Ordering::Relaxed);
        let handler = ProtocolHandler::new(Arc::clone(&self.board));
        let mut connection = Connection::new(client_id, addr.to_string(), handler);
        if self.send_banner {
            connection = connection.with_banner();
        }

        info!("Client {} connected from {}", client_id, addr);

        tokio::spawn(async move {
            let (reader, writer) = stream.into_split();
            match connection.run(reader, writer).await {
                Ok(CloseReason::EndOfStream) => {
                    info!("Client {} disconnected", connection.client_id())
                }
                Ok(CloseReason::Disconnected) => {
                    info!("Client {} closed the session", connection.client_id())
                }
                Err(e) => warn!("Client {} dropped: {}", connection.client_id(), e),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServerError;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

    fn local_config() -> ServerConfig {
        ServerConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, "127.0.0.1:4200");
        assert!(config.send_banner);
        assert_eq!(config.board, BoardConfig::default());
    }

    #[tokio::test]
    async fn test_bind_rejects_invalid_board() {
        let mut config = local_config();
        config.board.colors.clear();

        match Server::bind(config).await {
            Err(ServerError::Config(_)) => {}
            Err(e) => panic!("Expected configuration error, got {}", e),
            Ok(_) => panic!("Expected configuration error"),
        }
    }

    #[tokio::test]
    async fn test_bind_normalizes_palette() {
        let mut config = local_config();
        config.board.colors = vec!["RED".to_string()];

        let server = Server::bind(config).await.unwrap();
        assert_eq!(server.board().config().colors, vec!["red"]);
    }

    #[tokio::test]
    async fn test_banner_and_round_trip_over_tcp() {
        let server = Server::bind(local_config()).await.unwrap();
        let addr = server.local_addr().unwrap();
        let board = server.board();
        tokio::spawn(server.run());

        let stream = TcpStream::connect(addr).await.unwrap();
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        let banner = lines.next_line().await.unwrap().unwrap();
        assert_eq!(banner, BoardConfig::default().banner());

        writer.write_all(b"POST 0 0 yellow hi\n").await.unwrap();
        assert_eq!(lines.next_line().await.unwrap().unwrap(), "OK NOTE_POSTED");
        assert_eq!(board.note_count().await, 1);

        writer.write_all(b"DISCONNECT\n").await.unwrap();
        assert_eq!(lines.next_line().await.unwrap().unwrap(), "OK");
        assert_eq!(lines.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_no_banner_mode() {
        let config = ServerConfig {
            send_banner: false,
            ..local_config()
        };
        let server = Server::bind(config).await.unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.run());

        let stream = TcpStream::connect(addr).await.unwrap();
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        writer.write_all(b"GET PINS\n").await.unwrap();
        assert_eq!(lines.next_line().await.unwrap().unwrap(), "OK 0");
    }
}
