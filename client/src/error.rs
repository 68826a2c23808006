use shared::{ErrorCode, ProtocolError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Connection closed by server")]
    ConnectionClosed,

    #[error("Server did not send a BOARD_CONFIG banner")]
    MissingBanner,

    #[error("Server rejected the request: {code} {message}")]
    Rejected { code: ErrorCode, message: String },

    #[error("Command must be a single non-blank line: {0:?}")]
    InvalidCommand(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
