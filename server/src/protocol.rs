//! Per-connection protocol entry point
//!
//! [`ProtocolHandler`] takes a raw line, parses it and routes the resulting
//! [`Command`] to its handler. It holds the shared board by `Arc`, so every
//! connection gets its own cheap handle onto the same state.

use crate::board::Board;
use crate::command::Command;
use crate::handlers;
use log::debug;
use shared::{ErrorCode, Response};
use std::sync::Arc;

/// A response plus whether the connection should close after sending it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub response: Response,
    pub disconnect: bool,
}

impl Reply {
    fn keep_open(response: Response) -> Self {
        Self {
            response,
            disconnect: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProtocolHandler {
    board: Arc<Board>,
}

impl ProtocolHandler {
    pub fn new(board: Arc<Board>) -> Self {
        Self { board }
    }

    pub fn board(&self) -> &Arc<Board> {
        &self.board
    }

    /// Handles one raw line; `None` means the line was blank and gets no reply
    pub async fn process_line(&self, line: &str) -> Option<Reply> {
        match Command::parse(line) {
            Ok(Some(command)) => Some(self.dispatch(command).await),
            Ok(None) => None,
            Err(err) => {
                debug!("Rejected command {:?}: {}", line.trim(), err);
                Some(Reply::keep_open(Response::error(
                    ErrorCode::InvalidFormat,
                    err.to_string(),
                )))
            }
        }
    }

    pub async fn dispatch(&self, command: Command) -> Reply {
        let board = self.board.as_ref();
        let response = match command {
            Command::Post {
                x,
                y,
                color,
                message,
            } => handlers::post(board, x, y, &color, &message).await,
            Command::Get(filter) => handlers::get(board, &filter).await,
            Command::GetPins => handlers::get_pins(board).await,
            Command::Pin { x, y } => handlers::pin(board, x, y).await,
            Command::Unpin { x, y } => handlers::unpin(board, x, y).await,
            Command::Shake => handlers::shake(board).await,
            Command::Clear => handlers::clear(board).await,
            Command::Disconnect => {
                return Reply {
                    response: handlers::disconnect(),
                    disconnect: true,
                }
            }
        };

        Reply::keep_open(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::BoardConfig;

    fn handler() -> ProtocolHandler {
        ProtocolHandler::new(Arc::new(Board::new(BoardConfig::default())))
    }

    async fn run(handler: &ProtocolHandler, line: &str) -> String {
        handler
            .process_line(line)
            .await
            .map(|reply| reply.response.to_string())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_blank_line_has_no_reply() {
        let handler = handler();
        assert!(handler.process_line("").await.is_none());
        assert!(handler.process_line("    ").await.is_none());
    }

    #[tokio::test]
    async fn test_parse_errors_become_invalid_format() {
        let handler = handler();
        assert_eq!(
            run(&handler, "HELLO").await,
            "ERROR INVALID_FORMAT Unknown command: HELLO"
        );
        assert_eq!(
            run(&handler, "POST x 1 yellow hi").await,
            "ERROR INVALID_FORMAT Coordinates must be valid integers"
        );
        assert_eq!(
            run(&handler, "SHAKE now").await,
            "ERROR INVALID_FORMAT SHAKE takes no parameters"
        );
    }

    #[tokio::test]
    async fn test_disconnect_is_terminating() {
        let handler = handler();
        let reply = handler.process_line("disconnect").await.unwrap();
        assert_eq!(reply.response, Response::Ok);
        assert!(reply.disconnect);

        let reply = handler.process_line("GET").await.unwrap();
        assert!(!reply.disconnect);
    }

    #[tokio::test]
    async fn test_filter_conjunction_over_protocol() {
        let handler = handler();
        assert_eq!(run(&handler, "POST 0 0 blue one").await, "OK NOTE_POSTED");
        assert_eq!(run(&handler, "POST 5 5 yellow two").await, "OK NOTE_POSTED");
        assert_eq!(run(&handler, "POST 300 300 blue three").await, "OK NOTE_POSTED");

        assert_eq!(
            run(&handler, "GET color=blue contains=10 10").await,
            "OK 1\nNOTE 0 0 blue one"
        );
        assert_eq!(run(&handler, "GET color=green").await, "OK 0");
    }

    #[tokio::test]
    async fn test_shake_scenario() {
        let handler = handler();
        run(&handler, "POST 0 0 yellow pinned").await;
        run(&handler, "POST 400 400 yellow loose").await;
        assert_eq!(run(&handler, "PIN 10 10").await, "OK PIN_ADDED");

        assert_eq!(run(&handler, "SHAKE").await, "OK SHAKE_COMPLETE");
        assert_eq!(run(&handler, "GET").await, "OK 1\nNOTE 0 0 yellow pinned");
        assert_eq!(run(&handler, "GET PINS").await, "OK 1\n10 10");
    }

    #[tokio::test]
    async fn test_clear_scenario() {
        let handler = handler();
        run(&handler, "POST 0 0 yellow hi").await;
        run(&handler, "PIN 1 1").await;
        assert_eq!(run(&handler, "CLEAR").await, "OK CLEAR_COMPLETE");
        assert_eq!(run(&handler, "GET").await, "OK 0");
        assert_eq!(run(&handler, "GET PINS").await, "OK 0");
    }

    #[tokio::test]
    async fn test_handlers_share_one_board() {
        let first = handler();
        let second = ProtocolHandler::new(Arc::clone(first.board()));
        run(&first, "POST 0 0 yellow shared").await;
        assert_eq!(run(&second, "GET").await, "OK 1\nNOTE 0 0 yellow shared");
    }
}
