//! Lifetime of a single client connection
//!
//! A [`Connection`] reads one line at a time, hands it to the protocol
//! handler and writes back exactly one response. It stops when the peer
//! closes the stream, after answering `DISCONNECT`, or on the first I/O
//! error. Nothing it does can disturb other connections or the board.

use crate::protocol::ProtocolHandler;
use log::{debug, info, warn};
use shared::{ErrorCode, Response};
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};

/// Longest accepted request line, excluding the terminator
pub const MAX_LINE_BYTES: usize = 8 * 1024;

/// Outcome of reading one request line into the buffer
#[derive(Debug, PartialEq, Eq)]
enum LineRead {
    Line,
    TooLong,
    Eof,
}

/// Why a connection finished cleanly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The peer closed its side of the stream
    EndOfStream,
    /// The peer sent `DISCONNECT`
    Disconnected,
}

/// Per-client worker
///
/// Owns nothing shared except the handler's board handle. The client id is
/// used only to tell connections apart in the logs.
pub struct Connection {
    client_id: u32,
    peer: String,
    handler: ProtocolHandler,
    banner: Option<String>,
}

impl Connection {
    pub fn new(client_id: u32, peer: impl Into<String>, handler: ProtocolHandler) -> Self {
        Self {
            client_id,
            peer: peer.into(),
            handler,
            banner: None,
        }
    }

    /// Sends `BOARD_CONFIG ...` before the first command is read
    pub fn with_banner(mut self) -> Self {
        self.banner = Some(self.handler.board().config().banner());
        self
    }

    pub fn client_id(&self) -> u32 {
        self.client_id
    }

    /// Serves the connection until it closes
    ///
    /// I/O errors are returned to the caller, which only logs them; the
    /// client has no channel left to receive a report.
    pub async fn run<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<CloseReason>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        if let Some(banner) = &self.banner {
            write_line(&mut writer, banner).await?;
        }

        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();

        loop {
            let line = match read_line(&mut reader, &mut buf).await? {
                LineRead::Eof => return Ok(CloseReason::EndOfStream),
                LineRead::TooLong => {
                    warn!(
                        "Client {} ({}) sent a line over {} bytes",
                        self.client_id, self.peer, MAX_LINE_BYTES
                    );
                    let response = Response::error(
                        ErrorCode::InvalidFormat,
                        format!("Line exceeds {} bytes", MAX_LINE_BYTES),
                    );
                    write_line(&mut writer, &response.to_string()).await?;
                    continue;
                }
                // Invalid UTF-8 becomes U+FFFD instead of ending the session
                LineRead::Line => String::from_utf8_lossy(&buf),
            };
            debug!("Request from client {} ({}): {}", self.client_id, self.peer, line);

            let Some(reply) = self.handler.process_line(&line).await else {
                continue;
            };

            write_line(&mut writer, &reply.response.to_string()).await?;

            if reply.disconnect {
                info!("Client {} ({}) sent DISCONNECT", self.client_id, self.peer);
                writer.shutdown().await?;
                return Ok(CloseReason::Disconnected);
            }
        }
    }
}

/// Reads up to the next `\n` without decoding, holding at most
/// `MAX_LINE_BYTES` plus the terminator in memory
///
/// An unterminated final line is still returned as a line.
async fn read_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<LineRead>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let limit = MAX_LINE_BYTES as u64 + 1;
    let read = (&mut *reader).take(limit).read_until(b'\n', buf).await?;

    if read == 0 {
        return Ok(LineRead::Eof);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        return Ok(LineRead::Line);
    }
    if buf.len() as u64 == limit {
        buf.clear();
        discard_line(reader).await?;
        return Ok(LineRead::TooLong);
    }
    Ok(LineRead::Line)
}

/// Drops input up to and including the next `\n`
async fn discard_line<R>(reader: &mut R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let chunk = reader.fill_buf().await?;
        if chunk.is_empty() {
            return Ok(());
        }
        match chunk.iter().position(|&b| b == b'\n') {
            Some(pos) => {
                reader.consume(pos + 1);
                return Ok(());
            }
            None => {
                let len = chunk.len();
                reader.consume(len);
            }
        }
    }
}

async fn write_line<W>(writer: &mut W, text: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(text.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}
