use crate::error::{ClientError, Result};
use log::{debug, info};
use shared::{
    BoardConfig, Note, Pin, Response, ResponseHeader, BANNER_KEYWORD, DEFAULT_NOTE_HEIGHT,
    DEFAULT_NOTE_WIDTH,
};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};

/// Line-oriented connection to a bulletin board server
///
/// Every [`send`](BoardClient::send) writes one command and reads back exactly
/// one complete response, so the client never has more than one request in
/// flight.
pub struct BoardClient<R = OwnedReadHalf, W = OwnedWriteHalf> {
    lines: Lines<BufReader<R>>,
    writer: W,
    config: Option<BoardConfig>,
}

impl BoardClient {
    /// Connects and reads the `BOARD_CONFIG` banner
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let mut client = Self::connect_without_banner(addr).await?;
        client.read_banner().await?;
        Ok(client)
    }

    /// Connects to a server that does not announce its configuration
    pub async fn connect_without_banner(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        info!("Connected to {}", stream.peer_addr()?);
        let (reader, writer) = stream.into_split();
        Ok(Self::from_parts(reader, writer))
    }
}

impl<R, W> BoardClient<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn from_parts(reader: R, writer: W) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            writer,
            config: None,
        }
    }

    /// Board configuration announced by the server, if a banner was read
    pub fn config(&self) -> Option<&BoardConfig> {
        self.config.as_ref()
    }

    /// Reads the banner line and stores the announced configuration
    pub async fn read_banner(&mut self) -> Result<&BoardConfig> {
        let line = self.next_line().await?;
        if line.split_whitespace().next() != Some(BANNER_KEYWORD) {
            return Err(ClientError::MissingBanner);
        }

        let config = BoardConfig::parse_banner(&line)?;
        debug!("Board configuration: {}", line);
        Ok(&*self.config.insert(config))
    }

    /// Sends one command line and reads its complete response
    ///
    /// The server answers blank lines with nothing at all, so blank commands
    /// and commands spanning several lines are refused before sending.
    pub async fn send(&mut self, command: &str) -> Result<Response> {
        let command = command.trim_end_matches(['\r', '\n']);
        if command.trim().is_empty() || command.contains(['\r', '\n']) {
            return Err(ClientError::InvalidCommand(command.to_string()));
        }
        debug!("-> {}", command);

        self.writer
            .write_all(format!("{}\n", command).as_bytes())
            .await?;
        self.writer.flush().await?;

        self.read_response().await
    }

    async fn read_response(&mut self) -> Result<Response> {
        let header = self.next_line().await?;
        debug!("<- {}", header);

        match ResponseHeader::parse(&header)? {
            ResponseHeader::Complete(response) => Ok(response),
            ResponseHeader::Data(count) => {
                let mut payload = Vec::with_capacity(count);
                for _ in 0..count {
                    payload.push(self.next_line().await?);
                }
                Ok(Response::Data(payload))
            }
        }
    }

    async fn next_line(&mut self) -> Result<String> {
        self.lines
            .next_line()
            .await?
            .ok_or(ClientError::ConnectionClosed)
    }

    /// Issues `GET` with an optional filter suffix such as `color=red`
    pub async fn notes(&mut self, filter: &str) -> Result<Vec<Note>> {
        let filter = filter.trim();
        let command = if filter.is_empty() {
            "GET".to_string()
        } else {
            format!("GET {}", filter)
        };

        let (width, height) = self
            .config
            .as_ref()
            .map(|c| (c.note_width, c.note_height))
            .unwrap_or((DEFAULT_NOTE_WIDTH, DEFAULT_NOTE_HEIGHT));

        let payload = Self::expect_data(self.send(&command).await?)?;
        let notes = payload
            .iter()
            .map(|line| Note::parse_line(line, width, height))
            .collect::<std::result::Result<_, _>>()?;
        Ok(notes)
    }

    pub async fn pins(&mut self) -> Result<Vec<Pin>> {
        let payload = Self::expect_data(self.send("GET PINS").await?)?;
        let pins = payload
            .iter()
            .map(|line| line.parse::<Pin>())
            .collect::<std::result::Result<_, _>>()?;
        Ok(pins)
    }

    /// Ends the session and closes the write half
    pub async fn disconnect(mut self) -> Result<Response> {
        let response = self.send("DISCONNECT").await?;
        self.writer.shutdown().await?;
        info!("Disconnected");
        Ok(response)
    }

    fn expect_data(response: Response) -> Result<Vec<String>> {
        match response {
            Response::Data(lines) => Ok(lines),
            Response::Error { code, message } => Err(ClientError::Rejected { code, message }),
            other => Err(ClientError::UnexpectedResponse(other.to_string())),
        }
    }
}
