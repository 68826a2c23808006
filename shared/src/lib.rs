//! Wire types shared by the bulletin board server and its clients.
//!
//! Everything that crosses the socket lives here: the note and pin entities,
//! the board configuration announced in the connection banner, and the
//! response grammar (`OK`, `OK <STATUS>`, `OK <n>` + payload, `ERROR <CODE>`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 4200;
pub const DEFAULT_BOARD_WIDTH: u32 = 800;
pub const DEFAULT_BOARD_HEIGHT: u32 = 600;
pub const DEFAULT_NOTE_WIDTH: u32 = 100;
pub const DEFAULT_NOTE_HEIGHT: u32 = 80;
pub const DEFAULT_COLORS: [&str; 7] = [
    "yellow", "blue", "green", "pink", "orange", "purple", "white",
];

pub const BANNER_KEYWORD: &str = "BOARD_CONFIG";
pub const NOTE_KEYWORD: &str = "NOTE";

/// Errors raised while reading server output on the client side
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Empty response line")]
    EmptyLine,
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Unknown status token: {0}")]
    UnknownStatus(String),
    #[error("Unknown error code: {0}")]
    UnknownErrorCode(String),
    #[error("Malformed note line: {0}")]
    MalformedNote(String),
    #[error("Malformed pin line: {0}")]
    MalformedPin(String),
    #[error("Malformed banner: {0}")]
    MalformedBanner(String),
    #[error("Banner announces an invalid board: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// Reasons a board configuration is rejected
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Board dimensions must be positive, got {width}x{height}")]
    EmptyBoard { width: u32, height: u32 },
    #[error("Note dimensions must be positive, got {width}x{height}")]
    EmptyNote { width: u32, height: u32 },
    #[error("Note size {note_width}x{note_height} does not fit on a {width}x{height} board")]
    NoteLargerThanBoard {
        width: u32,
        height: u32,
        note_width: u32,
        note_height: u32,
    },
    #[error("Color palette must not be empty")]
    EmptyPalette,
    #[error("Invalid color name: {0:?}")]
    InvalidColor(String),
    #[error("Duplicate color in palette: {0}")]
    DuplicateColor(String),
}

/// Fixed board geometry and color palette
///
/// Chosen once at server start and announced to every client in the
/// `BOARD_CONFIG` banner. Palette entries are kept lower-case and in the
/// order they were configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub width: u32,
    pub height: u32,
    pub note_width: u32,
    pub note_height: u32,
    pub colors: Vec<String>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_BOARD_WIDTH,
            height: DEFAULT_BOARD_HEIGHT,
            note_width: DEFAULT_NOTE_WIDTH,
            note_height: DEFAULT_NOTE_HEIGHT,
            colors: DEFAULT_COLORS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl BoardConfig {
    /// Builds a validated configuration with a lower-cased palette
    pub fn new<I, S>(
        width: u32,
        height: u32,
        note_width: u32,
        note_height: u32,
        colors: I,
    ) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            width,
            height,
            note_width,
            note_height,
            colors: colors.into_iter().map(|c| c.as_ref().to_string()).collect(),
        }
        .validated()
    }

    /// Normalizes the palette to lower-case and checks every constraint
    ///
    /// Used for configurations that did not go through [`BoardConfig::new`],
    /// such as ones deserialized from a file.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyBoard {
                width: self.width,
                height: self.height,
            });
        }
        if self.note_width == 0 || self.note_height == 0 {
            return Err(ConfigError::EmptyNote {
                width: self.note_width,
                height: self.note_height,
            });
        }
        if self.note_width > self.width || self.note_height > self.height {
            return Err(ConfigError::NoteLargerThanBoard {
                width: self.width,
                height: self.height,
                note_width: self.note_width,
                note_height: self.note_height,
            });
        }
        if self.colors.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }

        let mut palette: Vec<String> = Vec::with_capacity(self.colors.len());
        for color in &self.colors {
            // Colors travel as single tokens inside a comma-separated banner field
            if color.is_empty() || color.contains(',') || color.chars().any(char::is_whitespace)
            {
                return Err(ConfigError::InvalidColor(color.clone()));
            }
            let color = color.to_lowercase();
            if palette.contains(&color) {
                return Err(ConfigError::DuplicateColor(color));
            }
            palette.push(color);
        }
        self.colors = palette;

        Ok(self)
    }

    /// Case-insensitive palette membership
    pub fn supports_color(&self, color: &str) -> bool {
        self.colors.iter().any(|c| c.eq_ignore_ascii_case(color))
    }

    /// `BOARD_CONFIG <width> <height> <noteWidth> <noteHeight> <colors>`
    pub fn banner(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            BANNER_KEYWORD,
            self.width,
            self.height,
            self.note_width,
            self.note_height,
            self.colors.join(",")
        )
    }

    pub fn parse_banner(line: &str) -> Result<Self, ProtocolError> {
        let malformed = || ProtocolError::MalformedBanner(line.to_string());

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 6 || parts[0] != BANNER_KEYWORD {
            return Err(malformed());
        }

        let dims: Vec<u32> = parts[1..5]
            .iter()
            .map(|p| p.parse::<u32>())
            .collect::<Result<_, _>>()
            .map_err(|_| malformed())?;

        let config = Self::new(dims[0], dims[1], dims[2], dims[3], parts[5].split(','))?;
        Ok(config)
    }
}

/// A sticky note: fixed-size rectangle anchored at its upper-left corner
///
/// Notes are immutable once built. The board hands out clones, never
/// references into its own collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    x: i64,
    y: i64,
    width: u32,
    height: u32,
    color: String,
    message: String,
}

impl Note {
    pub fn new(
        x: i64,
        y: i64,
        width: u32,
        height: u32,
        color: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            x,
            y,
            width,
            height,
            color: color.into(),
            message: message.into(),
        }
    }

    pub fn x(&self) -> i64 {
        self.x
    }

    pub fn y(&self) -> i64 {
        self.y
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Exclusive right edge
    fn right(&self) -> i64 {
        self.x.saturating_add(i64::from(self.width))
    }

    /// Exclusive bottom edge
    fn bottom(&self) -> i64 {
        self.y.saturating_add(i64::from(self.height))
    }

    /// Half-open containment: `px in [x, x+w)` and `py in [y, y+h)`
    pub fn contains(&self, px: i64, py: i64) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// True when both notes cover exactly the same rectangle
    pub fn same_rect(&self, other: &Note) -> bool {
        self.x == other.x
            && self.y == other.y
            && self.width == other.width
            && self.height == other.height
    }

    /// True when the whole rectangle lies inside a board of the given size
    pub fn fits_within(&self, board_width: u32, board_height: u32) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.right() <= i64::from(board_width)
            && self.bottom() <= i64::from(board_height)
    }

    /// Parses a `NOTE <x> <y> <color> <message>` payload line
    ///
    /// Width and height are not on the wire; the caller supplies the board's
    /// note size.
    pub fn parse_line(line: &str, width: u32, height: u32) -> Result<Self, ProtocolError> {
        let malformed = || ProtocolError::MalformedNote(line.to_string());

        let mut parts = line.splitn(5, ' ');
        if parts.next() != Some(NOTE_KEYWORD) {
            return Err(malformed());
        }
        let x = parts
            .next()
            .and_then(|p| p.parse::<i64>().ok())
            .ok_or_else(malformed)?;
        let y = parts
            .next()
            .and_then(|p| p.parse::<i64>().ok())
            .ok_or_else(malformed)?;
        let color = parts.next().filter(|c| !c.is_empty()).ok_or_else(malformed)?;
        let message = parts.next().unwrap_or("");

        Ok(Self::new(x, y, width, height, color, message))
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            NOTE_KEYWORD, self.x, self.y, self.color, self.message
        )
    }
}

/// A pin coordinate; rendered on the wire as `<x> <y>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pin {
    pub x: i64,
    pub y: i64,
}

impl Pin {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.x, self.y)
    }
}

impl FromStr for Pin {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        match parts.as_slice() {
            [x, y] => match (x.parse::<i64>(), y.parse::<i64>()) {
                (Ok(x), Ok(y)) => Ok(Pin::new(x, y)),
                _ => Err(ProtocolError::MalformedPin(s.to_string())),
            },
            _ => Err(ProtocolError::MalformedPin(s.to_string())),
        }
    }
}

/// Protocol error codes, the exhaustive list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidFormat,
    OutOfBounds,
    ColorNotSupported,
    CompleteOverlap,
    NoNoteAtCoordinate,
    PinAlreadyExists,
    PinNotFound,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 7] = [
        ErrorCode::InvalidFormat,
        ErrorCode::OutOfBounds,
        ErrorCode::ColorNotSupported,
        ErrorCode::CompleteOverlap,
        ErrorCode::NoNoteAtCoordinate,
        ErrorCode::PinAlreadyExists,
        ErrorCode::PinNotFound,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidFormat => "INVALID_FORMAT",
            ErrorCode::OutOfBounds => "OUT_OF_BOUNDS",
            ErrorCode::ColorNotSupported => "COLOR_NOT_SUPPORTED",
            ErrorCode::CompleteOverlap => "COMPLETE_OVERLAP",
            ErrorCode::NoNoteAtCoordinate => "NO_NOTE_AT_COORDINATE",
            ErrorCode::PinAlreadyExists => "PIN_ALREADY_EXISTS",
            ErrorCode::PinNotFound => "PIN_NOT_FOUND",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorCode {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorCode::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| ProtocolError::UnknownErrorCode(s.to_string()))
    }
}

/// Status tokens carried by `OK <STATUS>` responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    NotePosted,
    PinAdded,
    PinRemoved,
    ShakeComplete,
    ClearComplete,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::NotePosted,
        Status::PinAdded,
        Status::PinRemoved,
        Status::ShakeComplete,
        Status::ClearComplete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::NotePosted => "NOTE_POSTED",
            Status::PinAdded => "PIN_ADDED",
            Status::PinRemoved => "PIN_REMOVED",
            Status::ShakeComplete => "SHAKE_COMPLETE",
            Status::ClearComplete => "CLEAR_COMPLETE",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ProtocolError::UnknownStatus(s.to_string()))
    }
}

/// One complete server response
///
/// `Display` renders the exact wire text. Multi-line responses are joined
/// with `\n` and carry no trailing newline; the writer adds the terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Ok,
    Status(Status),
    Data(Vec<String>),
    Error { code: ErrorCode, message: String },
}

impl Response {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Response::Error {
            code,
            message: message.into(),
        }
    }

    /// Data response with one payload line per item
    pub fn data<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: fmt::Display,
    {
        Response::Data(items.into_iter().map(|item| item.to_string()).collect())
    }

    pub fn is_ok(&self) -> bool {
        !matches!(self, Response::Error { .. })
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Response::Error { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<Status> {
        match self {
            Response::Status(status) => Some(*status),
            _ => None,
        }
    }

    /// Payload lines of a data response; empty for every other kind
    pub fn payload(&self) -> &[String] {
        match self {
            Response::Data(lines) => lines,
            _ => &[],
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Ok => f.write_str("OK"),
            Response::Status(status) => write!(f, "OK {}", status),
            Response::Data(lines) => {
                write!(f, "OK {}", lines.len())?;
                for line in lines {
                    write!(f, "\n{}", line)?;
                }
                Ok(())
            }
            Response::Error { code, message } if message.is_empty() => {
                write!(f, "ERROR {}", code)
            }
            Response::Error { code, message } => write!(f, "ERROR {} {}", code, message),
        }
    }
}

/// Classification of the first line of a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseHeader {
    /// The line is the whole response
    Complete(Response),
    /// `OK <n>`: exactly `n` payload lines follow
    Data(usize),
}

impl ResponseHeader {
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            return Err(ProtocolError::EmptyLine);
        }

        if line == "OK" {
            return Ok(ResponseHeader::Complete(Response::Ok));
        }

        if let Some(rest) = line.strip_prefix("OK ") {
            if !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()) {
                let count = rest
                    .parse::<usize>()
                    .map_err(|_| ProtocolError::MalformedResponse(line.to_string()))?;
                return Ok(ResponseHeader::Data(count));
            }
            let status = rest.parse::<Status>()?;
            return Ok(ResponseHeader::Complete(Response::Status(status)));
        }

        if let Some(rest) = line.strip_prefix("ERROR ") {
            let mut parts = rest.splitn(2, ' ');
            let code = parts.next().unwrap_or("").parse::<ErrorCode>()?;
            let message = parts.next().unwrap_or("");
            return Ok(ResponseHeader::Complete(Response::error(code, message)));
        }

        Err(ProtocolError::MalformedResponse(line.to_string()))
    }
}
