//! Authoritative board state shared by every connection
//!
//! The board owns the note and pin collections and is the only place they are
//! touched. Every operation runs inside one mutex section, so concurrent
//! connections observe a linearizable sequence of whole operations. Callers
//! only ever receive freshly built copies of the collections.

use log::debug;
use shared::{BoardConfig, ErrorCode, Note, Pin};
use thiserror::Error;
use tokio::sync::Mutex;

/// Rejections raised by board mutations
///
/// The `Display` text is the message that follows the error code on the wire.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("Note exceeds board boundaries")]
    OutOfBounds,
    #[error("Coordinates must be non-negative")]
    NegativeCoordinate,
    #[error("{0} is not a valid color")]
    ColorNotSupported(String),
    #[error("Note would completely overlap existing note")]
    CompleteOverlap,
    #[error("A pin already exists at {0}")]
    PinAlreadyExists(Pin),
    #[error("No note contains {0}")]
    NoNoteAtCoordinate(Pin),
    #[error("No pin at {0}")]
    PinNotFound(Pin),
}

impl BoardError {
    pub fn code(&self) -> ErrorCode {
        match self {
            BoardError::OutOfBounds | BoardError::NegativeCoordinate => ErrorCode::OutOfBounds,
            BoardError::ColorNotSupported(_) => ErrorCode::ColorNotSupported,
            BoardError::CompleteOverlap => ErrorCode::CompleteOverlap,
            BoardError::PinAlreadyExists(_) => ErrorCode::PinAlreadyExists,
            BoardError::NoNoteAtCoordinate(_) => ErrorCode::NoNoteAtCoordinate,
            BoardError::PinNotFound(_) => ErrorCode::PinNotFound,
        }
    }
}

/// Conjunction of optional GET filters; `None` imposes no constraint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    pub color: Option<String>,
    pub contains: Option<(i64, i64)>,
    pub refers_to: Option<String>,
}

impl NoteFilter {
    pub fn matches(&self, note: &Note) -> bool {
        if let Some(color) = &self.color {
            if !note.color().eq_ignore_ascii_case(color) {
                return false;
            }
        }
        if let Some((x, y)) = self.contains {
            if !note.contains(x, y) {
                return false;
            }
        }
        if let Some(needle) = &self.refers_to {
            if !note.message().contains(needle.as_str()) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Default)]
struct BoardState {
    notes: Vec<Note>,
    pins: Vec<Pin>,
}

/// The bulletin board: fixed configuration plus mutex-guarded contents
#[derive(Debug)]
pub struct Board {
    config: BoardConfig,
    state: Mutex<BoardState>,
}

impl Board {
    pub fn new(config: BoardConfig) -> Self {
        Self {
            config,
            state: Mutex::new(BoardState::default()),
        }
    }

    /// Configuration never changes, so it is read without the lock
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Builds a note carrying this board's fixed note size
    pub fn make_note(&self, x: i64, y: i64, color: &str, message: &str) -> Note {
        Note::new(
            x,
            y,
            self.config.note_width,
            self.config.note_height,
            color,
            message,
        )
    }

    /// Adds a note after checking bounds, then color, then exact overlap
    pub async fn add_note(&self, note: Note) -> Result<(), BoardError> {
        if !note.fits_within(self.config.width, self.config.height) {
            return Err(BoardError::OutOfBounds);
        }
        if !self.config.supports_color(note.color()) {
            return Err(BoardError::ColorNotSupported(note.color().to_string()));
        }

        let mut state = self.state.lock().await;
        if state.notes.iter().any(|existing| existing.same_rect(&note)) {
            return Err(BoardError::CompleteOverlap);
        }

        debug!("Posted note at ({}, {})", note.x(), note.y());
        state.notes.push(note);
        Ok(())
    }

    /// Notes matching every supplied filter, in board order
    pub async fn get_notes(&self, filter: &NoteFilter) -> Vec<Note> {
        let state = self.state.lock().await;
        state
            .notes
            .iter()
            .filter(|note| filter.matches(note))
            .cloned()
            .collect()
    }

    pub async fn get_pins(&self) -> Vec<Pin> {
        self.state.lock().await.pins.clone()
    }

    /// Places a pin; it must be new and land inside at least one note
    pub async fn add_pin(&self, pin: Pin) -> Result<(), BoardError> {
        if pin.x < 0 || pin.y < 0 {
            return Err(BoardError::NegativeCoordinate);
        }

        let mut state = self.state.lock().await;
        if state.pins.contains(&pin) {
            return Err(BoardError::PinAlreadyExists(pin));
        }
        if !state.notes.iter().any(|note| note.contains(pin.x, pin.y)) {
            return Err(BoardError::NoNoteAtCoordinate(pin));
        }

        debug!("Pinned {}", pin);
        state.pins.push(pin);
        Ok(())
    }

    pub async fn remove_pin(&self, pin: Pin) -> Result<(), BoardError> {
        let mut state = self.state.lock().await;
        match state.pins.iter().position(|existing| *existing == pin) {
            Some(index) => {
                state.pins.remove(index);
                debug!("Unpinned {}", pin);
                Ok(())
            }
            None => Err(BoardError::PinNotFound(pin)),
        }
    }

    /// Keeps only notes holding at least one pin; returns how many were dropped
    ///
    /// Pins are left untouched. Every surviving pin still sits on a surviving
    /// note, since the notes it covers are by definition pinned.
    pub async fn remove_unpinned_notes(&self) -> usize {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let before = state.notes.len();
        let pins = &state.pins;
        state
            .notes
            .retain(|note| pins.iter().any(|pin| note.contains(pin.x, pin.y)));

        let removed = before - state.notes.len();
        debug!("Shake removed {} unpinned notes", removed);
        removed
    }

    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.notes.clear();
        state.pins.clear();
        debug!("Board cleared");
    }

    pub async fn note_count(&self) -> usize {
        self.state.lock().await.notes.len()
    }

    pub async fn pin_count(&self) -> usize {
        self.state.lock().await.pins.len()
    }
}
