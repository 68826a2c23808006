//! One handler per protocol verb
//!
//! Handlers translate parsed arguments into board operations and turn the
//! outcome into a [`Response`]. Board rejections are recovered here; nothing
//! past this point sees a `BoardError`.

use crate::board::{Board, BoardError, NoteFilter};
use shared::{Pin, Response, Status};

fn rejected(err: BoardError) -> Response {
    Response::error(err.code(), err.to_string())
}

fn completed(result: Result<(), BoardError>, status: Status) -> Response {
    match result {
        Ok(()) => Response::Status(status),
        Err(err) => rejected(err),
    }
}

pub async fn post(board: &Board, x: i64, y: i64, color: &str, message: &str) -> Response {
    let note = board.make_note(x, y, color, message);
    completed(board.add_note(note).await, Status::NotePosted)
}

pub async fn get(board: &Board, filter: &NoteFilter) -> Response {
    Response::data(board.get_notes(filter).await)
}

pub async fn get_pins(board: &Board) -> Response {
    Response::data(board.get_pins().await)
}

pub async fn pin(board: &Board, x: i64, y: i64) -> Response {
    completed(board.add_pin(Pin::new(x, y)).await, Status::PinAdded)
}

pub async fn unpin(board: &Board, x: i64, y: i64) -> Response {
    completed(board.remove_pin(Pin::new(x, y)).await, Status::PinRemoved)
}

pub async fn shake(board: &Board) -> Response {
    board.remove_unpinned_notes().await;
    Response::Status(Status::ShakeComplete)
}

pub async fn clear(board: &Board) -> Response {
    board.clear().await;
    Response::Status(Status::ClearComplete)
}

pub fn disconnect() -> Response {
    Response::Ok
}
