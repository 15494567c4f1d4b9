use crate::place::Place;
use thiserror::Error;

/// Protocol and programming errors surfaced by the board.
///
/// None of these are recoverable from inside the engine: the simulator
/// asserted something the board cannot represent, so the session is faulty.
/// Handlers validate before mutating, so a returned error always leaves the
/// board exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("location {0:#x} does not name a pile")]
    UnknownLocation(u32),

    #[error("no card at {0:?}")]
    MissingCard(Place),

    #[error("cannot move a card onto its own place {0:?}")]
    IllegalMove(Place),

    #[error("malformed message: {0}")]
    MalformedMessage(String),

    #[error("history cursor out of bounds")]
    CursorBounds,
}
