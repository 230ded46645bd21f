//! Rejections returned by board operations and game transitions.
//!
//! Every error leaves the state it was raised against unchanged.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a reserve placement was refused.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Error, Serialize, Deserialize)]
pub enum PlacementError {
    #[error("destination stack is full")]
    StackFull,
    #[error("destination is topped by an opponent piece")]
    OpponentStack,
    #[error("cannot stack on your own king")]
    OwnKing,
    #[error("destination is ahead of your frontline")]
    BeyondFrontline,
    #[error("no such reserve piece")]
    NoSuchReservePiece,
}

/// Why a selection, submission, or resolution was refused.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Error, Serialize, Deserialize)]
pub enum MoveError {
    /// A destination was submitted with nothing selected.
    #[error("nothing is selected")]
    NothingSelected,
    #[error("a capture-or-stack decision is pending")]
    ResolutionPending,
    #[error("no move is pending")]
    NoPendingMove,
    /// The destination is not among the piece's legal destinations.
    #[error("destination is not legal for this piece")]
    NotLegal,
    #[error("square is off the board")]
    OffBoard,
}

/// A snapshot that would break a board invariant.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
pub enum SnapshotError {
    #[error("stack holds {0} pieces, at most three allowed")]
    StackTooTall(usize),
    #[error("board has {0} squares, expected 81")]
    SquareCount(usize),
    #[error("square index {0} is off the board")]
    OffBoard(u8),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
pub enum GungiError {
    #[error("illegal placement: {0}")]
    IllegalPlacement(PlacementError),
    #[error("illegal move: {0}")]
    IllegalMove(MoveError),
    #[error("square is empty")]
    EmptyStack,
    #[error("stack would exceed three pieces")]
    StackOverflow,
    #[error("not your turn")]
    NotYourTurn,
    #[error("game already over")]
    GameAlreadyOver,
}

pub type Result<T> = std::result::Result<T, GungiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            GungiError::IllegalPlacement(PlacementError::BeyondFrontline).to_string(),
            "illegal placement: destination is ahead of your frontline"
        );
        assert_eq!(
            GungiError::IllegalMove(MoveError::NoPendingMove).to_string(),
            "illegal move: no move is pending"
        );
        assert_eq!(GungiError::GameAlreadyOver.to_string(), "game already over");
        assert_eq!(
            GungiError::IllegalMove(MoveError::OffBoard).to_string(),
            "illegal move: square is off the board"
        );
        assert_eq!(
            SnapshotError::StackTooTall(5).to_string(),
            "stack holds 5 pieces, at most three allowed"
        );
    }
}
