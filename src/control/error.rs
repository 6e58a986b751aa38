//! Error types for game control operations.

use std::fmt;

use crate::board::{Color, Move, Square};

/// Error type for rejected `make_move` calls.
///
/// Every rejection leaves the game state exactly as it was; the caller may
/// retry with a different move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IllegalMoveError {
    /// The game has not started or is already over
    GameNotInProgress,
    /// No piece on the start square
    NoPiece { at: Square },
    /// The start square holds a piece of the side not on move
    WrongSide { at: Square, side_to_move: Color },
    /// The move is not among the legal moves for the piece
    NotLegal { mv: Move },
    /// The move was issued for a side this controller does not play
    NotYourTurn { local_side: Color },
}

impl fmt::Display for IllegalMoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IllegalMoveError::GameNotInProgress => {
                write!(f, "No game in progress")
            }
            IllegalMoveError::NoPiece { at } => {
                write!(f, "No piece at {at}")
            }
            IllegalMoveError::WrongSide { at, side_to_move } => {
                write!(f, "Piece at {at} does not belong to {side_to_move}")
            }
            IllegalMoveError::NotLegal { mv } => {
                write!(f, "Illegal move {mv}")
            }
            IllegalMoveError::NotYourTurn { local_side } => {
                write!(f, "Not {local_side}'s turn")
            }
        }
    }
}

impl std::error::Error for IllegalMoveError {}
