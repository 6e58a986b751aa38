//! Chess board representation and rules.
//!
//! The board is a square-addressed piece placement; move generation
//! produces legal moves by filtering piece-geometry moves through a
//! scratch-copy check simulation.
//!
//! # Example
//! ```
//! use netchess::board::{Board, Color};
//!
//! let board = Board::new();
//! let moves = board.all_legal_moves(Color::White);
//! println!("Starting position has {} legal moves", moves.len());
//! ```

mod apply;
mod error;
mod movegen;
mod state;
mod types;

#[cfg(test)]
mod tests;

pub use error::SquareError;
pub use state::Board;
pub use types::{AppliedMove, Color, GameState, Move, Piece, Square};
