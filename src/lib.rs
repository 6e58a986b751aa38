//! Control layer for a two-player chess game playable locally, against a
//! computer opponent, or against a remote peer over TCP.
//!
//! The crate owns board state, legal-move computation, turn sequencing,
//! check/checkmate/stalemate detection, promotion arbitration, and, for
//! networked play, keeping two processes' game state consistent.
//! Rendering, dialogs, and window assembly are the consumer's job: a view
//! layer drives a [`control::GameController`] through synchronous
//! query/command calls and observes it through registered listeners.
//!
//! # Example
//! ```
//! use netchess::control::{ChessController, GameController};
//! use netchess::board::{Move, Square};
//!
//! let controller = ChessController::new();
//! controller.start_game();
//! controller.make_move(Move::new(Square(6, 4), Square(4, 4)))?; // 1. e4
//! controller.end_turn();
//! # Ok::<(), netchess::control::IllegalMoveError>(())
//! ```

pub mod board;
pub mod control;
pub mod net;

pub use board::{Board, Color, GameState, Move, Piece, Square};
pub use control::{AiChessController, ChessController, GameController, IllegalMoveError};
pub use net::{GameHost, NetError, NetworkedChessController};
