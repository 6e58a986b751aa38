//! Game controllers: the turn state machine over the rules engine.
//!
//! A [`GameController`] validates and applies moves, detects terminal
//! states, and notifies registered listeners. Three variants exist: the
//! local two-human [`ChessController`], the computer-opponent
//! [`AiChessController`], and the remote-peer
//! [`NetworkedChessController`](crate::net::NetworkedChessController), which
//! composes a local controller rather than subclassing it.

mod ai;
mod error;
mod local;

pub use ai::AiChessController;
pub use error::IllegalMoveError;
pub use local::ChessController;

use crate::board::{Color, GameState, Move, Piece, Square};

/// Callback fired after a move is applied, with the finalized move and the
/// squares (besides start and destination) whose contents changed.
pub type MoveListener = Box<dyn FnMut(&Move, &[Square]) + Send>;

/// Callback fired when the side to move changes.
pub type SideListener = Box<dyn FnMut(Color) + Send>;

/// Callback fired when the game state classification changes.
pub type GameStateListener = Box<dyn FnMut(GameState) + Send>;

/// Callback invoked synchronously to choose a promotion piece. The
/// `make_move` caller is blocked until it returns.
pub type PromotionListener = Box<dyn FnMut() -> Piece + Send>;

/// The controller contract consumed by a view layer.
///
/// Listeners are stored in ordered lists per event kind and invoked
/// synchronously, in registration order, inside the controller's critical
/// section, possibly on a network receive thread. They must not call back
/// into the controller; a consumer that needs its own execution context
/// redispatches there itself.
pub trait GameController {
    /// Reset to the standard initial configuration, set White to move, and
    /// fire a side-changed event for White.
    fn start_game(&self);

    /// Current game state classification. Pure query.
    fn current_state(&self) -> GameState;

    /// Side whose turn is currently active. Pure query.
    fn current_side(&self) -> Color;

    /// Legal moves for the piece at `at`; empty when the square is empty,
    /// holds the wrong side, or the game is not in progress.
    fn moves_for_piece_at(&self, at: Square) -> Vec<Move>;

    /// True iff applying `mv` would capture an opposing piece.
    fn move_results_in_capture(&self, mv: Move) -> bool;

    /// Validate and apply a move, firing the move listener exactly once on
    /// success. Returns the finalized move (promotion resolved). On failure
    /// all state is unchanged.
    fn make_move(&self, mv: Move) -> Result<Move, IllegalMoveError>;

    /// Side-entry bookkeeping at a turn boundary. Default: nothing.
    fn begin_turn(&self) {}

    /// Close the turn: reclassify the game state for the side about to
    /// move, fire a state-change event if it changed, and, unless the game
    /// ended, flip the side to move and fire a side-changed event.
    fn end_turn(&self);

    /// Every active piece with its square. Pure query.
    fn active_pieces(&self) -> Vec<((Color, Piece), Square)>;

    /// Display symbol for the piece at `at`; empty string when vacant.
    fn symbol_at(&self, at: Square) -> String;

    fn add_move_listener(&self, listener: MoveListener);

    fn add_current_side_listener(&self, listener: SideListener);

    fn add_game_state_listener(&self, listener: GameStateListener);

    /// Set the promotion chooser. Unlike the broadcast listeners, at most
    /// one is meaningful: a later registration replaces the prior one.
    fn set_promotion_listener(&self, listener: PromotionListener);
}
