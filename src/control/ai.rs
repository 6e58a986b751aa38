//! Computer-opponent controller.

use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::{Color, GameState, Move, Piece, Square};

use super::error::IllegalMoveError;
use super::local::ChessController;
use super::{
    GameController, GameStateListener, MoveListener, PromotionListener, SideListener,
};

/// Probability of taking a capture when at least one is available.
const CAPTURE_BIAS: f64 = 0.75;

/// Controller that plays one side itself: whenever its turn begins it
/// selects a move (weighted-random, preferring captures) and plays it
/// through the same `make_move`/`end_turn` path a human move takes, so
/// listeners observe it identically.
pub struct AiChessController {
    inner: ChessController,
    ai_side: Color,
}

impl AiChessController {
    /// AI playing Black against a local White player.
    #[must_use]
    pub fn new() -> Self {
        AiChessController::with_side(Color::Black)
    }

    #[must_use]
    pub fn with_side(ai_side: Color) -> Self {
        AiChessController {
            inner: ChessController::new(),
            ai_side,
        }
    }

    /// The side this controller plays itself.
    #[must_use]
    pub fn ai_side(&self) -> Color {
        self.ai_side
    }

    fn choose_move(&self) -> Option<Move> {
        let mut moves: Vec<Move> = Vec::new();
        for ((color, _), square) in self.inner.active_pieces() {
            if color == self.ai_side {
                moves.extend(self.inner.moves_for_piece_at(square));
            }
        }
        if moves.is_empty() {
            return None;
        }

        let captures: Vec<Move> = moves
            .iter()
            .copied()
            .filter(|mv| self.inner.move_results_in_capture(*mv))
            .collect();

        let mut rng = rand::thread_rng();
        let pool = if !captures.is_empty() && rng.gen_bool(CAPTURE_BIAS) {
            &captures
        } else {
            &moves
        };
        let mut chosen = *pool.choose(&mut rng)?;

        // The AI resolves its own promotions; the registered promotion
        // listener belongs to the local player's view
        if chosen.promotion.is_none() && self.is_promotion(chosen) {
            chosen.promotion = Some(Piece::Queen);
        }
        Some(chosen)
    }

    fn is_promotion(&self, mv: Move) -> bool {
        mv.to.row() == self.ai_side.promotion_row()
            && self
                .inner
                .active_pieces()
                .iter()
                .any(|&((color, piece), square)| {
                    square == mv.from && color == self.ai_side && piece == Piece::Pawn
                })
    }
}

impl Default for AiChessController {
    fn default() -> Self {
        AiChessController::new()
    }
}

impl GameController for AiChessController {
    fn start_game(&self) {
        self.inner.start_game();
    }

    fn current_state(&self) -> GameState {
        self.inner.current_state()
    }

    fn current_side(&self) -> Color {
        self.inner.current_side()
    }

    fn moves_for_piece_at(&self, at: Square) -> Vec<Move> {
        self.inner.moves_for_piece_at(at)
    }

    fn move_results_in_capture(&self, mv: Move) -> bool {
        self.inner.move_results_in_capture(mv)
    }

    /// External moves are accepted for the human side only; the AI's side
    /// is played from `begin_turn`.
    fn make_move(&self, mv: Move) -> Result<Move, IllegalMoveError> {
        if self.inner.current_side() == self.ai_side {
            return Err(IllegalMoveError::NotYourTurn {
                local_side: self.ai_side.opponent(),
            });
        }
        self.inner.make_move(mv)
    }

    /// Play the AI's move when its turn begins; nothing otherwise.
    fn begin_turn(&self) {
        if self.inner.current_state().is_game_over()
            || self.inner.current_side() != self.ai_side
        {
            return;
        }
        let Some(chosen) = self.choose_move() else {
            // Terminal positions are classified by the preceding end_turn,
            // so an empty move set here means the game is already over
            return;
        };
        debug!("ai plays {chosen}");
        match self.inner.make_move(chosen) {
            Ok(_) => self.inner.end_turn(),
            Err(err) => warn!("ai selected an illegal move {chosen}: {err}"),
        }
    }

    fn end_turn(&self) {
        self.inner.end_turn();
    }

    fn active_pieces(&self) -> Vec<((Color, Piece), Square)> {
        self.inner.active_pieces()
    }

    fn symbol_at(&self, at: Square) -> String {
        self.inner.symbol_at(at)
    }

    fn add_move_listener(&self, listener: MoveListener) {
        self.inner.add_move_listener(listener);
    }

    fn add_current_side_listener(&self, listener: SideListener) {
        self.inner.add_current_side_listener(listener);
    }

    fn add_game_state_listener(&self, listener: GameStateListener) {
        self.inner.add_game_state_listener(listener);
    }

    fn set_promotion_listener(&self, listener: PromotionListener) {
        self.inner.set_promotion_listener(listener);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_ai_replies_on_its_turn() {
        let controller = AiChessController::new();
        controller.start_game();

        let moves_seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&moves_seen);
        controller.add_move_listener(Box::new(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        controller
            .make_move(Move::new(Square(6, 4), Square(4, 4)))
            .unwrap();
        controller.end_turn();
        controller.begin_turn();

        // Both the human move and the AI reply went through the same path
        assert_eq!(moves_seen.load(Ordering::SeqCst), 2);
        assert_eq!(controller.current_side(), Color::White);
    }

    #[test]
    fn test_ai_rejects_external_moves_for_its_side() {
        let controller = AiChessController::new();
        controller.start_game();
        controller
            .make_move(Move::new(Square(6, 4), Square(4, 4)))
            .unwrap();
        controller.end_turn();

        let result = controller.make_move(Move::new(Square(1, 4), Square(3, 4)));
        assert_eq!(
            result,
            Err(IllegalMoveError::NotYourTurn {
                local_side: Color::White
            })
        );
    }

    #[test]
    fn test_begin_turn_is_quiet_on_human_turn() {
        let controller = AiChessController::new();
        controller.start_game();

        let moves_seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&moves_seen);
        controller.add_move_listener(Box::new(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        controller.begin_turn();
        assert_eq!(moves_seen.load(Ordering::SeqCst), 0);
        assert_eq!(controller.current_side(), Color::White);
    }

    #[test]
    fn test_ai_game_stays_consistent_over_many_turns() {
        let controller = AiChessController::with_side(Color::White);
        controller.start_game();

        for _ in 0..20 {
            if controller.current_state().is_game_over() {
                break;
            }
            controller.begin_turn(); // white (AI) plays
            if controller.current_state().is_game_over() {
                break;
            }
            // Reply with black's first available move
            let reply = controller
                .active_pieces()
                .into_iter()
                .filter(|&((color, _), _)| color == Color::Black)
                .flat_map(|(_, square)| controller.moves_for_piece_at(square))
                .next();
            let Some(reply) = reply else { break };
            controller.make_move(reply).unwrap();
            controller.end_turn();
        }

        // Exactly one king per side survives throughout
        for color in Color::BOTH {
            let kings = controller
                .active_pieces()
                .into_iter()
                .filter(|&((c, piece), _)| c == color && piece == Piece::King)
                .count();
            assert_eq!(kings, 1);
        }
    }
}
