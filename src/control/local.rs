//! Local game controller.

use std::sync::Arc;

use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::board::{AppliedMove, Board, Color, GameState, Move, Piece, Square};

use super::error::IllegalMoveError;
use super::{
    GameController, GameStateListener, MoveListener, PromotionListener, SideListener,
};

/// Turn machine phase, separate from the public [`GameState`]
/// classification.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Phase {
    AwaitingStart,
    InProgress,
    PromotionPending,
    GameOver,
}

/// Everything the controller guards with its single lock: board, turn
/// machine, and listener registrations. Both the local caller's moves and a
/// network peer's moves mutate state through this one critical section, so
/// no listener ever observes a partial mutation.
struct Core {
    board: Board,
    side_to_move: Color,
    state: GameState,
    phase: Phase,
    move_listeners: Vec<MoveListener>,
    side_listeners: Vec<SideListener>,
    state_listeners: Vec<GameStateListener>,
    promotion_listener: Option<PromotionListener>,
}

impl Core {
    fn new() -> Self {
        Core {
            board: Board::new(),
            side_to_move: Color::White,
            state: GameState::Normal,
            phase: Phase::AwaitingStart,
            move_listeners: Vec::new(),
            side_listeners: Vec::new(),
            state_listeners: Vec::new(),
            promotion_listener: None,
        }
    }

    fn start_game(&mut self) {
        self.board = Board::new();
        self.side_to_move = Color::White;
        self.state = GameState::Normal;
        self.phase = Phase::InProgress;
        info!("new game started");
        for listener in &mut self.side_listeners {
            listener(Color::White);
        }
    }

    fn make_move(&mut self, request: Move) -> Result<Move, IllegalMoveError> {
        if self.phase != Phase::InProgress {
            return Err(IllegalMoveError::GameNotInProgress);
        }
        let (color, piece) = self
            .board
            .piece_at(request.from)
            .ok_or(IllegalMoveError::NoPiece { at: request.from })?;
        if color != self.side_to_move {
            return Err(IllegalMoveError::WrongSide {
                at: request.from,
                side_to_move: self.side_to_move,
            });
        }
        let legal = self.board.legal_moves_from(request.from, self.side_to_move);
        if !legal.iter().any(|m| m.same_squares(&request)) {
            return Err(IllegalMoveError::NotLegal { mv: request });
        }

        let reaches_last_rank =
            piece == Piece::Pawn && request.to.row() == self.side_to_move.promotion_row();
        let finalized = if reaches_last_rank {
            let choice = match request.promotion {
                Some(p) if p.is_promotable() => p,
                Some(other) => {
                    warn!("invalid promotion piece {other:?}, promoting to queen");
                    Piece::Queen
                }
                None => self.resolve_promotion(),
            };
            Move::promoting(request.from, request.to, choice)
        } else {
            Move::new(request.from, request.to)
        };

        let AppliedMove { mv, affected } = self.board.apply_move(finalized, self.side_to_move);
        debug!("{} played {mv}", self.side_to_move);
        for listener in &mut self.move_listeners {
            listener(&mv, &affected);
        }
        Ok(mv)
    }

    /// Obtain a promotion choice from the registered listener, blocking the
    /// `make_move` caller for the duration of the callback. Without a
    /// listener the piece becomes a queen.
    fn resolve_promotion(&mut self) -> Piece {
        self.phase = Phase::PromotionPending;
        let choice = match self.promotion_listener.as_mut() {
            Some(listener) => listener(),
            None => {
                debug!("no promotion listener registered, promoting to queen");
                Piece::Queen
            }
        };
        self.phase = Phase::InProgress;
        if choice.is_promotable() {
            choice
        } else {
            warn!("promotion listener chose {choice:?}, promoting to queen");
            Piece::Queen
        }
    }

    fn end_turn(&mut self) {
        if self.phase != Phase::InProgress {
            return;
        }
        let next = self.side_to_move.opponent();
        let state = self.board.terminal_state(next);
        if state != self.state {
            self.state = state;
            for listener in &mut self.state_listeners {
                listener(state);
            }
        }
        if state.is_game_over() {
            self.phase = Phase::GameOver;
            info!("game over: {state}");
        } else {
            self.side_to_move = next;
            for listener in &mut self.side_listeners {
                listener(next);
            }
        }
    }

    fn moves_for_piece_at(&self, at: Square) -> Vec<Move> {
        if self.phase != Phase::InProgress {
            return Vec::new();
        }
        self.board.legal_moves_from(at, self.side_to_move)
    }
}

/// Local controller: two human players on one board.
///
/// Cheap to clone; clones share the same game. All operations take the one
/// controller-wide lock around validate, apply, and notify, so a local
/// caller and a network receive thread can never interleave mutations.
#[derive(Clone)]
pub struct ChessController {
    core: Arc<Mutex<Core>>,
}

impl ChessController {
    #[must_use]
    pub fn new() -> Self {
        ChessController {
            core: Arc::new(Mutex::new(Core::new())),
        }
    }

    /// Controller over an arbitrary in-progress position.
    #[cfg(test)]
    pub(crate) fn from_position(board: Board, side_to_move: Color) -> Self {
        let controller = ChessController::new();
        {
            let mut core = controller.core.lock();
            core.board = board;
            core.side_to_move = side_to_move;
            core.phase = Phase::InProgress;
        }
        controller
    }
}

impl Default for ChessController {
    fn default() -> Self {
        ChessController::new()
    }
}

impl GameController for ChessController {
    fn start_game(&self) {
        self.core.lock().start_game();
    }

    fn current_state(&self) -> GameState {
        self.core.lock().state
    }

    fn current_side(&self) -> Color {
        self.core.lock().side_to_move
    }

    fn moves_for_piece_at(&self, at: Square) -> Vec<Move> {
        self.core.lock().moves_for_piece_at(at)
    }

    fn move_results_in_capture(&self, mv: Move) -> bool {
        self.core.lock().board.move_results_in_capture(mv)
    }

    fn make_move(&self, mv: Move) -> Result<Move, IllegalMoveError> {
        self.core.lock().make_move(mv)
    }

    fn end_turn(&self) {
        self.core.lock().end_turn();
    }

    fn active_pieces(&self) -> Vec<((Color, Piece), Square)> {
        self.core.lock().board.active_pieces()
    }

    fn symbol_at(&self, at: Square) -> String {
        self.core.lock().board.symbol_at(at).to_string()
    }

    fn add_move_listener(&self, listener: MoveListener) {
        self.core.lock().move_listeners.push(listener);
    }

    fn add_current_side_listener(&self, listener: SideListener) {
        self.core.lock().side_listeners.push(listener);
    }

    fn add_game_state_listener(&self, listener: GameStateListener) {
        self.core.lock().state_listeners.push(listener);
    }

    fn set_promotion_listener(&self, listener: PromotionListener) {
        self.core.lock().promotion_listener = Some(listener);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;

    fn started() -> ChessController {
        let controller = ChessController::new();
        controller.start_game();
        controller
    }

    #[test]
    fn test_start_game_fires_side_listener_for_white() {
        let controller = ChessController::new();
        let seen: Arc<Mutex<Vec<Color>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        controller.add_current_side_listener(Box::new(move |side| sink.lock().push(side)));
        controller.start_game();
        assert_eq!(*seen.lock(), vec![Color::White]);
    }

    #[test]
    fn test_make_move_before_start_rejected() {
        let controller = ChessController::new();
        let result = controller.make_move(Move::new(Square(6, 4), Square(4, 4)));
        assert_eq!(result, Err(IllegalMoveError::GameNotInProgress));
    }

    #[test]
    fn test_moves_for_piece_empty_before_start() {
        let controller = ChessController::new();
        assert!(controller.moves_for_piece_at(Square(6, 0)).is_empty());
    }

    #[test]
    fn test_legal_move_fires_move_listener_once() {
        let controller = started();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        controller.add_move_listener(Box::new(move |mv, affected| {
            assert_eq!(*mv, Move::new(Square(6, 4), Square(4, 4)));
            assert!(affected.is_empty());
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        controller
            .make_move(Move::new(Square(6, 4), Square(4, 4)))
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_illegal_move_leaves_state_unchanged() {
        let controller = started();
        let result = controller.make_move(Move::new(Square(6, 4), Square(3, 4)));
        assert!(matches!(result, Err(IllegalMoveError::NotLegal { .. })));
        assert_eq!(controller.symbol_at(Square(6, 4)), "\u{2659}");
        assert_eq!(controller.symbol_at(Square(3, 4)), "");
        assert_eq!(controller.current_side(), Color::White);
    }

    #[test]
    fn test_wrong_side_rejected() {
        let controller = started();
        let result = controller.make_move(Move::new(Square(1, 4), Square(3, 4)));
        assert!(matches!(result, Err(IllegalMoveError::WrongSide { .. })));
    }

    #[test]
    fn test_empty_square_rejected() {
        let controller = started();
        let result = controller.make_move(Move::new(Square(4, 4), Square(3, 4)));
        assert_eq!(
            result,
            Err(IllegalMoveError::NoPiece { at: Square(4, 4) })
        );
    }

    #[test]
    fn test_end_turn_flips_side_and_fires() {
        let controller = started();
        let seen: Arc<Mutex<Vec<Color>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        controller.add_current_side_listener(Box::new(move |side| sink.lock().push(side)));
        controller
            .make_move(Move::new(Square(6, 4), Square(4, 4)))
            .unwrap();
        controller.end_turn();
        assert_eq!(controller.current_side(), Color::Black);
        assert_eq!(*seen.lock(), vec![Color::Black]);
    }

    #[test]
    fn test_check_reported_through_state_listener() {
        // 1. e3 f6 2. Qh5+ checks the black king along the h5-e8 diagonal
        let controller = started();
        let seen: Arc<Mutex<Vec<GameState>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        controller.add_game_state_listener(Box::new(move |state| sink.lock().push(state)));

        for (from, to) in [
            ((6, 4), (5, 4)), // e3
            ((1, 5), (2, 5)), // f6
            ((7, 3), (3, 7)), // Qh5+
        ] {
            controller
                .make_move(Move::new(
                    Square(from.0, from.1),
                    Square(to.0, to.1),
                ))
                .unwrap();
            controller.end_turn();
        }

        assert_eq!(controller.current_state(), GameState::Check);
        assert_eq!(*seen.lock(), vec![GameState::Check]);
        assert_eq!(controller.current_side(), Color::Black);
    }

    #[test]
    fn test_fools_mate_ends_game() {
        let controller = started();
        for (from, to) in [
            ((6, 5), (5, 5)), // f3
            ((1, 4), (3, 4)), // e5
            ((6, 6), (4, 6)), // g4
            ((0, 3), (4, 7)), // Qh4#
        ] {
            controller
                .make_move(Move::new(
                    Square(from.0, from.1),
                    Square(to.0, to.1),
                ))
                .unwrap();
            controller.end_turn();
        }

        assert_eq!(controller.current_state(), GameState::Checkmate);
        assert!(controller.current_state().is_game_over());
        // Side did not flip on game over; further moves and queries are shut
        assert_eq!(controller.current_side(), Color::Black);
        assert!(controller.moves_for_piece_at(Square(7, 4)).is_empty());
        assert_eq!(
            controller.make_move(Move::new(Square(7, 4), Square(6, 4))),
            Err(IllegalMoveError::GameNotInProgress)
        );
    }

    #[test]
    fn test_promotion_listener_invoked_exactly_once() {
        let mut board = Board::empty();
        board.set_piece(Square(1, 0), Color::White, Piece::Pawn);
        board.set_piece(Square(7, 4), Color::White, Piece::King);
        board.set_piece(Square(2, 7), Color::Black, Piece::King);
        let controller = ChessController::from_position(board, Color::White);

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        controller.set_promotion_listener(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Piece::Rook
        }));

        let finalized = controller
            .make_move(Move::new(Square(1, 0), Square(0, 0)))
            .unwrap();
        assert_eq!(finalized.promotion, Some(Piece::Rook));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(controller.symbol_at(Square(0, 0)), "\u{2656}");
        assert_eq!(controller.symbol_at(Square(1, 0)), "");
    }

    #[test]
    fn test_promotion_defaults_to_queen_without_listener() {
        let mut board = Board::empty();
        board.set_piece(Square(1, 0), Color::White, Piece::Pawn);
        board.set_piece(Square(7, 4), Color::White, Piece::King);
        board.set_piece(Square(2, 7), Color::Black, Piece::King);
        let controller = ChessController::from_position(board, Color::White);

        let finalized = controller
            .make_move(Move::new(Square(1, 0), Square(0, 0)))
            .unwrap();
        assert_eq!(finalized.promotion, Some(Piece::Queen));
        assert_eq!(controller.symbol_at(Square(0, 0)), "\u{2655}");
    }

    #[test]
    fn test_supplied_promotion_skips_listener() {
        let mut board = Board::empty();
        board.set_piece(Square(1, 0), Color::White, Piece::Pawn);
        board.set_piece(Square(7, 4), Color::White, Piece::King);
        board.set_piece(Square(2, 7), Color::Black, Piece::King);
        let controller = ChessController::from_position(board, Color::White);

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        controller.set_promotion_listener(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Piece::Queen
        }));

        let finalized = controller
            .make_move(Move::promoting(Square(1, 0), Square(0, 0), Piece::Knight))
            .unwrap();
        assert_eq!(finalized.promotion, Some(Piece::Knight));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_capture_reports_no_extra_affected_squares() {
        // Scandinavian: 1. e4 d5 2. exd5. A plain capture happens on the
        // destination square itself, so nothing else changed
        let controller = started();
        let affected_log: Arc<Mutex<Vec<Vec<Square>>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&affected_log);
        controller.add_move_listener(Box::new(move |_, affected| {
            sink.lock().push(affected.to_vec());
        }));

        for (from, to) in [((6, 4), (4, 4)), ((1, 3), (3, 3))] {
            controller
                .make_move(Move::new(
                    Square(from.0, from.1),
                    Square(to.0, to.1),
                ))
                .unwrap();
            controller.end_turn();
        }

        let capture = Move::new(Square(4, 4), Square(3, 3));
        assert!(controller.move_results_in_capture(capture));
        controller.make_move(capture).unwrap();
        controller.end_turn();

        assert_eq!(controller.symbol_at(Square(3, 3)), "\u{2659}");
        assert!(affected_log.lock().iter().all(Vec::is_empty));
    }

    #[test]
    fn test_listeners_fire_in_registration_order() {
        let controller = started();
        let order: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
        for tag in 0..3u8 {
            let sink = Arc::clone(&order);
            controller.add_move_listener(Box::new(move |_, _| sink.lock().push(tag)));
        }
        controller
            .make_move(Move::new(Square(6, 0), Square(5, 0)))
            .unwrap();
        assert_eq!(*order.lock(), vec![0, 1, 2]);
    }
}
