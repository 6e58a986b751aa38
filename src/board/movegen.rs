use super::types::{castle_kingside_bit, castle_queenside_bit};
use super::{Board, Color, GameState, Move, Piece, Square};

const KNIGHT_OFFSETS: [(isize, isize); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

const KING_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

const BISHOP_DIRS: [(isize, isize); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const ROOK_DIRS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

impl Board {
    /// Legal moves for the piece at `from`, moving as `side`.
    ///
    /// Returns an empty set when the square is empty or holds a piece of the
    /// other color. Pseudo-legal moves from piece geometry are filtered by
    /// simulating each on a scratch copy and rejecting any that leave the
    /// mover's own king attacked.
    #[must_use]
    pub fn legal_moves_from(&self, from: Square, side: Color) -> Vec<Move> {
        match self.piece_at(from) {
            Some((color, _)) if color == side => {}
            _ => return Vec::new(),
        }
        self.pseudo_moves_from(from, side)
            .into_iter()
            .filter(|mv| !self.leaves_king_exposed(*mv, side))
            .collect()
    }

    /// All legal moves for `side` across every piece.
    #[must_use]
    pub fn all_legal_moves(&self, side: Color) -> Vec<Move> {
        Square::all()
            .flat_map(|sq| self.legal_moves_from(sq, side))
            .collect()
    }

    /// True if `side` has at least one legal move. Short-circuits on the
    /// first piece with a legal move instead of collecting them all.
    #[must_use]
    pub fn has_any_legal_move(&self, side: Color) -> bool {
        Square::all().any(|sq| !self.legal_moves_from(sq, side).is_empty())
    }

    /// True iff any piece of `by` attacks `target`.
    #[must_use]
    pub fn is_attacked(&self, target: Square, by: Color) -> bool {
        // Knights and kings: fixed offsets
        for (dr, dc) in KNIGHT_OFFSETS {
            if let Some(sq) = target.offset(dr, dc) {
                if self.piece_at(sq) == Some((by, Piece::Knight)) {
                    return true;
                }
            }
        }
        for (dr, dc) in KING_OFFSETS {
            if let Some(sq) = target.offset(dr, dc) {
                if self.piece_at(sq) == Some((by, Piece::King)) {
                    return true;
                }
            }
        }

        // Pawns: a pawn on (target - direction, target ± 1) attacks target
        let dir = by.pawn_direction();
        for dc in [-1, 1] {
            if let Some(sq) = target.offset(-dir, dc) {
                if self.piece_at(sq) == Some((by, Piece::Pawn)) {
                    return true;
                }
            }
        }

        // Sliders: walk each ray to the first occupied square
        for (dirs, diagonal) in [(BISHOP_DIRS, true), (ROOK_DIRS, false)] {
            for (dr, dc) in dirs {
                let mut sq = target;
                while let Some(next) = sq.offset(dr, dc) {
                    sq = next;
                    if let Some((color, piece)) = self.piece_at(sq) {
                        if color == by {
                            let slides = if diagonal {
                                piece.attacks_diagonally()
                            } else {
                                piece.attacks_straight()
                            };
                            if slides {
                                return true;
                            }
                        }
                        break;
                    }
                }
            }
        }

        false
    }

    /// True iff `side`'s king is attacked by the opposing side.
    #[must_use]
    pub fn is_in_check(&self, side: Color) -> bool {
        match self.king_square(side) {
            Some(king) => self.is_attacked(king, side.opponent()),
            None => false,
        }
    }

    /// True iff `mv` would capture an opposing piece, including the
    /// en-passant capture square.
    #[must_use]
    pub fn move_results_in_capture(&self, mv: Move) -> bool {
        let Some((side, piece)) = self.piece_at(mv.from) else {
            return false;
        };
        if matches!(self.piece_at(mv.to), Some((color, _)) if color == side.opponent()) {
            return true;
        }
        piece == Piece::Pawn
            && self.en_passant_target == Some(mv.to)
            && mv.from.col() != mv.to.col()
    }

    /// Classify the position for `side_to_move`: Checkmate or Stalemate when
    /// no legal move exists (depending on check), otherwise Check or Normal.
    #[must_use]
    pub fn terminal_state(&self, side_to_move: Color) -> GameState {
        let in_check = self.is_in_check(side_to_move);
        if self.has_any_legal_move(side_to_move) {
            if in_check {
                GameState::Check
            } else {
                GameState::Normal
            }
        } else if in_check {
            GameState::Checkmate
        } else {
            GameState::Stalemate
        }
    }

    fn leaves_king_exposed(&self, mv: Move, side: Color) -> bool {
        let mut scratch = self.clone();
        scratch.apply_move(mv, side);
        scratch.is_in_check(side)
    }

    fn pseudo_moves_from(&self, from: Square, side: Color) -> Vec<Move> {
        let Some((_, piece)) = self.piece_at(from) else {
            return Vec::new();
        };
        let mut moves = Vec::new();
        match piece {
            Piece::Pawn => self.pawn_moves(from, side, &mut moves),
            Piece::Knight => self.offset_moves(from, side, &KNIGHT_OFFSETS, &mut moves),
            Piece::Bishop => self.sliding_moves(from, side, &BISHOP_DIRS, &mut moves),
            Piece::Rook => self.sliding_moves(from, side, &ROOK_DIRS, &mut moves),
            Piece::Queen => {
                self.sliding_moves(from, side, &BISHOP_DIRS, &mut moves);
                self.sliding_moves(from, side, &ROOK_DIRS, &mut moves);
            }
            Piece::King => {
                self.offset_moves(from, side, &KING_OFFSETS, &mut moves);
                self.castling_moves(from, side, &mut moves);
            }
        }
        moves
    }

    /// Fixed-offset moves for knights and kings: any empty or opposing
    /// destination.
    fn offset_moves(
        &self,
        from: Square,
        side: Color,
        offsets: &[(isize, isize)],
        moves: &mut Vec<Move>,
    ) {
        for &(dr, dc) in offsets {
            if let Some(to) = from.offset(dr, dc) {
                match self.piece_at(to) {
                    Some((color, _)) if color == side => {}
                    _ => moves.push(Move::new(from, to)),
                }
            }
        }
    }

    /// Sliding moves: walk each direction, stopping at the first occupied
    /// square, which is included only when it holds an opposing piece.
    fn sliding_moves(
        &self,
        from: Square,
        side: Color,
        dirs: &[(isize, isize)],
        moves: &mut Vec<Move>,
    ) {
        for &(dr, dc) in dirs {
            let mut sq = from;
            while let Some(to) = sq.offset(dr, dc) {
                sq = to;
                match self.piece_at(to) {
                    None => moves.push(Move::new(from, to)),
                    Some((color, _)) => {
                        if color != side {
                            moves.push(Move::new(from, to));
                        }
                        break;
                    }
                }
            }
        }
    }

    fn pawn_moves(&self, from: Square, side: Color, moves: &mut Vec<Move>) {
        let dir = side.pawn_direction();

        // Single step, and double step from the starting row through two
        // empty squares
        if let Some(one) = from.offset(dir, 0) {
            if self.piece_at(one).is_none() {
                moves.push(Move::new(from, one));
                if from.row() == side.pawn_start_row() {
                    if let Some(two) = from.offset(2 * dir, 0) {
                        if self.piece_at(two).is_none() {
                            moves.push(Move::new(from, two));
                        }
                    }
                }
            }
        }

        // Diagonal captures, plus the en-passant target square
        for dc in [-1, 1] {
            if let Some(to) = from.offset(dir, dc) {
                let captures_piece =
                    matches!(self.piece_at(to), Some((color, _)) if color != side);
                let captures_en_passant =
                    self.piece_at(to).is_none() && self.en_passant_target == Some(to);
                if captures_piece || captures_en_passant {
                    moves.push(Move::new(from, to));
                }
            }
        }
    }

    /// Castling: rights present, rook in its corner, intermediate squares
    /// empty, king not in check, and the square the king passes through not
    /// attacked. The destination square is vetted by the common
    /// leaves-king-exposed filter.
    fn castling_moves(&self, from: Square, side: Color, moves: &mut Vec<Move>) {
        let row = side.back_row();
        if from != Square(row, 4) || self.is_in_check(side) {
            return;
        }
        let enemy = side.opponent();

        if self.castling_rights & castle_kingside_bit(side) != 0
            && self.piece_at(Square(row, 7)) == Some((side, Piece::Rook))
            && self.piece_at(Square(row, 5)).is_none()
            && self.piece_at(Square(row, 6)).is_none()
            && !self.is_attacked(Square(row, 5), enemy)
        {
            moves.push(Move::new(from, Square(row, 6)));
        }

        if self.castling_rights & castle_queenside_bit(side) != 0
            && self.piece_at(Square(row, 0)) == Some((side, Piece::Rook))
            && self.piece_at(Square(row, 1)).is_none()
            && self.piece_at(Square(row, 2)).is_none()
            && self.piece_at(Square(row, 3)).is_none()
            && !self.is_attacked(Square(row, 3), enemy)
        {
            moves.push(Move::new(from, Square(row, 2)));
        }
    }
}
