//! Move application, the board's single mutation path.

use super::types::{castle_kingside_bit, castle_queenside_bit};
use super::{AppliedMove, Board, Color, Move, Piece, Square};

impl Board {
    /// Apply a validated move for `side` and return the finalized move plus
    /// the squares (other than start and destination) whose contents
    /// changed.
    ///
    /// The move must come from [`Board::legal_moves_from`] for the current
    /// position; this method does not re-validate. A promotion move with
    /// `promotion: None` promotes to a queen; callers that want a different
    /// choice resolve it before applying.
    pub(crate) fn apply_move(&mut self, mv: Move, side: Color) -> AppliedMove {
        let mut affected = Vec::new();
        let en_passant_target = self.en_passant_target.take();

        let Some((_, piece)) = self.clear_square(mv.from) else {
            // Unreachable for validated moves; leave the board untouched.
            return AppliedMove { mv, affected };
        };

        // Plain capture on the destination square
        let captured = self.clear_square(mv.to);

        // En passant: a pawn moving diagonally onto the empty target square
        // captures the bypassed pawn one row behind it
        if piece == Piece::Pawn
            && captured.is_none()
            && mv.from.col() != mv.to.col()
            && en_passant_target == Some(mv.to)
        {
            let bypassed = Square(mv.from.row(), mv.to.col());
            self.clear_square(bypassed);
            affected.push(bypassed);
        }

        // Castling: relocate the rook alongside the two-column king move
        if piece == Piece::King && mv.from.col().abs_diff(mv.to.col()) == 2 {
            let row = mv.from.row();
            let (rook_from, rook_to) = if mv.to.col() == 6 {
                (Square(row, 7), Square(row, 5))
            } else {
                (Square(row, 0), Square(row, 3))
            };
            if let Some((color, rook)) = self.clear_square(rook_from) {
                self.set_piece(rook_to, color, rook);
                affected.push(rook_from);
                affected.push(rook_to);
            }
        }

        // Promotion resolution; the finalized move records the choice
        let promoted = piece == Piece::Pawn && mv.to.row() == side.promotion_row();
        let placed = if promoted {
            mv.promotion
                .filter(|p| p.is_promotable())
                .unwrap_or(Piece::Queen)
        } else {
            piece
        };
        self.set_piece(mv.to, side, placed);

        self.update_castling_rights(mv, side, piece, captured);

        // Double step opens the bypassed square to en-passant capture for
        // one ply
        if piece == Piece::Pawn && mv.from.row().abs_diff(mv.to.row()) == 2 {
            let mid = (mv.from.row() + mv.to.row()) / 2;
            self.en_passant_target = Some(Square(mid, mv.from.col()));
        }

        let finalized = Move {
            from: mv.from,
            to: mv.to,
            promotion: if promoted { Some(placed) } else { None },
        };
        AppliedMove {
            mv: finalized,
            affected,
        }
    }

    fn update_castling_rights(
        &mut self,
        mv: Move,
        side: Color,
        piece: Piece,
        captured: Option<(Color, Piece)>,
    ) {
        if piece == Piece::King {
            self.castling_rights &= !(castle_kingside_bit(side) | castle_queenside_bit(side));
        }
        if piece == Piece::Rook && mv.from.row() == side.back_row() {
            if mv.from.col() == 7 {
                self.castling_rights &= !castle_kingside_bit(side);
            } else if mv.from.col() == 0 {
                self.castling_rights &= !castle_queenside_bit(side);
            }
        }
        // A rook captured in its corner loses the opponent that right
        if matches!(captured, Some((color, Piece::Rook)) if color == side.opponent()) {
            let enemy = side.opponent();
            if mv.to == Square(enemy.back_row(), 7) {
                self.castling_rights &= !castle_kingside_bit(enemy);
            } else if mv.to == Square(enemy.back_row(), 0) {
                self.castling_rights &= !castle_queenside_bit(enemy);
            }
        }
    }
}
