use super::types::{
    CASTLE_BLACK_K, CASTLE_BLACK_Q, CASTLE_WHITE_K, CASTLE_WHITE_Q,
};
use super::{Color, Piece, Square};

/// Chess board: an 8x8 grid of optional pieces plus the rule state that
/// move generation needs (en-passant target, castling rights).
///
/// The board is pure placement data. It is mutated only through
/// [`Board::apply_move`]; callers never write squares directly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    pub(crate) squares: [[Option<(Color, Piece)>; 8]; 8],
    /// Square a pawn may capture onto en passant, set for one ply after a
    /// double step.
    pub(crate) en_passant_target: Option<Square>,
    pub(crate) castling_rights: u8, // bitmask
}

impl Board {
    /// Create a board in the standard initial configuration.
    #[must_use]
    pub fn new() -> Self {
        let mut board = Board::empty();
        let back_rank = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];
        for (col, piece) in back_rank.iter().enumerate() {
            board.set_piece(Square(0, col), Color::Black, *piece);
            board.set_piece(Square(1, col), Color::Black, Piece::Pawn);
            board.set_piece(Square(6, col), Color::White, Piece::Pawn);
            board.set_piece(Square(7, col), Color::White, *piece);
        }
        board.castling_rights = CASTLE_WHITE_K | CASTLE_WHITE_Q | CASTLE_BLACK_K | CASTLE_BLACK_Q;
        board
    }

    /// Create an empty board with no castling rights.
    #[must_use]
    pub(crate) fn empty() -> Self {
        Board {
            squares: [[None; 8]; 8],
            en_passant_target: None,
            castling_rights: 0,
        }
    }

    /// Get the piece occupying a square, if any.
    #[inline]
    #[must_use]
    pub fn piece_at(&self, at: Square) -> Option<(Color, Piece)> {
        self.squares[at.row()][at.col()]
    }

    #[inline]
    pub(crate) fn set_piece(&mut self, at: Square, color: Color, piece: Piece) {
        self.squares[at.row()][at.col()] = Some((color, piece));
    }

    #[inline]
    pub(crate) fn clear_square(&mut self, at: Square) -> Option<(Color, Piece)> {
        self.squares[at.row()][at.col()].take()
    }

    /// Display symbol for the piece at a square; empty string for an empty
    /// square.
    #[must_use]
    pub fn symbol_at(&self, at: Square) -> &'static str {
        match self.piece_at(at) {
            Some((color, piece)) => piece.symbol(color),
            None => "",
        }
    }

    /// All occupied squares with their pieces, in row-major order.
    #[must_use]
    pub fn active_pieces(&self) -> Vec<((Color, Piece), Square)> {
        Square::all()
            .filter_map(|sq| self.piece_at(sq).map(|p| (p, sq)))
            .collect()
    }

    /// Locate the king of `color`.
    #[must_use]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        Square::all().find(|&sq| self.piece_at(sq) == Some((color, Piece::King)))
    }

    /// Count pieces of `color` on the board.
    #[must_use]
    pub fn piece_count(&self, color: Color) -> usize {
        Square::all()
            .filter(|&sq| matches!(self.piece_at(sq), Some((c, _)) if c == color))
            .count()
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}
