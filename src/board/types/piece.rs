//! Piece and color types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Chess piece types.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Piece {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Piece {
    /// All piece types in index order
    pub const ALL: [Piece; 6] = [
        Piece::Pawn,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
        Piece::King,
    ];

    /// Convert piece to lowercase character
    #[inline]
    #[must_use]
    pub const fn to_char(self) -> char {
        match self {
            Piece::Pawn => 'p',
            Piece::Knight => 'n',
            Piece::Bishop => 'b',
            Piece::Rook => 'r',
            Piece::Queen => 'q',
            Piece::King => 'k',
        }
    }

    /// Display symbol for this piece when owned by `color`.
    #[must_use]
    pub const fn symbol(self, color: Color) -> &'static str {
        match (color, self) {
            (Color::White, Piece::Pawn) => "\u{2659}",
            (Color::White, Piece::Knight) => "\u{2658}",
            (Color::White, Piece::Bishop) => "\u{2657}",
            (Color::White, Piece::Rook) => "\u{2656}",
            (Color::White, Piece::Queen) => "\u{2655}",
            (Color::White, Piece::King) => "\u{2654}",
            (Color::Black, Piece::Pawn) => "\u{265F}",
            (Color::Black, Piece::Knight) => "\u{265E}",
            (Color::Black, Piece::Bishop) => "\u{265D}",
            (Color::Black, Piece::Rook) => "\u{265C}",
            (Color::Black, Piece::Queen) => "\u{265B}",
            (Color::Black, Piece::King) => "\u{265A}",
        }
    }

    /// Returns true if this piece is a valid promotion choice
    #[inline]
    #[must_use]
    pub const fn is_promotable(self) -> bool {
        matches!(
            self,
            Piece::Queen | Piece::Rook | Piece::Bishop | Piece::Knight
        )
    }

    /// Returns true if this piece can attack diagonally (Bishop, Queen)
    #[inline]
    #[must_use]
    pub(crate) const fn attacks_diagonally(self) -> bool {
        matches!(self, Piece::Bishop | Piece::Queen)
    }

    /// Returns true if this piece can attack along rows/columns (Rook, Queen)
    #[inline]
    #[must_use]
    pub(crate) const fn attacks_straight(self) -> bool {
        matches!(self, Piece::Rook | Piece::Queen)
    }
}

/// Chess colors. Turn order strictly alternates White, Black, White, ...
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// Both colors in index order (White=0, Black=1)
    pub const BOTH: [Color; 2] = [Color::White, Color::Black];

    /// Returns the opposite color
    #[inline]
    #[must_use]
    pub const fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Back rank row for this color (7 for White, 0 for Black)
    #[inline]
    #[must_use]
    pub(crate) const fn back_row(self) -> usize {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    /// Pawn starting row (6 for White, 1 for Black)
    #[inline]
    #[must_use]
    pub(crate) const fn pawn_start_row(self) -> usize {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    /// Pawn advance direction as a row delta (-1 for White, +1 for Black)
    #[inline]
    #[must_use]
    pub(crate) const fn pawn_direction(self) -> isize {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    /// Pawn promotion row (0 for White, 7 for Black)
    #[inline]
    #[must_use]
    pub(crate) const fn promotion_row(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent_involution() {
        for color in Color::BOTH {
            assert_eq!(color.opponent().opponent(), color);
        }
    }

    #[test]
    fn test_pawn_geometry() {
        assert_eq!(Color::White.pawn_start_row(), 6);
        assert_eq!(Color::White.promotion_row(), 0);
        assert_eq!(Color::Black.pawn_start_row(), 1);
        assert_eq!(Color::Black.promotion_row(), 7);
    }

    #[test]
    fn test_symbols_distinct_per_color() {
        for piece in Piece::ALL {
            assert_ne!(piece.symbol(Color::White), piece.symbol(Color::Black));
        }
    }
}
