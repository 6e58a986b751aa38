//! Move types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::piece::Piece;
use super::square::Square;

/// A move request or record: start square, destination square, and an
/// optional promotion choice.
///
/// A `Move` is a plain value, not a live reference into any board. Move
/// generation emits promotion moves with `promotion: None`; the choice is
/// filled in when the move is applied, so an applied promotion move always
/// carries `Some`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Piece>,
}

impl Move {
    /// Create a move with no promotion choice
    #[inline]
    #[must_use]
    pub const fn new(from: Square, to: Square) -> Self {
        Move {
            from,
            to,
            promotion: None,
        }
    }

    /// Create a promotion move
    #[inline]
    #[must_use]
    pub const fn promoting(from: Square, to: Square, piece: Piece) -> Self {
        Move {
            from,
            to,
            promotion: Some(piece),
        }
    }

    /// Returns true if `other` names the same start and destination squares.
    ///
    /// This is the comparison legality checks use: a request with or without
    /// a promotion choice matches the generated move for the same squares.
    #[inline]
    #[must_use]
    pub fn same_squares(&self, other: &Move) -> bool {
        self.from == other.from && self.to == other.to
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promo) = self.promotion {
            write!(f, "{}", promo.to_char())?;
        }
        Ok(())
    }
}

/// Record of a successfully applied move: the finalized move (promotion
/// resolved) plus every square other than start and destination whose
/// contents changed: the captured piece's square (which differs from the
/// destination for en passant) and the rook's two squares for castling.
#[derive(Clone, Debug)]
pub struct AppliedMove {
    pub mv: Move,
    pub affected: Vec<Square>,
}
