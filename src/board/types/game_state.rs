//! Game state classification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome classification for the side to move, recomputed after every
/// applied move.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum GameState {
    Normal,
    Check,
    Checkmate,
    Stalemate,
}

impl GameState {
    /// Returns true when the game has ended
    #[inline]
    #[must_use]
    pub const fn is_game_over(self) -> bool {
        matches!(self, GameState::Checkmate | GameState::Stalemate)
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameState::Normal => write!(f, "Normal"),
            GameState::Check => write!(f, "Check"),
            GameState::Checkmate => write!(f, "Checkmate"),
            GameState::Stalemate => write!(f, "Stalemate"),
        }
    }
}
