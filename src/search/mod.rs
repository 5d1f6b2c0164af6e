//! # Search Engines
//!
//! Two ways of choosing a computer move:
//! - [`minimax`]: depth-bounded minimax with alpha-beta pruning, used for games
//!   with a meaningful static evaluation (checkers, reversi, tic-tac-toe)
//! - [`greedy`]: one-ply scoring with jitter and occasional exploration among
//!   the best candidates, used for backgammon and Go
//!
//! Depth is the only resource bound. Neither engine has timeouts.

pub mod greedy;
pub mod minimax;

use crate::error::ArenaError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Outcome of a search: the score of the position and the move that reaches
/// it. `best_move` is `None` at leaves, terminal nodes and forced passes.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult<M> {
    pub score: f64,
    pub best_move: Option<M>,
}

/// How strong the computer plays.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Picks the entry of a per-game `[easy, medium, hard]` table.
    pub fn pick<T: Copy>(self, table: [T; 3]) -> T {
        match self {
            Difficulty::Easy => table[0],
            Difficulty::Medium => table[1],
            Difficulty::Hard => table[2],
        }
    }

    /// Exploration settings for the greedy engines.
    pub fn exploration(self) -> greedy::Exploration {
        let (depth, randomness) = self.pick([(1, 0.8), (2, 0.4), (3, 0.1)]);
        greedy::Exploration {
            randomness,
            top_n: 5 + depth * 2,
        }
    }
}

impl FromStr for Difficulty {
    type Err = ArenaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" | "shallow" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" | "deep" => Ok(Difficulty::Hard),
            other => Err(ArenaError::UnknownDifficulty(other.to_string())),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        write!(f, "{}", name)
    }
}
