//! # Tic-Tac-Toe Game Implementation
//!
//! 3x3 grid. X ([`Player::First`]) moves first. Three in a row, column or
//! diagonal wins; a full grid without a line is a draw. Small enough that the
//! computer searches every line of play to the end.

use crate::error::{ArenaError, Result};
use crate::store::Restorable;
use crate::{Evaluate, GameState, Player};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const CELLS: usize = 9;

const WIN_LINES: [[usize; 3]; 8] = [
    [0, 1, 2], [3, 4, 5], [6, 7, 8],
    [0, 3, 6], [1, 4, 7], [2, 5, 8],
    [0, 4, 8], [2, 4, 6],
];

const WIN_SCORE: f64 = 10.0;

/// Index (0..9, row-major) of the cell to mark.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct TicTacToeMove(pub usize);

impl fmt::Display for TicTacToeMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicTacToeState {
    cells: [Option<Player>; CELLS],
    current_player: Player,
}

impl Default for TicTacToeState {
    fn default() -> Self {
        Self::new()
    }
}

impl TicTacToeState {
    pub fn new() -> Self {
        TicTacToeState {
            cells: [None; CELLS],
            current_player: Player::First,
        }
    }

    pub fn from_cells(cells: [Option<Player>; CELLS], current_player: Player) -> Self {
        TicTacToeState {
            cells,
            current_player,
        }
    }

    pub fn cell(&self, index: usize) -> Option<Player> {
        self.cells[index]
    }

    /// The completed line and its owner, if any.
    pub fn winning_line(&self) -> Option<(Player, [usize; 3])> {
        WIN_LINES.iter().find_map(|&[a, b, c]| match self.cells[a] {
            Some(p) if self.cells[b] == Some(p) && self.cells[c] == Some(p) => Some((p, [a, b, c])),
            _ => None,
        })
    }

    fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }
}

impl GameState for TicTacToeState {
    type Move = TicTacToeMove;

    fn get_current_player(&self) -> Player {
        self.current_player
    }

    fn moves_for(&self, _player: Player) -> Vec<Self::Move> {
        if self.winning_line().is_some() {
            return Vec::new();
        }
        (0..CELLS)
            .filter(|&i| self.cells[i].is_none())
            .map(TicTacToeMove)
            .collect()
    }

    fn apply_move(&self, mv: &Self::Move) -> Self {
        let mut next = self.clone();
        next.cells[mv.0] = Some(self.current_player);
        next.current_player = self.current_player.opponent();
        next
    }

    fn pass_turn(&self) -> Self {
        TicTacToeState {
            cells: self.cells,
            current_player: self.current_player.opponent(),
        }
    }

    fn is_terminal(&self) -> bool {
        self.winning_line().is_some() || self.is_full()
    }

    fn get_winner(&self) -> Option<Player> {
        self.winning_line().map(|(p, _)| p)
    }
}

impl Evaluate for TicTacToeState {
    fn evaluate(&self, perspective: Player) -> f64 {
        match self.get_winner() {
            Some(p) if p == perspective => WIN_SCORE,
            Some(_) => -WIN_SCORE,
            None => 0.0,
        }
    }
}

impl Restorable for TicTacToeState {
    fn validate(&self) -> Result<()> {
        let xs = self.cells.iter().filter(|c| **c == Some(Player::First)).count();
        let os = self.cells.iter().filter(|c| **c == Some(Player::Second)).count();
        let expected_turn = if xs == os { Player::First } else { Player::Second };
        if xs < os || xs > os + 1 || expected_turn != self.current_player {
            return Err(ArenaError::CorruptState {
                game: "tictactoe".to_string(),
                reason: format!("{} X and {} O with {} to move", xs, os, self.current_player),
            });
        }
        Ok(())
    }
}

impl fmt::Display for TicTacToeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..3 {
            for col in 0..3 {
                let i = row * 3 + col;
                match self.cells[i] {
                    Some(Player::First) => write!(f, " X ")?,
                    Some(Player::Second) => write!(f, " O ")?,
                    None => write!(f, " {} ", i)?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const X: Option<Player> = Some(Player::First);
    const O: Option<Player> = Some(Player::Second);
    const E: Option<Player> = None;

    #[test]
    fn test_new_game() {
        let game = TicTacToeState::new();
        assert_eq!(game.get_possible_moves().len(), 9);
        assert!(!game.is_terminal());
    }

    #[test]
    fn test_diagonal_win() {
        let game = TicTacToeState::from_cells([X, O, E, O, X, E, E, E, X], Player::Second);
        assert!(game.is_terminal());
        assert_eq!(game.winning_line(), Some((Player::First, [0, 4, 8])));
        assert!(game.get_possible_moves().is_empty());
        assert_eq!(game.evaluate(Player::Second), -10.0);
    }

    #[test]
    fn test_full_board_draw() {
        let game = TicTacToeState::from_cells([X, O, X, X, O, O, O, X, X], Player::Second);
        assert!(game.is_terminal());
        assert_eq!(game.get_winner(), None);
        assert_eq!(game.outcome(), crate::Outcome::Draw);
    }

    #[test]
    fn test_validate_turn_parity() {
        let ok = TicTacToeState::from_cells([X, E, E, E, E, E, E, E, E], Player::Second);
        assert!(ok.validate().is_ok());
        let bad = TicTacToeState::from_cells([X, X, E, E, E, E, E, E, E], Player::Second);
        assert!(bad.validate().is_err());
    }
}
