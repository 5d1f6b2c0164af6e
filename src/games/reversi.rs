//! # Reversi (Othello) Game Implementation
//!
//! Players take turns placing discs on an 8x8 board, with the goal of having
//! the most discs of their color when neither side can move.
//!
//! ## Rules
//! - A disc must "sandwich" at least one line of opponent discs between the new
//!   disc and an existing disc of the mover's color
//! - All sandwiched discs are flipped to the mover's color
//! - A player with no legal move passes
//! - The game ends when neither player can move; more discs wins, equal is a tie
//!
//! Black is [`Player::First`] and moves first.

use crate::error::{ArenaError, Result};
use crate::store::Restorable;
use crate::{Evaluate, GameState, Player};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const BOARD_SIZE: usize = 8;

const DIRECTIONS: [(i32, i32); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1),           (0, 1),
    (1, -1),  (1, 0),  (1, 1),
];

/// Corners are worth taking, the squares next to them are worth avoiding.
const POSITION_WEIGHTS: [[i32; BOARD_SIZE]; BOARD_SIZE] = [
    [100, -20, 10, 5, 5, 10, -20, 100],
    [-20, -50, -2, -2, -2, -2, -50, -20],
    [10, -2, 1, 1, 1, 1, -2, 10],
    [5, -2, 1, 0, 0, 1, -2, 5],
    [5, -2, 1, 0, 0, 1, -2, 5],
    [10, -2, 1, 1, 1, 1, -2, 10],
    [-20, -50, -2, -2, -2, -2, -50, -20],
    [100, -20, 10, 5, 5, 10, -20, 100],
];

const MOBILITY_WEIGHT: f64 = 5.0;
const WIN_SCORE: f64 = 10_000.0;

/// Placement of a disc at (row, col), with the discs it flips.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct ReversiMove {
    pub row: usize,
    pub col: usize,
    pub flips: Vec<(usize, usize)>,
}

impl fmt::Display for ReversiMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

/// Complete state of a Reversi game.
///
/// The board uses 1 for black discs, -1 for white discs and 0 for empty squares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReversiState {
    board: Vec<Vec<i32>>,
    current_player: Player,
}

impl Default for ReversiState {
    fn default() -> Self {
        Self::new()
    }
}

impl ReversiState {
    /// Standard starting position: two discs each in the center, black to move.
    pub fn new() -> Self {
        let mut board = vec![vec![0; BOARD_SIZE]; BOARD_SIZE];
        board[3][3] = Player::Second.sign();
        board[3][4] = Player::First.sign();
        board[4][3] = Player::First.sign();
        board[4][4] = Player::Second.sign();
        ReversiState {
            board,
            current_player: Player::First,
        }
    }

    /// Builds a position from explicit cells. Used for set-ups and tests.
    pub fn from_cells(board: Vec<Vec<i32>>, current_player: Player) -> Self {
        ReversiState {
            board,
            current_player,
        }
    }

    pub fn get_board(&self) -> &Vec<Vec<i32>> {
        &self.board
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<Player> {
        owner(self.board[row][col])
    }

    /// Returns (black, white) disc counts.
    pub fn score(&self) -> (usize, usize) {
        let mut black = 0;
        let mut white = 0;
        for row in &self.board {
            for &cell in row {
                match owner(cell) {
                    Some(Player::First) => black += 1,
                    Some(Player::Second) => white += 1,
                    None => {}
                }
            }
        }
        (black, white)
    }

    /// Discs that placing at (row, col) for `player` would flip, across all
    /// eight directions. Empty if the square is occupied or the move is illegal.
    pub fn flips_for(&self, row: usize, col: usize, player: Player) -> Vec<(usize, usize)> {
        if self.board[row][col] != 0 {
            return Vec::new();
        }
        let mut all = Vec::new();
        for &(dr, dc) in DIRECTIONS.iter() {
            all.extend(self.flips_in_direction(row, col, player, dr, dc));
        }
        all
    }

    fn flips_in_direction(
        &self,
        row: usize,
        col: usize,
        player: Player,
        dr: i32,
        dc: i32,
    ) -> Vec<(usize, usize)> {
        let opponent = player.opponent().sign();
        let mut line = Vec::new();
        let mut r = row as i32 + dr;
        let mut c = col as i32 + dc;

        while in_bounds(r, c) && self.board[r as usize][c as usize] == opponent {
            line.push((r as usize, c as usize));
            r += dr;
            c += dc;
        }

        if !line.is_empty() && in_bounds(r, c) && self.board[r as usize][c as usize] == player.sign() {
            line
        } else {
            Vec::new()
        }
    }
}

fn in_bounds(r: i32, c: i32) -> bool {
    r >= 0 && r < BOARD_SIZE as i32 && c >= 0 && c < BOARD_SIZE as i32
}

fn owner(cell: i32) -> Option<Player> {
    match cell {
        1 => Some(Player::First),
        -1 => Some(Player::Second),
        _ => None,
    }
}

impl GameState for ReversiState {
    type Move = ReversiMove;

    fn get_current_player(&self) -> Player {
        self.current_player
    }

    fn moves_for(&self, player: Player) -> Vec<Self::Move> {
        let mut moves = Vec::new();
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let flips = self.flips_for(row, col, player);
                if !flips.is_empty() {
                    moves.push(ReversiMove { row, col, flips });
                }
            }
        }
        moves
    }

    fn apply_move(&self, mv: &Self::Move) -> Self {
        let mut next = self.clone();
        let sign = self.current_player.sign();
        next.board[mv.row][mv.col] = sign;
        for &(r, c) in &mv.flips {
            next.board[r][c] = sign;
        }
        next.current_player = self.current_player.opponent();
        next
    }

    fn pass_turn(&self) -> Self {
        ReversiState {
            board: self.board.clone(),
            current_player: self.current_player.opponent(),
        }
    }

    fn is_terminal(&self) -> bool {
        self.moves_for(Player::First).is_empty() && self.moves_for(Player::Second).is_empty()
    }

    fn get_winner(&self) -> Option<Player> {
        if !self.is_terminal() {
            return None;
        }
        let (black, white) = self.score();
        if black > white {
            Some(Player::First)
        } else if white > black {
            Some(Player::Second)
        } else {
            None
        }
    }
}

impl Evaluate for ReversiState {
    fn evaluate(&self, perspective: Player) -> f64 {
        let me = perspective.sign();
        if self.is_terminal() {
            let (black, white) = self.score();
            let diff = (black as f64 - white as f64) * me as f64;
            return match self.get_winner() {
                Some(w) if w == perspective => WIN_SCORE + diff,
                Some(_) => -WIN_SCORE + diff,
                None => 0.0,
            };
        }

        let mut score = 0.0;
        for (r, row) in self.board.iter().enumerate() {
            for (c, &cell) in row.iter().enumerate() {
                if cell == me {
                    score += POSITION_WEIGHTS[r][c] as f64;
                } else if cell == -me {
                    score -= POSITION_WEIGHTS[r][c] as f64;
                }
            }
        }

        let own = self.moves_for(perspective).len() as f64;
        let theirs = self.moves_for(perspective.opponent()).len() as f64;
        score + (own - theirs) * MOBILITY_WEIGHT
    }
}

impl Restorable for ReversiState {
    fn validate(&self) -> Result<()> {
        let corrupt = |reason: &str| ArenaError::CorruptState {
            game: "reversi".to_string(),
            reason: reason.to_string(),
        };
        if self.board.len() != BOARD_SIZE || self.board.iter().any(|row| row.len() != BOARD_SIZE) {
            return Err(corrupt("board must be 8x8"));
        }
        if self.board.iter().flatten().any(|&cell| !(-1..=1).contains(&cell)) {
            return Err(corrupt("cell values must be -1, 0 or 1"));
        }
        let (black, white) = self.score();
        if black + white < 4 {
            return Err(corrupt("fewer discs than the starting position"));
        }
        Ok(())
    }
}

impl fmt::Display for ReversiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  ")?;
        for c in 0..BOARD_SIZE {
            write!(f, "{} ", c)?;
        }
        writeln!(f)?;
        for (r, row) in self.board.iter().enumerate() {
            write!(f, "{} ", r)?;
            for &cell in row {
                let symbol = match cell {
                    1 => "B",
                    -1 => "W",
                    _ => ".",
                };
                write!(f, "{} ", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_game() {
        let game = ReversiState::new();
        assert_eq!(game.get_current_player(), Player::First);
        assert_eq!(game.score(), (2, 2));
        assert_eq!(game.get_possible_moves().len(), 4);
    }

    #[test]
    fn test_opening_move_flips_one_disc() {
        let game = ReversiState::new();
        let mv = game
            .get_possible_moves()
            .into_iter()
            .find(|m| m.row == 2 && m.col == 3)
            .expect("(2,3) is legal for black at the start");
        assert_eq!(mv.flips, vec![(3, 3)]);

        let next = game.apply_move(&mv);
        assert_eq!(next.cell(2, 3), Some(Player::First));
        assert_eq!(next.cell(3, 3), Some(Player::First));
        assert_eq!(next.score(), (4, 1));
        assert_eq!(next.get_current_player(), Player::Second);
        // input untouched
        assert_eq!(game.score(), (2, 2));
    }

    #[test]
    fn test_occupied_square_is_never_legal() {
        let game = ReversiState::new();
        assert!(game.flips_for(3, 3, Player::First).is_empty());
        assert!(game.flips_for(3, 4, Player::Second).is_empty());
    }

    #[test]
    fn test_full_board_is_terminal() {
        let mut board = vec![vec![1; BOARD_SIZE]; BOARD_SIZE];
        for cell in board[0].iter_mut() {
            *cell = -1;
        }
        let game = ReversiState::from_cells(board, Player::Second);
        assert!(game.is_terminal());
        assert_eq!(game.get_winner(), Some(Player::First));
        assert!(game.is_terminal());
    }

    #[test]
    fn test_tie_has_no_winner() {
        let mut board = vec![vec![1; BOARD_SIZE]; BOARD_SIZE];
        for row in board.iter_mut().take(4) {
            for cell in row.iter_mut() {
                *cell = -1;
            }
        }
        let game = ReversiState::from_cells(board, Player::First);
        assert!(game.is_terminal());
        assert_eq!(game.get_winner(), None);
    }

    #[test]
    fn test_evaluation_is_symmetric_at_start() {
        let game = ReversiState::new();
        assert_eq!(game.evaluate(Player::First), 0.0);
        assert_eq!(game.evaluate(Player::Second), 0.0);
    }

    #[test]
    fn test_corner_outweighs_x_square() {
        let mut corner = vec![vec![0; BOARD_SIZE]; BOARD_SIZE];
        corner[0][0] = 1;
        corner[7][7] = -1;
        corner[3][3] = -1;
        corner[3][4] = 1;
        let mut x_square = corner.clone();
        x_square[0][0] = 0;
        x_square[1][1] = 1;
        let a = ReversiState::from_cells(corner, Player::First);
        let b = ReversiState::from_cells(x_square, Player::First);
        assert!(a.evaluate(Player::First) > b.evaluate(Player::First));
    }

    #[test]
    fn test_validate_rejects_bad_shapes() {
        let bad = ReversiState::from_cells(vec![vec![0; 8]; 7], Player::First);
        assert!(bad.validate().is_err());
        let bad_cell = {
            let mut board = ReversiState::new().get_board().clone();
            board[0][0] = 7;
            ReversiState::from_cells(board, Player::First)
        };
        assert!(bad_cell.validate().is_err());
        assert!(ReversiState::new().validate().is_ok());
    }
}
