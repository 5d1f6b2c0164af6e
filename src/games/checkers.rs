//! # Checkers (English Draughts) Game Implementation
//!
//! 8x8 board, pieces on dark squares only. Red ([`Player::First`]) starts on
//! rows 5-7 and moves up the board; Black ([`Player::Second`]) starts on rows
//! 0-2 and moves down.
//!
//! ## Rules
//! - Men move one square diagonally forward; kings move diagonally both ways
//! - Capturing is mandatory: if any capture exists, only captures are legal
//! - A capture chain must be taken to its end; partial chains are not offered
//! - A man reaching the far row is crowned and the move ends there
//! - A side with no pieces or no legal moves loses

use crate::error::{ArenaError, Result};
use crate::store::Restorable;
use crate::{Evaluate, GameState, Player};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

pub const BOARD_SIZE: usize = 8;
pub const PIECES_PER_SIDE: usize = 12;

const WIN_SCORE: f64 = 1000.0;
const KING_VALUE: f64 = 2.0;
const CENTER_BONUS: f64 = 0.1;
const ADVANCE_BONUS: f64 = 0.05;
const BACK_ROW_BONUS: f64 = 0.2;
const MOBILITY_WEIGHT: f64 = 0.1;

pub type Square = (usize, usize);

/// A piece on the board.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Piece {
    pub owner: Player,
    pub king: bool,
}

impl Piece {
    pub fn man(owner: Player) -> Self {
        Piece { owner, king: false }
    }

    pub fn king(owner: Player) -> Self {
        Piece { owner, king: true }
    }

    fn directions(self) -> &'static [(i32, i32)] {
        match (self.king, self.owner) {
            (true, _) => &[(-1, -1), (-1, 1), (1, -1), (1, 1)],
            (false, Player::First) => &[(-1, -1), (-1, 1)],
            (false, Player::Second) => &[(1, -1), (1, 1)],
        }
    }

    fn value(self) -> f64 {
        if self.king {
            KING_VALUE
        } else {
            1.0
        }
    }
}

/// Row on which a man of `owner` is crowned.
fn crowning_row(owner: Player) -> usize {
    match owner {
        Player::First => 0,
        Player::Second => BOARD_SIZE - 1,
    }
}

/// A move from one square to another, listing every piece it captures in order.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct CheckersMove {
    pub from: Square,
    pub to: Square,
    pub captures: Vec<Square>,
}

impl CheckersMove {
    pub fn is_capture(&self) -> bool {
        !self.captures.is_empty()
    }
}

impl fmt::Display for CheckersMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = if self.is_capture() { 'x' } else { '-' };
        write!(
            f,
            "{},{}{}{},{}",
            self.from.0, self.from.1, sep, self.to.0, self.to.1
        )
    }
}

type Board = Vec<Vec<Option<Piece>>>;

/// Complete state of a checkers game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckersState {
    board: Board,
    current_player: Player,
}

impl Default for CheckersState {
    fn default() -> Self {
        Self::new()
    }
}

// One pending step of the capture-chain search.
struct JumpFrame {
    at: Square,
    piece: Piece,
    board: Board,
    captures: Vec<Square>,
    jumped: HashSet<Square>,
}

impl CheckersState {
    /// Standard opening layout, red to move.
    pub fn new() -> Self {
        let mut board = vec![vec![None; BOARD_SIZE]; BOARD_SIZE];
        for (row, cells) in board.iter_mut().enumerate() {
            for (col, cell) in cells.iter_mut().enumerate() {
                if (row + col) % 2 == 1 {
                    if row < 3 {
                        *cell = Some(Piece::man(Player::Second));
                    } else if row >= 5 {
                        *cell = Some(Piece::man(Player::First));
                    }
                }
            }
        }
        CheckersState {
            board,
            current_player: Player::First,
        }
    }

    /// Builds a position from explicit pieces. Used for set-ups and tests.
    pub fn from_pieces(pieces: &[(Square, Piece)], current_player: Player) -> Self {
        let mut board = vec![vec![None; BOARD_SIZE]; BOARD_SIZE];
        for &((r, c), piece) in pieces {
            board[r][c] = Some(piece);
        }
        CheckersState {
            board,
            current_player,
        }
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board[square.0][square.1]
    }

    /// Number of pieces (men and kings) owned by `player`.
    pub fn piece_count(&self, player: Player) -> usize {
        self.board
            .iter()
            .flatten()
            .filter(|cell| matches!(cell, Some(p) if p.owner == player))
            .count()
    }

    /// Material score for `player`: men count 1, kings 2.
    pub fn material(&self, player: Player) -> f64 {
        self.board
            .iter()
            .flatten()
            .flatten()
            .filter(|p| p.owner == player)
            .map(|p| p.value())
            .sum()
    }

    fn simple_moves(&self, from: Square, piece: Piece) -> Vec<CheckersMove> {
        let mut moves = Vec::new();
        for &(dr, dc) in piece.directions() {
            if let Some(to) = offset(from, dr, dc, 1) {
                if self.board[to.0][to.1].is_none() {
                    moves.push(CheckersMove {
                        from,
                        to,
                        captures: Vec::new(),
                    });
                }
            }
        }
        moves
    }

    /// Every maximal capture chain starting at `from`.
    ///
    /// Depth-first over a stack of frames, each carrying its own board with
    /// the jumped pieces removed and the set of squares already jumped.
    fn jump_moves(&self, from: Square, piece: Piece) -> Vec<CheckersMove> {
        let mut moves = Vec::new();
        let mut start_board = self.board.clone();
        start_board[from.0][from.1] = None;

        let mut stack = vec![JumpFrame {
            at: from,
            piece,
            board: start_board,
            captures: Vec::new(),
            jumped: HashSet::new(),
        }];

        while let Some(frame) = stack.pop() {
            let mut extended = false;
            // English draughts: a man crowned mid-capture ends the move there
            // rather than continuing to jump as a king.
            let crowned_here = !frame.captures.is_empty()
                && !piece.king
                && frame.piece.king;

            if !crowned_here {
                for &(dr, dc) in frame.piece.directions() {
                    let (Some(over), Some(land)) =
                        (offset(frame.at, dr, dc, 1), offset(frame.at, dr, dc, 2))
                    else {
                        continue;
                    };
                    let jumpable = matches!(
                        frame.board[over.0][over.1],
                        Some(p) if p.owner != piece.owner
                    );
                    if !jumpable
                        || frame.board[land.0][land.1].is_some()
                        || frame.jumped.contains(&over)
                    {
                        continue;
                    }

                    let mut board = frame.board.clone();
                    board[over.0][over.1] = None;
                    let mut landing = frame.piece;
                    if !landing.king && land.0 == crowning_row(landing.owner) {
                        landing.king = true;
                    }
                    let mut captures = frame.captures.clone();
                    captures.push(over);
                    let mut jumped = frame.jumped.clone();
                    jumped.insert(over);

                    stack.push(JumpFrame {
                        at: land,
                        piece: landing,
                        board,
                        captures,
                        jumped,
                    });
                    extended = true;
                }
            }

            if !extended && !frame.captures.is_empty() {
                moves.push(CheckersMove {
                    from,
                    to: frame.at,
                    captures: frame.captures,
                });
            }
        }
        moves
    }

    /// Legal moves for the piece on `from`, honoring the mandatory capture
    /// rule across the whole board.
    pub fn moves_from(&self, from: Square) -> Vec<CheckersMove> {
        let Some(piece) = self.piece_at(from) else {
            return Vec::new();
        };
        self.moves_for(piece.owner)
            .into_iter()
            .filter(|m| m.from == from)
            .collect()
    }
}

fn offset(square: Square, dr: i32, dc: i32, steps: i32) -> Option<Square> {
    let r = square.0 as i32 + dr * steps;
    let c = square.1 as i32 + dc * steps;
    if r >= 0 && r < BOARD_SIZE as i32 && c >= 0 && c < BOARD_SIZE as i32 {
        Some((r as usize, c as usize))
    } else {
        None
    }
}

impl GameState for CheckersState {
    type Move = CheckersMove;

    fn get_current_player(&self) -> Player {
        self.current_player
    }

    fn moves_for(&self, player: Player) -> Vec<Self::Move> {
        let mut jumps = Vec::new();
        let mut simple = Vec::new();

        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let Some(piece) = self.board[row][col] else {
                    continue;
                };
                if piece.owner != player {
                    continue;
                }
                let piece_jumps = self.jump_moves((row, col), piece);
                if piece_jumps.is_empty() && jumps.is_empty() {
                    simple.extend(self.simple_moves((row, col), piece));
                }
                jumps.extend(piece_jumps);
            }
        }

        if jumps.is_empty() {
            simple
        } else {
            jumps
        }
    }

    fn apply_move(&self, mv: &Self::Move) -> Self {
        let mut next = self.clone();
        let Some(mut piece) = next.board[mv.from.0][mv.from.1].take() else {
            return next;
        };
        for &(r, c) in &mv.captures {
            next.board[r][c] = None;
        }
        if !piece.king && mv.to.0 == crowning_row(piece.owner) {
            piece.king = true;
        }
        next.board[mv.to.0][mv.to.1] = Some(piece);
        next.current_player = self.current_player.opponent();
        next
    }

    fn pass_turn(&self) -> Self {
        CheckersState {
            board: self.board.clone(),
            current_player: self.current_player.opponent(),
        }
    }

    fn is_terminal(&self) -> bool {
        [Player::First, Player::Second]
            .iter()
            .any(|&p| self.piece_count(p) == 0 || self.moves_for(p).is_empty())
    }

    fn get_winner(&self) -> Option<Player> {
        let stuck = |p: Player| self.piece_count(p) == 0 || self.moves_for(p).is_empty();
        let mover = self.current_player;
        if stuck(mover) {
            Some(mover.opponent())
        } else if stuck(mover.opponent()) {
            Some(mover)
        } else {
            None
        }
    }
}

impl Evaluate for CheckersState {
    fn evaluate(&self, perspective: Player) -> f64 {
        let mut score = self.material(perspective) - self.material(perspective.opponent());

        for (row, cells) in self.board.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                let Some(piece) = cell else { continue };
                let sign = if piece.owner == perspective { 1.0 } else { -1.0 };

                if (2..=5).contains(&col) {
                    score += sign * CENTER_BONUS;
                }

                if !piece.king {
                    let advanced = match piece.owner {
                        Player::First => BOARD_SIZE - 1 - row,
                        Player::Second => row,
                    };
                    score += sign * advanced as f64 * ADVANCE_BONUS;
                }

                let home_row = BOARD_SIZE - 1 - crowning_row(piece.owner);
                if row == home_row {
                    score += sign * BACK_ROW_BONUS;
                }
            }
        }

        let own = self.moves_for(perspective).len() as f64;
        let theirs = self.moves_for(perspective.opponent()).len() as f64;
        score += (own - theirs) * MOBILITY_WEIGHT;

        match self.get_winner() {
            Some(w) if w == perspective => score + WIN_SCORE,
            Some(_) => score - WIN_SCORE,
            None => score,
        }
    }
}

impl Restorable for CheckersState {
    fn validate(&self) -> Result<()> {
        let corrupt = |reason: &str| ArenaError::CorruptState {
            game: "checkers".to_string(),
            reason: reason.to_string(),
        };
        if self.board.len() != BOARD_SIZE || self.board.iter().any(|row| row.len() != BOARD_SIZE) {
            return Err(corrupt("board must be 8x8"));
        }
        for (row, cells) in self.board.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                if cell.is_some() && (row + col) % 2 == 0 {
                    return Err(corrupt("piece on a light square"));
                }
            }
        }
        for p in [Player::First, Player::Second] {
            if self.piece_count(p) > PIECES_PER_SIDE {
                return Err(corrupt("more than twelve pieces for one side"));
            }
        }
        Ok(())
    }
}

impl fmt::Display for CheckersState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  ")?;
        for c in 0..BOARD_SIZE {
            write!(f, "{} ", c)?;
        }
        writeln!(f)?;
        for (r, cells) in self.board.iter().enumerate() {
            write!(f, "{} ", r)?;
            for cell in cells {
                let symbol = match cell {
                    Some(Piece { owner: Player::First, king: false }) => "r",
                    Some(Piece { owner: Player::First, king: true }) => "R",
                    Some(Piece { owner: Player::Second, king: false }) => "b",
                    Some(Piece { owner: Player::Second, king: true }) => "B",
                    None => ".",
                };
                write!(f, "{} ", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
