//! # Backgammon Game Implementation
//!
//! 24 points, 15 checkers per side. White ([`Player::First`]) moves from point
//! 24 toward point 1 and bears off past point 1; Black ([`Player::Second`])
//! moves the other way. Internally points are indices 0..24 and the board holds
//! signed counts: positive for white, negative for black.
//!
//! ## Rules
//! - A roll gives two moves, or four of the same value on doubles; the turn
//!   passes to the opponent once every die is used
//! - A point is open if empty, owned by the mover, or holding a single opposing
//!   checker (a blot); landing on a blot sends it to the bar
//! - Checkers on the bar must re-enter before any other move
//! - Once all of a side's checkers are in its home board it may bear off; a die
//!   larger than needed may bear off the furthest checker only
//! - First to bear off all 15 checkers wins
//!
//! No doubling cube, gammons or backgammons.

use crate::error::{ArenaError, Result};
use crate::store::Restorable;
use crate::{Evaluate, GameState, Player};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const POINTS: usize = 24;
pub const CHECKERS_PER_SIDE: u8 = 15;

const BAR_ENTRY_SCORE: f64 = 200.0;
const BEAR_OFF_SCORE: f64 = 100.0;
const HIT_SCORE: f64 = 50.0;
const POINT_SCORE: f64 = 10.0;

/// Where a checker leaves from.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Origin {
    Bar,
    Point(usize),
}

/// Where a checker lands.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Destination {
    Point(usize),
    Off,
}

/// A single checker move using one die.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct BackgammonMove {
    pub from: Origin,
    pub to: Destination,
    pub die: u8,
}

impl fmt::Display for BackgammonMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.from {
            Origin::Bar => write!(f, "bar")?,
            Origin::Point(i) => write!(f, "{}", i + 1)?,
        }
        match self.to {
            Destination::Point(i) => write!(f, "/{}", i + 1)?,
            Destination::Off => write!(f, "/off")?,
        }
        write!(f, " ({})", self.die)
    }
}

/// Rolls two dice. Doubles yield four moves of that value.
pub fn roll_dice<R: Rng + ?Sized>(rng: &mut R) -> Vec<u8> {
    let first = rng.random_range(1..=6u8);
    let second = rng.random_range(1..=6u8);
    if first == second {
        vec![first; 4]
    } else {
        vec![first, second]
    }
}

fn side(player: Player) -> usize {
    match player {
        Player::First => 0,
        Player::Second => 1,
    }
}

/// Complete state of a backgammon game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgammonState {
    board: [i8; POINTS],
    /// Checkers on the bar, indexed white then black
    bar: [u8; 2],
    /// Checkers borne off, indexed white then black
    off: [u8; 2],
    dice: Vec<u8>,
    moves_remaining: Vec<u8>,
    current_player: Player,
}

impl Default for BackgammonState {
    fn default() -> Self {
        Self::new()
    }
}

impl BackgammonState {
    /// Standard starting layout, white to roll.
    pub fn new() -> Self {
        let mut board = [0i8; POINTS];
        board[23] = 2;
        board[12] = 5;
        board[7] = 3;
        board[5] = 5;
        board[0] = -2;
        board[11] = -5;
        board[16] = -3;
        board[18] = -5;
        BackgammonState {
            board,
            bar: [0, 0],
            off: [0, 0],
            dice: Vec::new(),
            moves_remaining: Vec::new(),
            current_player: Player::First,
        }
    }

    /// Builds a position from explicit counts. Used for set-ups and tests.
    pub fn from_parts(
        board: [i8; POINTS],
        bar: [u8; 2],
        off: [u8; 2],
        current_player: Player,
    ) -> Self {
        BackgammonState {
            board,
            bar,
            off,
            dice: Vec::new(),
            moves_remaining: Vec::new(),
            current_player,
        }
    }

    pub fn board(&self) -> &[i8; POINTS] {
        &self.board
    }

    pub fn bar(&self, player: Player) -> u8 {
        self.bar[side(player)]
    }

    pub fn borne_off(&self, player: Player) -> u8 {
        self.off[side(player)]
    }

    pub fn dice(&self) -> &[u8] {
        &self.dice
    }

    pub fn moves_remaining(&self) -> &[u8] {
        &self.moves_remaining
    }

    /// True when the side to move still has to roll.
    pub fn needs_roll(&self) -> bool {
        self.moves_remaining.is_empty() && !self.is_terminal()
    }

    /// Returns the state with `dice` rolled for the side to move.
    pub fn with_roll(&self, dice: Vec<u8>) -> Self {
        let mut next = self.clone();
        next.moves_remaining = dice.clone();
        next.dice = dice;
        next
    }

    /// Ends the current turn: unused dice are discarded and the other side
    /// is to move.
    pub fn end_turn(&self) -> Self {
        let mut next = self.clone();
        next.dice.clear();
        next.moves_remaining.clear();
        next.current_player = self.current_player.opponent();
        next
    }

    /// Checkers of `player` on the board, on the bar and borne off.
    pub fn total_checkers(&self, player: Player) -> u32 {
        let sign = player.sign();
        let on_board: i32 = self
            .board
            .iter()
            .map(|&n| n as i32 * sign)
            .filter(|&n| n > 0)
            .sum();
        on_board as u32 + self.bar(player) as u32 + self.borne_off(player) as u32
    }

    fn owns(&self, point: usize, player: Player) -> bool {
        self.board[point] as i32 * player.sign() > 0
    }

    fn is_blot_of_opponent(&self, point: usize, player: Player) -> bool {
        self.board[point] as i32 * player.sign() == -1
    }

    /// Empty, own checkers, or a single opposing checker.
    pub fn is_open(&self, point: usize, player: Player) -> bool {
        let n = self.board[point] as i32 * player.sign();
        n >= 0 || n == -1
    }

    /// True when every checker of `player` is in its home board.
    pub fn can_bear_off(&self, player: Player) -> bool {
        if self.bar(player) > 0 {
            return false;
        }
        let outside = match player {
            Player::First => 6..POINTS,
            Player::Second => 0..18,
        };
        !outside.into_iter().any(|i| self.owns(i, player))
    }

    /// Legal moves for `player` using one die of value `die`.
    pub fn moves_for_die(&self, player: Player, die: u8) -> Vec<BackgammonMove> {
        let mut moves = Vec::new();
        let d = die as i32;

        if self.bar(player) > 0 {
            let entry = match player {
                Player::First => (POINTS as i32 - d) as usize,
                Player::Second => (d - 1) as usize,
            };
            if self.is_open(entry, player) {
                moves.push(BackgammonMove {
                    from: Origin::Bar,
                    to: Destination::Point(entry),
                    die,
                });
            }
            return moves;
        }

        let bearing_off = self.can_bear_off(player);
        for i in 0..POINTS {
            if !self.owns(i, player) {
                continue;
            }
            let target = match player {
                Player::First => i as i32 - d,
                Player::Second => i as i32 + d,
            };

            if bearing_off {
                let overshoot = match player {
                    Player::First if target < 0 => Some(target == -1),
                    Player::Second if target >= POINTS as i32 => Some(target == POINTS as i32),
                    _ => None,
                };
                if let Some(exact) = overshoot {
                    // A larger die only bears off the furthest checker.
                    let behind = match player {
                        Player::First => (i + 1..6).any(|j| self.owns(j, player)),
                        Player::Second => (18..i).any(|j| self.owns(j, player)),
                    };
                    if exact || !behind {
                        moves.push(BackgammonMove {
                            from: Origin::Point(i),
                            to: Destination::Off,
                            die,
                        });
                    }
                    continue;
                }
            }

            if (0..POINTS as i32).contains(&target) && self.is_open(target as usize, player) {
                moves.push(BackgammonMove {
                    from: Origin::Point(i),
                    to: Destination::Point(target as usize),
                    die,
                });
            }
        }
        moves
    }

    /// Pips `player` still has to travel to bear everything off.
    pub fn pip_count(&self, player: Player) -> u32 {
        let mut pips = self.bar(player) as u32 * 25;
        for i in 0..POINTS {
            if self.owns(i, player) {
                let n = (self.board[i] as i32).unsigned_abs();
                let distance = match player {
                    Player::First => i as u32 + 1,
                    Player::Second => (POINTS - i) as u32,
                };
                pips += n * distance;
            }
        }
        pips
    }

    /// Deterministic greedy score of a move for the side to move: bar entry,
    /// bearing off, hitting, landing on an own point, and pips advanced.
    pub fn greedy_score(&self, mv: &BackgammonMove) -> f64 {
        let player = self.current_player;
        let mut score = 0.0;

        if mv.from == Origin::Bar {
            score += BAR_ENTRY_SCORE;
        }

        match mv.to {
            Destination::Off => {
                score += BEAR_OFF_SCORE;
                if let Origin::Point(i) = mv.from {
                    let to_off = match player {
                        Player::First => i + 1,
                        Player::Second => POINTS - i,
                    };
                    score += to_off as f64;
                }
            }
            Destination::Point(p) => {
                if self.is_blot_of_opponent(p, player) {
                    score += HIT_SCORE;
                }
                if self.owns(p, player) {
                    score += POINT_SCORE;
                }
                score += mv.die as f64;
            }
        }
        score
    }
}

impl GameState for BackgammonState {
    type Move = BackgammonMove;

    fn get_current_player(&self) -> Player {
        self.current_player
    }

    fn moves_for(&self, player: Player) -> Vec<Self::Move> {
        let mut moves = Vec::new();
        let mut seen = Vec::new();
        for &die in &self.moves_remaining {
            if seen.contains(&die) {
                continue;
            }
            seen.push(die);
            moves.extend(self.moves_for_die(player, die));
        }
        moves
    }

    fn apply_move(&self, mv: &Self::Move) -> Self {
        let mut next = self.clone();
        let player = self.current_player;
        let s = side(player);
        let sign = player.sign() as i8;

        match mv.from {
            Origin::Bar => next.bar[s] -= 1,
            Origin::Point(i) => next.board[i] -= sign,
        }

        match mv.to {
            Destination::Off => next.off[s] += 1,
            Destination::Point(p) => {
                if next.is_blot_of_opponent(p, player) {
                    next.bar[side(player.opponent())] += 1;
                    next.board[p] = 0;
                }
                next.board[p] += sign;
            }
        }

        if let Some(idx) = next.moves_remaining.iter().position(|&d| d == mv.die) {
            next.moves_remaining.remove(idx);
        }
        // Using the last die hands the dice to the opponent.
        if next.moves_remaining.is_empty() && !next.is_terminal() {
            return next.end_turn();
        }
        next
    }

    fn pass_turn(&self) -> Self {
        self.end_turn()
    }

    fn is_terminal(&self) -> bool {
        self.off.iter().any(|&n| n == CHECKERS_PER_SIDE)
    }

    fn get_winner(&self) -> Option<Player> {
        if self.borne_off(Player::First) == CHECKERS_PER_SIDE {
            Some(Player::First)
        } else if self.borne_off(Player::Second) == CHECKERS_PER_SIDE {
            Some(Player::Second)
        } else {
            None
        }
    }
}

impl Evaluate for BackgammonState {
    /// Race evaluation: the pip-count lead of `perspective`.
    fn evaluate(&self, perspective: Player) -> f64 {
        self.pip_count(perspective.opponent()) as f64 - self.pip_count(perspective) as f64
    }
}

impl Restorable for BackgammonState {
    fn validate(&self) -> Result<()> {
        let corrupt = |reason: String| ArenaError::CorruptState {
            game: "backgammon".to_string(),
            reason,
        };
        for p in [Player::First, Player::Second] {
            let total = self.total_checkers(p);
            if total != CHECKERS_PER_SIDE as u32 {
                return Err(corrupt(format!("{} has {} checkers", p, total)));
            }
        }
        if self.moves_remaining.len() > 4 || self.moves_remaining.iter().any(|d| !(1..=6).contains(d)) {
            return Err(corrupt("remaining dice out of range".to_string()));
        }
        Ok(())
    }
}

impl fmt::Display for BackgammonState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (12..POINTS).rev() {
            write!(f, "{:>4}", i + 1)?;
        }
        writeln!(f)?;
        for i in (12..POINTS).rev() {
            write!(f, "{:>4}", self.board[i])?;
        }
        writeln!(f)?;
        for i in 0..12 {
            write!(f, "{:>4}", self.board[11 - i])?;
        }
        writeln!(f)?;
        for i in 0..12 {
            write!(f, "{:>4}", 12 - i)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "bar W:{} B:{}  off W:{} B:{}  dice {:?}",
            self.bar[0], self.bar[1], self.off[0], self.off[1], self.moves_remaining
        )
    }
}
