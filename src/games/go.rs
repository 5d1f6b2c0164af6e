//! # Go Boundary
//!
//! Go rules (liberties, captures, ko, suicide) belong to an external rules
//! library. This module only defines the surface the arena needs from such a
//! library ([`GoRules`]) and builds three things on top of it:
//!
//! - [`GoAi`]: one-ply heuristic move choice
//! - [`GoMatch`]: turn flow, where two consecutive passes end the game
//! - [`GoScore`]: stones plus captures, with komi for white
//!
//! Black is [`Player::First`].

use crate::search::greedy::{Exploration, GreedyPicker};
use crate::search::Difficulty;
use crate::Player;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Compensation added to white's score.
pub const KOMI: f64 = 6.5;

/// What the arena expects from a Go rules library.
///
/// Coordinates are `(x, y)` with `0 <= x, y < size()`.
pub trait GoRules: Clone {
    fn size(&self) -> usize;
    /// Side to move.
    fn turn(&self) -> Player;
    fn stone_at(&self, x: usize, y: usize) -> Option<Player>;
    /// Legality of placing a stone for the side to move.
    fn is_valid(&self, x: usize, y: usize) -> bool;
    /// Places a stone for the side to move. Returns `false` and leaves the
    /// position untouched if the move is illegal.
    fn play(&mut self, x: usize, y: usize) -> bool;
    /// Stones captured so far by `player`.
    fn captures(&self, player: Player) -> u32;
    /// Passes the turn.
    fn pass(&mut self);
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum GoMove {
    Place { x: usize, y: usize },
    Pass,
}

impl fmt::Display for GoMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoMove::Place { x, y } => write!(f, "{},{}", x, y),
            GoMove::Pass => write!(f, "pass"),
        }
    }
}

/// Final or running score of a position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoScore {
    pub black: f64,
    pub white: f64,
}

impl GoScore {
    /// Stones on the board plus captures; white receives [`KOMI`].
    pub fn count<R: GoRules>(rules: &R) -> Self {
        let size = rules.size();
        let mut black = 0u32;
        let mut white = 0u32;
        for y in 0..size {
            for x in 0..size {
                match rules.stone_at(x, y) {
                    Some(Player::First) => black += 1,
                    Some(Player::Second) => white += 1,
                    None => {}
                }
            }
        }
        GoScore {
            black: (black + rules.captures(Player::First)) as f64,
            white: (white + rules.captures(Player::Second)) as f64 + KOMI,
        }
    }

    /// `None` on an exact tie.
    pub fn winner(&self) -> Option<Player> {
        if self.black > self.white {
            Some(Player::First)
        } else if self.white > self.black {
            Some(Player::Second)
        } else {
            None
        }
    }
}

impl fmt::Display for GoScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "black {} / white {}", self.black, self.white)
    }
}

/// Heuristic Go player.
///
/// Each legal point is tried on a copy of the position and scored by captures
/// gained, closeness to the centre and contact with other stones.
#[derive(Debug, Clone)]
pub struct GoAi {
    exploration: Exploration,
}

impl GoAi {
    pub fn new(difficulty: Difficulty) -> Self {
        GoAi {
            exploration: difficulty.exploration(),
        }
    }

    pub fn with_exploration(exploration: Exploration) -> Self {
        GoAi { exploration }
    }

    /// Score of playing at `(x, y)`, or `None` if the point is not playable.
    pub fn score_move<R: GoRules>(&self, rules: &R, x: usize, y: usize) -> Option<f64> {
        if !rules.is_valid(x, y) {
            return None;
        }
        let me = rules.turn();
        let mut trial = rules.clone();
        if !trial.play(x, y) {
            return None;
        }

        let size = rules.size();
        let captured = trial.captures(me).saturating_sub(rules.captures(me)) as f64;
        let center = (size / 2) as i64;
        let distance = ((x as i64 - center).abs() + (y as i64 - center).abs()) as f64;

        let mut contact = 0.0;
        for (nx, ny) in neighbours(x, y, size) {
            match rules.stone_at(nx, ny) {
                Some(p) if p == me => contact += 2.0,
                Some(_) => contact += 1.0,
                None => {}
            }
        }

        Some(captured * 10.0 + (size as f64 - distance) * 0.5 + contact)
    }

    /// Picks a point for the side to move, or [`GoMove::Pass`] when nothing is
    /// playable.
    pub fn choose<R: GoRules>(&self, rules: &R, picker: &mut GreedyPicker) -> GoMove {
        let size = rules.size();
        let mut scored = Vec::new();
        for y in 0..size {
            for x in 0..size {
                if let Some(score) = self.score_move(rules, x, y) {
                    scored.push((GoMove::Place { x, y }, score));
                }
            }
        }
        debug!(candidates = scored.len(), "go move scoring");
        picker
            .pick(scored, self.exploration)
            .unwrap_or(GoMove::Pass)
    }
}

fn neighbours(x: usize, y: usize, size: usize) -> impl Iterator<Item = (usize, usize)> {
    let (x, y) = (x as i64, y as i64);
    [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)]
        .into_iter()
        .filter(move |&(nx, ny)| nx >= 0 && ny >= 0 && nx < size as i64 && ny < size as i64)
        .map(|(nx, ny)| (nx as usize, ny as usize))
}

/// A Go game in progress: the rules position plus the pass counter.
#[derive(Debug, Clone)]
pub struct GoMatch<R: GoRules> {
    rules: R,
    consecutive_passes: u8,
    result: Option<GoScore>,
}

impl<R: GoRules> GoMatch<R> {
    pub fn new(rules: R) -> Self {
        GoMatch {
            rules,
            consecutive_passes: 0,
            result: None,
        }
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn consecutive_passes(&self) -> u8 {
        self.consecutive_passes
    }

    pub fn is_over(&self) -> bool {
        self.result.is_some()
    }

    /// The final score once two passes in a row have ended the game.
    pub fn result(&self) -> Option<GoScore> {
        self.result
    }

    /// Plays `mv` for the side to move. Returns `false` if the game is over or
    /// the rules library rejects the placement.
    pub fn play(&mut self, mv: GoMove) -> bool {
        if self.is_over() {
            return false;
        }
        match mv {
            GoMove::Place { x, y } => {
                if !self.rules.play(x, y) {
                    return false;
                }
                self.consecutive_passes = 0;
            }
            GoMove::Pass => {
                self.rules.pass();
                self.consecutive_passes += 1;
                if self.consecutive_passes >= 2 {
                    let score = GoScore::count(&self.rules);
                    debug!(%score, "go game ended by two passes");
                    self.result = Some(score);
                }
            }
        }
        true
    }
}
