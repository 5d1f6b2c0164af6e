//! # Classic Board Games Arena
//!
//! Rules engines and computer opponents for two-player board games. Every game
//! implements [`GameState`] so the search engines, the controller and the
//! terminal front end can drive any of them through one interface.
//!
//! ## Modules
//! - [`games`]: per-game state, move generation, move application and evaluation
//! - [`search`]: alpha-beta minimax and greedy randomized move pickers
//! - [`ai`]: the computer opponent that picks the right search for each game
//! - [`game_wrapper`]: enum dispatch over all locally modeled games
//! - [`game_controller`]: the authoritative owner of a game in progress
//! - [`store`]: snapshot/restore of game states keyed by game id
//! - [`chess`]: bridge to an external UCI chess engine
//! - [`config`]: optional TOML settings for the terminal front end

pub mod ai;
pub mod chess;
pub mod config;
pub mod error;
pub mod game_controller;
pub mod game_wrapper;
pub mod games;
pub mod search;
pub mod store;

pub use error::{ArenaError, Result};

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two sides of a game.
///
/// `First` always moves first from the initial position. Which side the human
/// plays is decided by [`game_controller::Seating`], never by the rules.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Player {
    First,
    Second,
}

impl Player {
    /// Returns the other side.
    pub fn opponent(self) -> Player {
        match self {
            Player::First => Player::Second,
            Player::Second => Player::First,
        }
    }

    /// +1 for `First`, -1 for `Second`.
    pub fn sign(self) -> i32 {
        match self {
            Player::First => 1,
            Player::Second => -1,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::First => write!(f, "first player"),
            Player::Second => write!(f, "second player"),
        }
    }
}

/// Result of a game as seen from the current position.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    InProgress,
    Win(Player),
    Draw,
}

/// The state of a game. Cloneable and immutable from the point of view of the
/// search: every transition returns a fresh state.
pub trait GameState: Clone + Send + Sync {
    /// The type of a move in the game.
    type Move: Clone + Eq + std::hash::Hash + std::fmt::Debug + Send + Sync;

    /// Returns the player whose turn it is to move.
    fn get_current_player(&self) -> Player;

    /// Returns every legal move for `player` in this position.
    fn moves_for(&self, player: Player) -> Vec<Self::Move>;

    /// Returns every legal move for the side to move.
    fn get_possible_moves(&self) -> Vec<Self::Move> {
        self.moves_for(self.get_current_player())
    }

    /// Returns the state reached by playing `mv`. The move must come from
    /// [`GameState::get_possible_moves`]; it is not validated again.
    fn apply_move(&self, mv: &Self::Move) -> Self;

    /// Returns the same position with the other side to move.
    fn pass_turn(&self) -> Self;

    /// Returns true if the game is over.
    fn is_terminal(&self) -> bool;

    /// Returns the winner of the game, if any.
    /// `None` for a draw or if the game is not over.
    fn get_winner(&self) -> Option<Player>;

    /// Combines [`GameState::is_terminal`] and [`GameState::get_winner`].
    fn outcome(&self) -> Outcome {
        if !self.is_terminal() {
            Outcome::InProgress
        } else {
            match self.get_winner() {
                Some(p) => Outcome::Win(p),
                None => Outcome::Draw,
            }
        }
    }
}

/// Static evaluation used by depth-bounded search.
pub trait Evaluate: GameState {
    /// Scores the position for `perspective`; higher is better for that side.
    /// Must be deterministic.
    fn evaluate(&self, perspective: Player) -> f64;
}
