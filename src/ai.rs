//! Computer opponent
//!
//! Chooses the search engine per game: alpha-beta minimax for games with a
//! static evaluation, greedy scoring for backgammon and Go. The player owns
//! the one seeded generator used for dice, jitter and exploration.

use crate::game_wrapper::{GameKind, GameWrapper, MoveWrapper};
use crate::games::backgammon::roll_dice;
use crate::games::go::{GoAi, GoMove, GoRules};
use crate::search::greedy::{Exploration, GreedyPicker};
use crate::search::minimax::AlphaBeta;
use crate::search::Difficulty;
use crate::GameState;
use tracing::debug;

/// Uniform noise added to each backgammon candidate score.
pub const BACKGAMMON_JITTER: f64 = 5.0;

const CHECKERS_DEPTH: [u32; 3] = [2, 4, 6];
const REVERSI_DEPTH: [u32; 3] = [1, 3, 5];
/// Deep enough to reach the end of any tic-tac-toe game.
const TICTACTOE_DEPTH: u32 = 9;

#[derive(Debug, Clone)]
pub struct ComputerPlayer {
    difficulty: Difficulty,
    picker: GreedyPicker,
    randomized: bool,
}

impl ComputerPlayer {
    /// With `randomized` off, greedy choices drop both the jitter and the
    /// exploration, so the same position always yields the same move.
    pub fn new(difficulty: Difficulty, seed: u64, randomized: bool) -> Self {
        let jitter = if randomized { BACKGAMMON_JITTER } else { 0.0 };
        ComputerPlayer {
            difficulty,
            picker: GreedyPicker::new(seed, jitter),
            randomized,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Search depth used for `kind`, `None` for the greedy games.
    pub fn search_depth(&self, kind: GameKind) -> Option<u32> {
        match kind {
            GameKind::TicTacToe => Some(TICTACTOE_DEPTH),
            GameKind::Checkers => Some(self.difficulty.pick(CHECKERS_DEPTH)),
            GameKind::Reversi => Some(self.difficulty.pick(REVERSI_DEPTH)),
            GameKind::Backgammon => None,
        }
    }

    fn exploration(&self) -> Exploration {
        if self.randomized {
            self.difficulty.exploration()
        } else {
            Exploration::greedy()
        }
    }

    /// Picks a move for the side to move, or `None` when it has none.
    pub fn choose_move(&mut self, game: &GameWrapper) -> Option<MoveWrapper> {
        if let Some(depth) = self.search_depth(game.kind()) {
            let result = AlphaBeta::new(depth).search(game);
            debug!(game = %game.kind(), depth, score = result.score, "minimax move");
            return result.best_move;
        }

        match game {
            GameWrapper::Backgammon(bg) => {
                let scored = bg
                    .get_possible_moves()
                    .into_iter()
                    .map(|mv| {
                        let score = bg.greedy_score(&mv);
                        (mv, score)
                    })
                    .collect();
                let exploration = self.exploration();
                self.picker.pick(scored, exploration).map(MoveWrapper::Backgammon)
            }
            _ => None,
        }
    }

    /// Picks a Go move through the rules library.
    pub fn choose_go_move<R: GoRules>(&mut self, rules: &R) -> GoMove {
        GoAi::with_exploration(self.exploration()).choose(rules, &mut self.picker)
    }

    /// Rolls the dice for a backgammon turn.
    pub fn roll_dice(&mut self) -> Vec<u8> {
        roll_dice(self.picker.rng())
    }
}
