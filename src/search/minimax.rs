//! Minimax with alpha-beta pruning
//!
//! Scores are always taken from one fixed perspective: nodes where that side is
//! to move maximize, the others minimize. A side with no legal move in a
//! position that is not terminal passes, and the pass costs one ply.

use super::SearchResult;
use crate::{Evaluate, Player};
use tracing::debug;

/// Counters collected during one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub cutoffs: u64,
}

/// Searches `state` to `depth` plies and returns the best score for
/// `perspective` together with the move that achieves it.
///
/// Ties keep the first move found, so the result is stable for a given move
/// ordering.
pub fn minimax<S: Evaluate>(
    state: &S,
    depth: u32,
    mut alpha: f64,
    mut beta: f64,
    perspective: Player,
    stats: &mut SearchStats,
) -> SearchResult<S::Move> {
    stats.nodes += 1;

    if depth == 0 || state.is_terminal() {
        return SearchResult {
            score: state.evaluate(perspective),
            best_move: None,
        };
    }

    let moves = state.get_possible_moves();
    if moves.is_empty() {
        let passed = minimax(&state.pass_turn(), depth - 1, alpha, beta, perspective, stats);
        return SearchResult {
            score: passed.score,
            best_move: None,
        };
    }

    let maximizing = state.get_current_player() == perspective;
    let mut best_score = if maximizing {
        f64::NEG_INFINITY
    } else {
        f64::INFINITY
    };
    let mut best_move = None;

    for mv in moves {
        let child = state.apply_move(&mv);
        let result = minimax(&child, depth - 1, alpha, beta, perspective, stats);

        if maximizing {
            if result.score > best_score {
                best_score = result.score;
                best_move = Some(mv);
            }
            alpha = alpha.max(result.score);
        } else {
            if result.score < best_score {
                best_score = result.score;
                best_move = Some(mv);
            }
            beta = beta.min(result.score);
        }

        if beta <= alpha {
            stats.cutoffs += 1;
            break;
        }
    }

    SearchResult {
        score: best_score,
        best_move,
    }
}

/// Fixed-depth alpha-beta searcher for the side to move.
#[derive(Debug, Clone, Copy)]
pub struct AlphaBeta {
    depth: u32,
}

impl AlphaBeta {
    pub fn new(depth: u32) -> Self {
        AlphaBeta { depth }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Finds the best move for the side to move in `state`.
    pub fn search<S: Evaluate>(&self, state: &S) -> SearchResult<S::Move> {
        let mut stats = SearchStats::default();
        let perspective = state.get_current_player();
        let result = minimax(
            state,
            self.depth,
            f64::NEG_INFINITY,
            f64::INFINITY,
            perspective,
            &mut stats,
        );
        debug!(
            depth = self.depth,
            nodes = stats.nodes,
            cutoffs = stats.cutoffs,
            score = result.score,
            "alpha-beta search finished"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::tictactoe::{TicTacToeMove, TicTacToeState};
    use crate::GameState;

    const X: Option<Player> = Some(Player::First);
    const O: Option<Player> = Some(Player::Second);
    const E: Option<Player> = None;

    #[test]
    fn test_takes_immediate_win() {
        // X to move, 0 and 1 taken: 2 completes the top row.
        let game = TicTacToeState::from_cells([X, X, E, O, O, E, E, E, E], Player::First);
        let result = AlphaBeta::new(9).search(&game);
        assert_eq!(result.best_move, Some(TicTacToeMove(2)));
        assert_eq!(result.score, 10.0);
    }

    #[test]
    fn test_blocks_opponent_line() {
        // O to move must block X on cell 2.
        let game = TicTacToeState::from_cells([X, X, E, E, O, E, E, E, E], Player::Second);
        let result = AlphaBeta::new(9).search(&game);
        assert_eq!(result.best_move, Some(TicTacToeMove(2)));
    }

    #[test]
    fn test_empty_board_is_a_draw() {
        let result = AlphaBeta::new(9).search(&TicTacToeState::new());
        assert_eq!(result.score, 0.0);
        assert!(result.best_move.is_some());
    }

    #[test]
    fn test_terminal_and_depth_zero_return_no_move() {
        let done = TicTacToeState::from_cells([X, X, X, O, O, E, E, E, E], Player::Second);
        let mut stats = SearchStats::default();
        let r = minimax(&done, 5, f64::NEG_INFINITY, f64::INFINITY, Player::Second, &mut stats);
        assert_eq!(r.best_move, None);
        assert_eq!(r.score, -10.0);

        let fresh = TicTacToeState::new();
        let r = minimax(&fresh, 0, f64::NEG_INFINITY, f64::INFINITY, Player::First, &mut stats);
        assert_eq!(r.best_move, None);
        assert_eq!(r.score, 0.0);
    }

    #[test]
    fn test_pruning_visits_fewer_nodes_than_full_tree() {
        let mut stats = SearchStats::default();
        minimax(
            &TicTacToeState::new(),
            9,
            f64::NEG_INFINITY,
            f64::INFINITY,
            Player::First,
            &mut stats,
        );
        // The unpruned tic-tac-toe tree has 549,946 nodes.
        assert!(stats.nodes < 549_946);
        assert!(stats.cutoffs > 0);
    }

    #[test]
    fn test_first_best_move_is_kept() {
        // Every reply draws at depth 1 (no one can win yet): the first legal move is kept.
        let game = TicTacToeState::new();
        let result = AlphaBeta::new(1).search(&game);
        assert_eq!(result.best_move, game.get_possible_moves().first().cloned());
    }
}
