//! Properties of the rules engines and searches checked over seeded random playouts.

use arena::ai::ComputerPlayer;
use arena::game_wrapper::{GameKind, GameWrapper};
use arena::games::backgammon::{roll_dice, BackgammonState, Destination};
use arena::games::checkers::CheckersState;
use arena::games::reversi::ReversiState;
use arena::search::minimax::AlphaBeta;
use arena::search::Difficulty;
use arena::{Evaluate, GameState, Player};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Minimax without pruning, same pass handling as the engine.
fn plain_minimax<S: Evaluate>(state: &S, depth: u32, perspective: Player) -> f64 {
    if depth == 0 || state.is_terminal() {
        return state.evaluate(perspective);
    }
    let moves = state.get_possible_moves();
    if moves.is_empty() {
        return plain_minimax(&state.pass_turn(), depth - 1, perspective);
    }
    let scores = moves
        .iter()
        .map(|m| plain_minimax(&state.apply_move(m), depth - 1, perspective));
    if state.get_current_player() == perspective {
        scores.fold(f64::NEG_INFINITY, f64::max)
    } else {
        scores.fold(f64::INFINITY, f64::min)
    }
}

fn random_pick<T: Clone>(rng: &mut Xoshiro256PlusPlus, items: &[T]) -> T {
    items[rng.random_range(0..items.len())].clone()
}

#[test]
fn test_alpha_beta_matches_plain_minimax_on_reversi() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
    let mut game = ReversiState::new();
    for _ in 0..6 {
        let depth = 3;
        let pruned = AlphaBeta::new(depth).search(&game);
        let exact = plain_minimax(&game, depth, game.get_current_player());
        assert_eq!(pruned.score, exact);

        let moves = game.get_possible_moves();
        if moves.is_empty() {
            break;
        }
        game = game.apply_move(&random_pick(&mut rng, &moves));
    }
}

#[test]
fn test_alpha_beta_matches_plain_minimax_on_checkers() {
    let game = CheckersState::new();
    let pruned = AlphaBeta::new(4).search(&game);
    assert_eq!(pruned.score, plain_minimax(&game, 4, Player::First));
    assert!(pruned.best_move.is_some());
}

#[test]
fn test_checkers_playouts_keep_capture_rules() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(11);
    for _ in 0..20 {
        let mut game = CheckersState::new();
        for _ in 0..150 {
            let moves = game.get_possible_moves();
            if moves.is_empty() {
                assert!(game.is_terminal());
                break;
            }
            if moves.iter().any(|m| m.is_capture()) {
                assert!(moves.iter().all(|m| m.is_capture()));
            }

            let mv = random_pick(&mut rng, &moves);
            let mover = game.get_current_player();
            let before = game.piece_count(mover.opponent());
            let own = game.piece_count(mover);
            game = game.apply_move(&mv);
            assert_eq!(before - game.piece_count(mover.opponent()), mv.captures.len());
            assert_eq!(own, game.piece_count(mover));
        }
    }
}

#[test]
fn test_reversi_playouts_add_one_disc_per_move() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
    for _ in 0..20 {
        let mut game = ReversiState::new();
        while !game.is_terminal() {
            let moves = game.get_possible_moves();
            if moves.is_empty() {
                game = game.pass_turn();
                continue;
            }
            let (b, w) = game.score();
            game = game.apply_move(&random_pick(&mut rng, &moves));
            let (nb, nw) = game.score();
            assert_eq!(nb + nw, b + w + 1);
        }
        let first = game.evaluate(Player::First);
        assert_eq!(first, game.evaluate(Player::First));
        assert_eq!(first, -game.evaluate(Player::Second));
    }
}

#[test]
fn test_backgammon_playouts_respect_blocks_and_conserve_checkers() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(21);
    for _ in 0..10 {
        let mut game = BackgammonState::new();
        let mut movers = Vec::new();
        for _ in 0..3000 {
            if game.is_terminal() {
                break;
            }
            if game.needs_roll() {
                game = game.with_roll(roll_dice(&mut rng));
                continue;
            }
            let moves = game.get_possible_moves();
            if moves.is_empty() {
                game = game.end_turn();
                continue;
            }

            let player = game.get_current_player();
            if !movers.contains(&player) {
                movers.push(player);
            }
            for mv in &moves {
                if let Destination::Point(p) = mv.to {
                    let opposing = -(game.board()[p] as i32) * player.sign();
                    assert!(opposing < 2, "{} lands on a closed point", mv);
                }
            }

            game = game.apply_move(&random_pick(&mut rng, &moves));
            assert_eq!(game.total_checkers(Player::First), 15);
            assert_eq!(game.total_checkers(Player::Second), 15);
        }
        assert!(movers.contains(&Player::First));
        assert!(movers.contains(&Player::Second));
        if game.is_terminal() {
            let winner = game.get_winner().unwrap();
            assert_eq!(game.borne_off(winner), 15);
        }
    }
}

#[test]
fn test_same_seed_replays_the_same_backgammon_choices() {
    let mut left = ComputerPlayer::new(Difficulty::Easy, 1234, true);
    let mut right = ComputerPlayer::new(Difficulty::Easy, 1234, true);
    let mut game = GameKind::Backgammon.initial_state();

    for _ in 0..40 {
        if let GameWrapper::Backgammon(bg) = &game {
            if bg.needs_roll() {
                let dice = left.roll_dice();
                assert_eq!(dice, right.roll_dice());
                game = GameWrapper::Backgammon(bg.with_roll(dice));
                continue;
            }
        }
        let a = left.choose_move(&game);
        let b = right.choose_move(&game);
        assert_eq!(a, b);
        game = match a {
            Some(mv) => game.apply_move(&mv),
            None => game.pass_turn(),
        };
    }
}

#[test]
fn test_terminal_evaluation_is_stable() {
    for kind in GameKind::ALL {
        let game = kind.initial_state();
        assert_eq!(game.evaluate(Player::First), game.evaluate(Player::First));
    }
}
