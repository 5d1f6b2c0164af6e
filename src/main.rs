//! # Classic Board Games Arena
//!
//! Terminal front end: play tic-tac-toe, checkers, reversi or backgammon
//! against the computer, or ask an external UCI engine for a chess move.
//!
//! ## Usage
//! ```text
//! play --game reversi --difficulty hard --store arena-state.json
//! play --game backgammon --seed 7 --human-second
//! play --game chess --engine /usr/bin/stockfish --level club --fen "<FEN>"
//! ```
//!
//! Moves are entered by their list index or their notation. `new` starts over,
//! `history` prints the moves so far, `quit` leaves. Games are saved after
//! every move when a store file is given.

use arena::ai::ComputerPlayer;
use arena::chess::uci::ProcessEngine;
use arena::chess::{ChessLevel, Fen};
use arena::config::ArenaConfig;
use arena::game_controller::{GameController, GameStatus, MoveResult, Seating, TurnEvent};
use arena::game_wrapper::{GameKind, GameWrapper, MoveWrapper};
use arena::search::Difficulty;
use arena::store::GameStore;
use arena::{ArenaError, Player};
use clap::Parser;
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// tictactoe, checkers, reversi, backgammon or chess
    #[clap(short, long, default_value = "tictactoe")]
    game: String,

    /// easy, medium or hard
    #[clap(short, long)]
    difficulty: Option<String>,

    #[clap(short, long)]
    seed: Option<u64>,

    /// Pause before each computer move, in milliseconds
    #[clap(long)]
    think_ms: Option<u64>,

    /// JSON file games are saved to
    #[clap(long)]
    store: Option<PathBuf>,

    /// TOML configuration file
    #[clap(short, long)]
    config: Option<PathBuf>,

    #[clap(long, action = clap::ArgAction::SetTrue)]
    human_second: bool,

    /// Make greedy move choice fully deterministic
    #[clap(long, action = clap::ArgAction::SetTrue)]
    no_jitter: bool,

    /// Path to a UCI chess engine
    #[clap(long)]
    engine: Option<PathBuf>,

    /// Chess position to analyse (defaults to the initial position)
    #[clap(long)]
    fen: Option<String>,

    /// beginner, casual, club, expert or grandmaster
    #[clap(long)]
    level: Option<String>,
}

fn build_config(args: &Args) -> arena::Result<ArenaConfig> {
    let mut config = match &args.config {
        Some(path) => ArenaConfig::load(path)?,
        None => ArenaConfig::default(),
    };
    if let Some(d) = &args.difficulty {
        config.difficulty = d.parse::<Difficulty>()?;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(ms) = args.think_ms {
        config.think_delay_ms = ms;
    }
    if args.store.is_some() {
        config.store_path = args.store.clone();
    }
    if args.human_second {
        config.human_plays_first = false;
    }
    if args.no_jitter {
        config.randomized = false;
    }
    if args.engine.is_some() {
        config.chess.engine_path = args.engine.clone();
    }
    if let Some(level) = &args.level {
        config.chess.level = level.parse::<ChessLevel>()?;
    }
    Ok(config)
}

fn paint(kind: GameKind, token: char) -> String {
    let s = token.to_string();
    match (kind, token) {
        (GameKind::TicTacToe, 'X') | (GameKind::Checkers, 'r' | 'R') => s.red().bold().to_string(),
        (GameKind::TicTacToe, 'O') | (GameKind::Checkers, 'b' | 'B') => s.blue().bold().to_string(),
        (GameKind::Reversi, 'B') => s.black().on_white().to_string(),
        (GameKind::Reversi, 'W') => s.white().bold().to_string(),
        (_, '.') => s.dimmed().to_string(),
        _ => s,
    }
}

fn render(game: &GameWrapper) -> String {
    let kind = game.kind();
    if kind == GameKind::Backgammon {
        return game.to_string();
    }
    game.to_string().chars().map(|c| paint(kind, c)).collect()
}

fn side(controller: &GameController, player: Player) -> String {
    let name = controller.get_player_name(player);
    if controller.seating().is_human(player) {
        format!("{} (you)", name)
    } else {
        format!("{} (computer)", name)
    }
}

fn report_events(controller: &mut GameController) {
    for event in controller.take_events() {
        match event {
            TurnEvent::Rolled { player, dice } => {
                println!("{} rolled {:?}", side(controller, player), dice);
            }
            TurnEvent::Passed { player } => {
                println!("{} cannot move and passes", side(controller, player).yellow());
            }
        }
    }
}

fn report_result(controller: &GameController, result: &MoveResult) {
    match result {
        MoveResult::Success {
            move_made, player, ..
        } => println!("{} played {}", side(controller, *player), move_made.notation().green()),
        MoveResult::Invalid { reason } => println!("{}", reason.to_string().red()),
        MoveResult::GameOver => println!("{}", "The game is over".red()),
    }
}

/// Looks a move up by list index or by notation.
fn select_move(moves: &[MoveWrapper], input: &str) -> Option<MoveWrapper> {
    if let Ok(index) = input.parse::<usize>() {
        if let Some(mv) = moves.get(index) {
            return Some(mv.clone());
        }
    }
    let wanted: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    moves
        .iter()
        .find(|mv| {
            let notation: String = mv.notation().chars().filter(|c| !c.is_whitespace()).collect();
            notation.eq_ignore_ascii_case(&wanted)
        })
        .cloned()
}

fn run_game(controller: &mut GameController) -> arena::Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    println!(
        "{} - you play {}. Type 'help' for commands.",
        controller.kind().display_name().bold(),
        controller.get_player_name(controller.seating().human)
    );

    loop {
        report_events(controller);

        if !controller.is_game_over() && !controller.is_human_turn() {
            println!("{}", "Computer is thinking...".italic());
            for result in controller.play_computer_turn() {
                report_result(controller, &result);
            }
            continue;
        }

        println!();
        println!("{}", render(controller.get_render_state()));

        let moves = controller.get_legal_moves();
        match controller.get_status() {
            GameStatus::Win(p) => println!("{}", format!("{} wins!", side(controller, p)).bold()),
            GameStatus::Draw => println!("{}", "Draw.".bold()),
            GameStatus::InProgress if moves.is_empty() => {
                println!("{}", "No legal moves. Type 'pass' to continue.".yellow());
            }
            GameStatus::InProgress => {
                let listing: Vec<String> = moves
                    .iter()
                    .enumerate()
                    .map(|(i, mv)| format!("{}: {}", i, mv.notation()))
                    .collect();
                println!("Your moves: {}", listing.join("  "));
            }
        }

        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        match line.trim() {
            "" => continue,
            "q" | "quit" | "exit" => break,
            "new" => controller.new_game(),
            "history" => println!("{}", controller.format_history()),
            "pass" => {
                if !controller.advance_forced() {
                    println!("{}", "You have a legal move; passing is not allowed.".red());
                }
            }
            "help" => println!("Enter a move index or notation, or: new, history, pass, quit"),
            input if controller.is_game_over() => {
                println!("The game is over ('{}' ignored). Type 'new' or 'quit'.", input);
            }
            input => match select_move(&moves, input) {
                Some(mv) => {
                    let result = controller.try_make_move(mv);
                    report_result(controller, &result);
                }
                None => println!("{}", format!("No legal move matches '{}'", input).red()),
            },
        }
    }
    Ok(())
}

fn run_chess(args: &Args, config: &ArenaConfig) -> arena::Result<()> {
    let path = config
        .chess
        .engine_path
        .clone()
        .ok_or(ArenaError::EngineUnavailable)?;
    let fen = match &args.fen {
        Some(text) => Fen::parse(text)?,
        None => Fen::startpos(),
    };
    let level = config.chess.level;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let answer = runtime.block_on(async {
        let mut engine = ProcessEngine::start(&path).await;
        let answer = engine.request_move(&fen, level).await;
        engine.shutdown().await;
        answer
    });

    match answer {
        Some(mv) => println!("{}", mv),
        None => println!("{}", "Engine gave no move".yellow()),
    }
    Ok(())
}

fn main() -> arena::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;

    if args.game.eq_ignore_ascii_case("chess") {
        return run_chess(&args, &config);
    }

    let kind: GameKind = args.game.parse()?;
    let store = Arc::new(match &config.store_path {
        Some(path) => GameStore::open(path),
        None => GameStore::in_memory(),
    });
    let seed = config.seed_or_clock();
    info!(game = %kind, difficulty = %config.difficulty, seed, store = ?store.path(), "starting");

    let ai = ComputerPlayer::new(config.difficulty, seed, config.randomized);
    let seating = Seating {
        human: if config.human_plays_first {
            Player::First
        } else {
            Player::Second
        },
    };
    let mut controller =
        GameController::load(kind, store, ai, seating).with_think_delay(config.think_delay());
    run_game(&mut controller)
}
