//! # Game Wrapper Module - Unified Game Interface
//!
//! Lets the computer player, the controller and the terminal front end work
//! with any locally modeled game through one type. Each variant keeps its own
//! state and move types; the dispatch macro forwards every trait method to the
//! inner game.
//!
//! Go and chess are not wrapped: their rules live outside this crate (see
//! [`crate::games::go`] and [`crate::chess`]).

use crate::error::{ArenaError, Result};
use crate::games::backgammon::{BackgammonMove, BackgammonState};
use crate::games::checkers::{CheckersMove, CheckersState};
use crate::games::reversi::{ReversiMove, ReversiState};
use crate::games::tictactoe::{TicTacToeMove, TicTacToeState};
use crate::store::Restorable;
use crate::{Evaluate, GameState, Player};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifies a game; also the key its state is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    TicTacToe,
    Checkers,
    Reversi,
    Backgammon,
}

impl GameKind {
    pub const ALL: [GameKind; 4] = [
        GameKind::TicTacToe,
        GameKind::Checkers,
        GameKind::Reversi,
        GameKind::Backgammon,
    ];

    /// Stable identifier used on the command line and as the store key.
    pub fn id(self) -> &'static str {
        match self {
            GameKind::TicTacToe => "tictactoe",
            GameKind::Checkers => "checkers",
            GameKind::Reversi => "reversi",
            GameKind::Backgammon => "backgammon",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            GameKind::TicTacToe => "Tic-Tac-Toe",
            GameKind::Checkers => "Checkers",
            GameKind::Reversi => "Reversi",
            GameKind::Backgammon => "Backgammon",
        }
    }

    /// Name of a side in this game's own vocabulary.
    pub fn side_name(self, player: Player) -> &'static str {
        match (self, player) {
            (GameKind::TicTacToe, Player::First) => "X",
            (GameKind::TicTacToe, Player::Second) => "O",
            (GameKind::Checkers, Player::First) => "Red",
            (GameKind::Checkers, Player::Second) => "Black",
            (GameKind::Reversi, Player::First) => "Black",
            (GameKind::Reversi, Player::Second) => "White",
            (GameKind::Backgammon, Player::First) => "White",
            (GameKind::Backgammon, Player::Second) => "Black",
        }
    }

    pub fn initial_state(self) -> GameWrapper {
        match self {
            GameKind::TicTacToe => GameWrapper::TicTacToe(TicTacToeState::new()),
            GameKind::Checkers => GameWrapper::Checkers(CheckersState::new()),
            GameKind::Reversi => GameWrapper::Reversi(ReversiState::new()),
            GameKind::Backgammon => GameWrapper::Backgammon(BackgammonState::new()),
        }
    }
}

impl FromStr for GameKind {
    type Err = ArenaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tictactoe" | "tic-tac-toe" | "ttt" => Ok(GameKind::TicTacToe),
            "checkers" | "draughts" => Ok(GameKind::Checkers),
            "reversi" | "othello" => Ok(GameKind::Reversi),
            "backgammon" => Ok(GameKind::Backgammon),
            other => Err(ArenaError::UnknownGame(other.to_string())),
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// State of any locally modeled game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "game", content = "state", rename_all = "lowercase")]
pub enum GameWrapper {
    TicTacToe(TicTacToeState),
    Checkers(CheckersState),
    Reversi(ReversiState),
    Backgammon(BackgammonState),
}

/// Move of any locally modeled game.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveWrapper {
    TicTacToe(TicTacToeMove),
    Checkers(CheckersMove),
    Reversi(ReversiMove),
    Backgammon(BackgammonMove),
}

impl MoveWrapper {
    /// The move in its game's own notation, without the game tag.
    pub fn notation(&self) -> String {
        match self {
            MoveWrapper::TicTacToe(m) => m.to_string(),
            MoveWrapper::Checkers(m) => m.to_string(),
            MoveWrapper::Reversi(m) => m.to_string(),
            MoveWrapper::Backgammon(m) => m.to_string(),
        }
    }
}

impl fmt::Display for MoveWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveWrapper::TicTacToe(m) => write!(f, "T({})", m),
            MoveWrapper::Checkers(m) => write!(f, "C({})", m),
            MoveWrapper::Reversi(m) => write!(f, "R({})", m),
            MoveWrapper::Backgammon(m) => write!(f, "BG({})", m),
        }
    }
}

macro_rules! impl_game_dispatch {
    ($($variant:ident),*) => {
        impl GameState for GameWrapper {
            type Move = MoveWrapper;

            fn get_current_player(&self) -> Player {
                match self {
                    $(GameWrapper::$variant(g) => g.get_current_player(),)*
                }
            }

            fn moves_for(&self, player: Player) -> Vec<Self::Move> {
                match self {
                    $(GameWrapper::$variant(g) => g
                        .moves_for(player)
                        .into_iter()
                        .map(MoveWrapper::$variant)
                        .collect(),)*
                }
            }

            /// A move of another game leaves the state unchanged.
            fn apply_move(&self, mv: &Self::Move) -> Self {
                match (self, mv) {
                    $((GameWrapper::$variant(g), MoveWrapper::$variant(m)) => {
                        GameWrapper::$variant(g.apply_move(m))
                    })*
                    _ => self.clone(),
                }
            }

            fn pass_turn(&self) -> Self {
                match self {
                    $(GameWrapper::$variant(g) => GameWrapper::$variant(g.pass_turn()),)*
                }
            }

            fn is_terminal(&self) -> bool {
                match self {
                    $(GameWrapper::$variant(g) => g.is_terminal(),)*
                }
            }

            fn get_winner(&self) -> Option<Player> {
                match self {
                    $(GameWrapper::$variant(g) => g.get_winner(),)*
                }
            }
        }

        impl Evaluate for GameWrapper {
            fn evaluate(&self, perspective: Player) -> f64 {
                match self {
                    $(GameWrapper::$variant(g) => g.evaluate(perspective),)*
                }
            }
        }

        impl Restorable for GameWrapper {
            fn validate(&self) -> Result<()> {
                match self {
                    $(GameWrapper::$variant(g) => g.validate(),)*
                }
            }
        }

        impl fmt::Display for GameWrapper {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $(GameWrapper::$variant(g) => write!(f, "{}", g),)*
                }
            }
        }

        impl GameWrapper {
            pub fn kind(&self) -> GameKind {
                match self {
                    $(GameWrapper::$variant(_) => GameKind::$variant,)*
                }
            }

            /// Checks a move against the generator for the side to move.
            pub fn is_legal(&self, mv: &MoveWrapper) -> bool {
                match (self, mv) {
                    $((GameWrapper::$variant(g), MoveWrapper::$variant(m)) => {
                        g.get_possible_moves().contains(m)
                    })*
                    _ => false,
                }
            }
        }

        impl MoveWrapper {
            pub fn kind(&self) -> GameKind {
                match self {
                    $(MoveWrapper::$variant(_) => GameKind::$variant,)*
                }
            }
        }
    };
}

impl_game_dispatch!(TicTacToe, Checkers, Reversi, Backgammon);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let move_wrapper = MoveWrapper::TicTacToe(TicTacToeMove(4));
        assert_eq!(format!("{}", move_wrapper), "T(4)");
        assert_eq!(move_wrapper.notation(), "4");

        let game_wrapper = GameKind::Reversi.initial_state();
        let _ = format!("{}", game_wrapper);
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in GameKind::ALL {
            assert_eq!(kind.id().parse::<GameKind>().unwrap(), kind);
            assert_eq!(kind.initial_state().kind(), kind);
        }
        assert!("chess".parse::<GameKind>().is_err());
        assert_eq!("Othello".parse::<GameKind>().unwrap(), GameKind::Reversi);
    }

    #[test]
    fn test_mismatched_move_is_illegal() {
        let game = GameKind::Checkers.initial_state();
        let foreign = MoveWrapper::TicTacToe(TicTacToeMove(0));
        assert!(!game.is_legal(&foreign));
        assert_eq!(game.apply_move(&foreign), game);
    }

    #[test]
    fn test_serde_tags_game() {
        let game = GameKind::TicTacToe.initial_state();
        let json = serde_json::to_value(&game).unwrap();
        assert_eq!(json["game"], "tictactoe");
        let back: GameWrapper = serde_json::from_value(json).unwrap();
        assert_eq!(back, game);
    }
}
