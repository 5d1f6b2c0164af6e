//! # Game Implementations Module
//!
//! Rules for every game the arena plays. The locally modeled games implement
//! [`crate::GameState`] and [`crate::Evaluate`] so the search engines and the
//! controller can drive them through one interface.
//!
//! ## Supported Games
//! - **Tic-Tac-Toe**: 3x3 grid, searched to the end
//! - **Checkers**: 8x8 draughts with mandatory multi-jump captures and kings
//! - **Reversi**: 8x8 disc-flipping game with forced passes
//! - **Backgammon**: dice race with hitting, entering from the bar and bearing off
//! - **Go**: not modeled here; [`go`] defines the boundary to an external rules
//!   library plus the heuristic player and scoring built on it
//!
//! ## Adding New Games
//! To add a new game, create a new module and implement:
//! 1. A move type with `Display` for the terminal front end
//! 2. A state type implementing `GameState`, `Evaluate` and `Restorable`
//! 3. A variant in [`crate::game_wrapper::GameWrapper`] and its `GameKind`

pub mod backgammon;
pub mod checkers;
pub mod go;
pub mod reversi;
pub mod tictactoe;
