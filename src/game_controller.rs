//! # Game Controller Module - Central Game State Management
//!
//! `GameController` is the single owner of the authoritative game state. Human
//! moves are validated against the move generator before they are applied;
//! computer moves come from [`ComputerPlayer`] searching a clone.
//!
//! The controller also drives the parts of a turn nobody chooses:
//! - rolling the dice at the start of a backgammon turn
//! - ending a backgammon turn when the remaining dice are blocked
//! - passing in reversi when the side to move has no legal placement
//!
//! Every change is saved to the injected [`GameStore`] and flushed.

use crate::ai::ComputerPlayer;
use crate::game_wrapper::{GameKind, GameWrapper, MoveWrapper};
use crate::store::GameStore;
use crate::{GameState, Outcome, Player};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Upper bound on automatic transitions resolved in one go. Backgammon can
/// bounce between two blocked sides; the rest is picked up on the next call.
const MAX_FORCED_STEPS: usize = 16;

/// Result of attempting to apply a move
#[derive(Debug, Clone)]
pub enum MoveResult {
    /// Move was successfully applied
    Success {
        move_made: MoveWrapper,
        player: Player,
        game_over: bool,
        /// Winner if game is over (None for draw)
        winner: Option<Player>,
    },
    /// Move was rejected as invalid
    Invalid { reason: MoveValidationError },
    /// Game is already over, no more moves allowed
    GameOver,
}

impl MoveResult {
    pub fn is_invalid(&self) -> bool {
        matches!(self, MoveResult::Invalid { .. })
    }
}

/// Errors that can occur during move validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveValidationError {
    #[error("Illegal move")]
    IllegalMove,
    #[error("Move type doesn't match game")]
    MismatchedGameType,
    #[error("Game is already over")]
    GameAlreadyOver,
    #[error("It is not your turn")]
    NotYourTurn,
}

/// Something the controller did on a player's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEvent {
    Rolled { player: Player, dice: Vec<u8> },
    Passed { player: Player },
}

/// A single entry in the move history
#[derive(Debug, Clone)]
pub struct MoveHistoryEntry {
    pub player: Player,
    pub move_made: MoveWrapper,
    /// Move number (1-indexed)
    pub move_number: usize,
}

impl MoveHistoryEntry {
    pub fn new(player: Player, move_made: MoveWrapper, move_number: usize) -> Self {
        Self {
            player,
            move_made,
            move_number,
        }
    }
}

/// Current game status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Win(Player),
    Draw,
}

impl GameStatus {
    pub fn is_game_over(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

impl From<Outcome> for GameStatus {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::InProgress => GameStatus::InProgress,
            Outcome::Win(p) => GameStatus::Win(p),
            Outcome::Draw => GameStatus::Draw,
        }
    }
}

/// Which side the human plays; the computer plays the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seating {
    pub human: Player,
}

impl Default for Seating {
    fn default() -> Self {
        Seating {
            human: Player::First,
        }
    }
}

impl Seating {
    pub fn is_human(&self, player: Player) -> bool {
        player == self.human
    }
}

/// The central game controller that owns the authoritative game state
///
/// # Usage
/// ```rust,ignore
/// let store = Arc::new(GameStore::open("arena-state.json"));
/// let ai = ComputerPlayer::new(Difficulty::Medium, seed, true);
/// let mut controller = GameController::load(GameKind::Reversi, store, ai, Seating::default());
///
/// match controller.try_make_move(mv) {
///     MoveResult::Success { game_over, .. } => { /* applied */ }
///     MoveResult::Invalid { reason } => { /* rejected */ }
///     MoveResult::GameOver => {}
/// }
/// controller.play_computer_turn();
/// ```
#[derive(Debug)]
pub struct GameController {
    game_state: GameWrapper,
    move_history: Vec<MoveHistoryEntry>,
    status: GameStatus,
    seating: Seating,
    ai: ComputerPlayer,
    store: Arc<GameStore>,
    think_delay: Duration,
    events: Vec<TurnEvent>,
}

impl GameController {
    /// Takes ownership of `initial_state` and resolves any forced transition
    /// (such as the opening backgammon roll).
    pub fn new(
        initial_state: GameWrapper,
        store: Arc<GameStore>,
        ai: ComputerPlayer,
        seating: Seating,
    ) -> Self {
        let mut controller = Self {
            status: initial_state.outcome().into(),
            game_state: initial_state,
            move_history: Vec::new(),
            seating,
            ai,
            store,
            think_delay: Duration::ZERO,
            events: Vec::new(),
        };
        controller.resolve_forced();
        controller.persist();
        controller
    }

    /// Resumes `kind` from the store, or starts a fresh game if there is no
    /// usable snapshot.
    pub fn load(kind: GameKind, store: Arc<GameStore>, ai: ComputerPlayer, seating: Seating) -> Self {
        let state = match store.restore::<GameWrapper>(kind.id()) {
            Some(state) if state.kind() == kind => {
                info!(game = %kind, "resumed saved game");
                state
            }
            Some(other) => {
                warn!(game = %kind, found = %other.kind(), "snapshot holds another game, starting fresh");
                kind.initial_state()
            }
            None => kind.initial_state(),
        };
        Self::new(state, store, ai, seating)
    }

    /// Pause before each computer move.
    pub fn with_think_delay(mut self, delay: Duration) -> Self {
        self.think_delay = delay;
        self
    }

    pub fn kind(&self) -> GameKind {
        self.game_state.kind()
    }

    pub fn seating(&self) -> Seating {
        self.seating
    }

    pub fn is_human_turn(&self) -> bool {
        !self.is_game_over() && self.seating.is_human(self.get_current_player())
    }

    /// Validate a move without applying it
    pub fn validate_move(&self, mv: &MoveWrapper) -> Result<(), MoveValidationError> {
        if self.status.is_game_over() {
            return Err(MoveValidationError::GameAlreadyOver);
        }
        if mv.kind() != self.kind() {
            return Err(MoveValidationError::MismatchedGameType);
        }
        if !self.game_state.is_legal(mv) {
            return Err(MoveValidationError::IllegalMove);
        }
        Ok(())
    }

    /// Applies a human move after checking the seat and the move generator.
    pub fn try_make_move(&mut self, mv: MoveWrapper) -> MoveResult {
        if self.status.is_game_over() {
            return MoveResult::GameOver;
        }
        if let Err(reason) = self.validate_move(&mv) {
            return MoveResult::Invalid { reason };
        }
        if !self.is_human_turn() {
            return MoveResult::Invalid {
                reason: MoveValidationError::NotYourTurn,
            };
        }
        self.apply(mv)
    }

    /// Lets the computer make one move if it is its turn.
    pub fn computer_move(&mut self) -> Option<MoveResult> {
        if self.is_game_over() || self.seating.is_human(self.get_current_player()) {
            return None;
        }
        if !self.think_delay.is_zero() {
            std::thread::sleep(self.think_delay);
        }
        match self.ai.choose_move(&self.game_state) {
            Some(mv) => Some(self.apply(mv)),
            None => {
                debug!(game = %self.kind(), "computer has no move");
                self.advance_forced();
                None
            }
        }
    }

    /// Plays computer moves until it is the human's turn or the game ends.
    /// A backgammon turn can take up to four moves.
    pub fn play_computer_turn(&mut self) -> Vec<MoveResult> {
        let mut results = Vec::new();
        for _ in 0..MAX_FORCED_STEPS {
            match self.computer_move() {
                Some(result) => results.push(result),
                None => break,
            }
        }
        results
    }

    fn apply(&mut self, mv: MoveWrapper) -> MoveResult {
        let player = self.game_state.get_current_player();
        let move_number = self.move_history.len() + 1;

        self.game_state = self.game_state.apply_move(&mv);
        self.move_history
            .push(MoveHistoryEntry::new(player, mv.clone(), move_number));
        debug!(game = %self.kind(), %player, mv = %mv, "move applied");

        self.resolve_forced();
        self.persist();

        let game_over = self.status.is_game_over();
        let winner = self.get_winner();
        if game_over {
            info!(game = %self.kind(), ?winner, "game over");
        }
        MoveResult::Success {
            move_made: mv,
            player,
            game_over,
            winner,
        }
    }

    /// Resumes rolls and passes cut short by the step cap. Returns false when
    /// the side to move already has a legal move.
    pub fn advance_forced(&mut self) -> bool {
        if self.is_game_over() || !self.game_state.get_possible_moves().is_empty() {
            return false;
        }
        self.resolve_forced();
        self.persist();
        true
    }

    /// Rolls dice and passes for the side to move until someone has a choice.
    fn resolve_forced(&mut self) {
        for _ in 0..MAX_FORCED_STEPS {
            if self.game_state.is_terminal() {
                break;
            }
            let player = self.game_state.get_current_player();

            let rolled = match &self.game_state {
                GameWrapper::Backgammon(bg) if bg.needs_roll() => {
                    let dice = self.ai.roll_dice();
                    Some((GameWrapper::Backgammon(bg.with_roll(dice.clone())), dice))
                }
                _ => None,
            };
            if let Some((next, dice)) = rolled {
                debug!(%player, ?dice, "dice rolled");
                self.game_state = next;
                self.events.push(TurnEvent::Rolled { player, dice });
                continue;
            }

            if !self.game_state.get_possible_moves().is_empty() {
                break;
            }
            debug!(game = %self.kind(), %player, "no legal move, passing");
            self.game_state = self.game_state.pass_turn();
            self.events.push(TurnEvent::Passed { player });
        }
        self.status = self.game_state.outcome().into();
    }

    fn persist(&self) {
        let id = self.kind().id();
        if let Err(e) = self.store.save(id, &self.game_state) {
            warn!(game = id, error = %e, "could not snapshot game");
            return;
        }
        if let Err(e) = self.store.flush() {
            warn!(game = id, error = %e, "could not flush store");
        }
    }

    /// Drains the transitions made since the last call.
    pub fn take_events(&mut self) -> Vec<TurnEvent> {
        std::mem::take(&mut self.events)
    }

    /// Get a reference to the game state for rendering
    pub fn get_render_state(&self) -> &GameWrapper {
        &self.game_state
    }

    pub fn get_current_player(&self) -> Player {
        self.game_state.get_current_player()
    }

    pub fn get_status(&self) -> GameStatus {
        self.status
    }

    pub fn is_game_over(&self) -> bool {
        self.status.is_game_over()
    }

    pub fn get_winner(&self) -> Option<Player> {
        match self.status {
            GameStatus::Win(w) => Some(w),
            _ => None,
        }
    }

    pub fn get_move_history(&self) -> &[MoveHistoryEntry] {
        &self.move_history
    }

    pub fn move_count(&self) -> usize {
        self.move_history.len()
    }

    /// Get legal moves for the current player
    pub fn get_legal_moves(&self) -> Vec<MoveWrapper> {
        if self.status.is_game_over() {
            Vec::new()
        } else {
            self.game_state.get_possible_moves()
        }
    }

    /// Discards the current game, including its saved snapshot, and starts over.
    pub fn new_game(&mut self) {
        let kind = self.kind();
        self.store.clear(kind.id());
        self.game_state = kind.initial_state();
        self.move_history.clear();
        self.events.clear();
        self.status = GameStatus::InProgress;
        self.resolve_forced();
        self.persist();
        info!(game = %kind, "new game");
    }

    /// Move history as plain text.
    pub fn format_history(&self) -> String {
        if self.move_history.is_empty() {
            return String::from("No moves made yet.");
        }

        let mut output = format!("=== {} Game History ===\n\n", self.kind().display_name());

        for entry in &self.move_history {
            output.push_str(&format!(
                "{}. {} - {}\n",
                entry.move_number,
                self.get_player_name(entry.player),
                entry.move_made
            ));
        }

        match self.status {
            GameStatus::Win(winner) => {
                output.push_str(&format!("\nResult: {} wins!\n", self.get_player_name(winner)));
            }
            GameStatus::Draw => {
                output.push_str("\nResult: Draw\n");
            }
            GameStatus::InProgress => {
                output.push_str(&format!(
                    "\n(Game in progress - {} to move)\n",
                    self.get_player_name(self.get_current_player())
                ));
            }
        }

        output
    }

    /// Human-readable side name, e.g. "Black".
    pub fn get_player_name(&self, player: Player) -> &'static str {
        self.kind().side_name(player)
    }
}
