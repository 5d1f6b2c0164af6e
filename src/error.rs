//! Error types for the arena
//!
//! Covers persisted-state restoration, configuration, name parsing and the
//! external chess engine bridge. "No legal moves" is never an error.

use thiserror::Error;

/// Errors that can occur outside of the rules engines
#[derive(Error, Debug)]
pub enum ArenaError {
    /// A persisted state failed structural validation
    #[error("Corrupt state for {game}: {reason}")]
    CorruptState { game: String, reason: String },

    /// Game name not recognised
    #[error("Unknown game: {0}")]
    UnknownGame(String),

    /// Difficulty or level name not recognised
    #[error("Unknown difficulty: {0}")]
    UnknownDifficulty(String),

    /// Malformed FEN position string
    #[error("Invalid FEN: {0}")]
    InvalidFen(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// The chess engine has not completed its handshake
    #[error("Engine not ready")]
    EngineUnavailable,

    /// The chess engine answered with something we could not understand
    #[error("Engine protocol error: {0}")]
    EngineProtocol(String),

    /// The chess engine session has been shut down
    #[error("Engine session closed")]
    EngineClosed,
}

/// Result type alias for arena operations
pub type Result<T> = std::result::Result<T, ArenaError>;
