//! Arena configuration
//!
//! Optional TOML file. Every field has a default, so an empty file is valid.
//! Command-line flags override whatever the file sets.
//!
//! ```toml
//! difficulty = "hard"
//! seed = 7
//! think_delay_ms = 250
//! store_path = "arena-state.json"
//! randomized = true
//! human_plays_first = true
//!
//! [chess]
//! engine_path = "/usr/bin/stockfish"
//! level = "club"
//! ```

use crate::chess::ChessLevel;
use crate::error::Result;
use crate::search::Difficulty;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub difficulty: Difficulty,
    /// Fixed seed for dice and greedy choices; drawn from the clock if unset.
    pub seed: Option<u64>,
    pub think_delay_ms: u64,
    pub store_path: Option<PathBuf>,
    /// Jitter and exploration in greedy move choice.
    pub randomized: bool,
    pub human_plays_first: bool,
    pub chess: ChessConfig,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChessConfig {
    pub engine_path: Option<PathBuf>,
    pub level: ChessLevel,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        ArenaConfig {
            difficulty: Difficulty::Medium,
            seed: None,
            think_delay_ms: 500,
            store_path: None,
            randomized: true,
            human_plays_first: true,
            chess: ChessConfig::default(),
        }
    }
}

impl ArenaConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn think_delay(&self) -> Duration {
        Duration::from_millis(self.think_delay_ms)
    }

    pub fn seed_or_clock(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(ArenaConfig::parse("").unwrap(), ArenaConfig::default());
    }

    #[test]
    fn test_parse_full_file() {
        let config = ArenaConfig::parse(
            r#"
            difficulty = "hard"
            seed = 7
            think_delay_ms = 0
            randomized = false

            [chess]
            engine_path = "/usr/bin/stockfish"
            level = "grandmaster"
            "#,
        )
        .unwrap();
        assert_eq!(config.difficulty, Difficulty::Hard);
        assert_eq!(config.seed_or_clock(), 7);
        assert_eq!(config.think_delay(), Duration::ZERO);
        assert!(!config.randomized);
        assert!(config.human_plays_first);
        assert_eq!(config.chess.level, ChessLevel::Grandmaster);
        assert_eq!(config.chess.engine_path, Some(PathBuf::from("/usr/bin/stockfish")));
    }

    #[test]
    fn test_unknown_difficulty_rejected() {
        assert!(ArenaConfig::parse("difficulty = \"brutal\"").is_err());
    }
}
