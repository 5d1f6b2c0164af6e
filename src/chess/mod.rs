//! # Chess Bridge
//!
//! Chess rules and search are delegated to an external UCI engine. This module
//! holds the values exchanged with it:
//! - [`ChessLevel`]: named strength levels mapped to search depth
//! - [`Fen`]: a position, checked for basic shape before it is sent
//! - [`UciMove`]: a move in long algebraic notation (`e2e4`, `e7e8q`)
//!
//! The session itself lives in [`uci`].

pub mod uci;

use crate::error::{ArenaError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Engine strength, expressed as search depth in plies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChessLevel {
    Beginner,
    #[default]
    Casual,
    Club,
    Expert,
    Grandmaster,
}

impl ChessLevel {
    pub fn depth(self) -> u32 {
        match self {
            ChessLevel::Beginner => 1,
            ChessLevel::Casual => 3,
            ChessLevel::Club => 5,
            ChessLevel::Expert => 8,
            ChessLevel::Grandmaster => 12,
        }
    }
}

impl FromStr for ChessLevel {
    type Err = ArenaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(ChessLevel::Beginner),
            "casual" => Ok(ChessLevel::Casual),
            "club" => Ok(ChessLevel::Club),
            "expert" => Ok(ChessLevel::Expert),
            "grandmaster" => Ok(ChessLevel::Grandmaster),
            other => Err(ArenaError::UnknownDifficulty(other.to_string())),
        }
    }
}

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// A FEN position string that has six fields, eight ranks of eight files and a
/// valid side to move. Legality of the position is left to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fen(String);

impl Fen {
    pub fn parse(text: &str) -> Result<Self> {
        let fields: Vec<&str> = text.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(ArenaError::InvalidFen(format!(
                "expected 6 fields, found {}",
                fields.len()
            )));
        }

        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(ArenaError::InvalidFen(format!(
                "expected 8 ranks, found {}",
                ranks.len()
            )));
        }
        for rank in &ranks {
            let mut files = 0u32;
            for c in rank.chars() {
                match c {
                    '1'..='8' => files += c.to_digit(10).unwrap_or(0),
                    'p' | 'n' | 'b' | 'r' | 'q' | 'k' | 'P' | 'N' | 'B' | 'R' | 'Q' | 'K' => {
                        files += 1
                    }
                    _ => return Err(ArenaError::InvalidFen(format!("bad piece '{}'", c))),
                }
            }
            if files != 8 {
                return Err(ArenaError::InvalidFen(format!("rank '{}' is not 8 files", rank)));
            }
        }

        if fields[1] != "w" && fields[1] != "b" {
            return Err(ArenaError::InvalidFen(format!("bad side to move '{}'", fields[1])));
        }

        Ok(Fen(fields.join(" ")))
    }

    pub fn startpos() -> Self {
        Fen(START_FEN.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Fen {
    type Err = ArenaError;

    fn from_str(s: &str) -> Result<Self> {
        Fen::parse(s)
    }
}

impl fmt::Display for Fen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Board square as zero-based file (a = 0) and rank (1 = 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    pub file: u8,
    pub rank: u8,
}

impl Square {
    fn parse(text: &str) -> Option<Square> {
        let bytes = text.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let file = bytes[0].checked_sub(b'a').filter(|f| *f < 8)?;
        let rank = bytes[1].checked_sub(b'1').filter(|r| *r < 8)?;
        Some(Square { file, rank })
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file) as char, self.rank + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UciMove {
    pub from: Square,
    pub to: Square,
    /// Lowercase promotion piece: `q`, `r`, `b` or `n`.
    pub promotion: Option<char>,
}

impl UciMove {
    /// Parses long algebraic notation. The null move (`0000`), `(none)` and
    /// anything malformed yield `None`.
    pub fn parse(text: &str) -> Option<UciMove> {
        let text = text.trim();
        if !text.is_ascii() || (text.len() != 4 && text.len() != 5) {
            return None;
        }
        let from = Square::parse(&text[0..2])?;
        let to = Square::parse(&text[2..4])?;
        let promotion = match text[4..].chars().next() {
            None => None,
            Some(c) => match c.to_ascii_lowercase() {
                p @ ('q' | 'r' | 'b' | 'n') => Some(p),
                _ => return None,
            },
        };
        Some(UciMove {
            from,
            to,
            promotion,
        })
    }
}

impl fmt::Display for UciMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(p) = self.promotion {
            write!(f, "{}", p)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        assert_eq!(ChessLevel::Beginner.depth(), 1);
        assert_eq!(ChessLevel::Grandmaster.depth(), 12);
        assert_eq!("Club".parse::<ChessLevel>().unwrap().depth(), 5);
        assert!("master".parse::<ChessLevel>().is_err());
    }

    #[test]
    fn test_fen_shape() {
        assert!(Fen::parse(START_FEN).is_ok());
        assert!(Fen::parse("8/8/8/8/8/8/8/K6k b - - 12 40").is_ok());
        assert!(Fen::parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -").is_err());
        assert!(Fen::parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1").is_err());
        assert!(Fen::parse("rnbqkbnr/ppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").is_err());
        assert!(Fen::parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1").is_err());
    }

    #[test]
    fn test_parse_moves() {
        let mv = UciMove::parse("e2e4").unwrap();
        assert_eq!(mv.from, Square { file: 4, rank: 1 });
        assert_eq!(mv.to, Square { file: 4, rank: 3 });
        assert_eq!(mv.promotion, None);

        let promo = UciMove::parse("e7e8q").unwrap();
        assert_eq!(promo.promotion, Some('q'));
        assert_eq!(promo.to_string(), "e7e8q");

        assert_eq!(UciMove::parse("(none)"), None);
        assert_eq!(UciMove::parse("0000"), None);
        assert_eq!(UciMove::parse("e7e8k"), None);
        assert_eq!(UciMove::parse("i2i4"), None);
    }
}
