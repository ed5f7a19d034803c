use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

//
// ─── CEFR LEVEL ────────────────────────────────────────────────────────────────
//

/// Common European Framework of Reference level, beginner to proficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CefrLevel {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl CefrLevel {
    /// All levels in ascending order.
    pub const ALL: [CefrLevel; 6] = [
        CefrLevel::A1,
        CefrLevel::A2,
        CefrLevel::B1,
        CefrLevel::B2,
        CefrLevel::C1,
        CefrLevel::C2,
    ];

    /// Position of the level in `ALL` (A1 = 0).
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The next level up, or `None` for C2.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    /// The level below, or `None` for A1.
    #[must_use]
    pub fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CefrLevel::A1 => "A1",
            CefrLevel::A2 => "A2",
            CefrLevel::B1 => "B1",
            CefrLevel::B2 => "B2",
            CefrLevel::C1 => "C1",
            CefrLevel::C2 => "C2",
        }
    }
}

impl fmt::Display for CefrLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a CEFR level.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown CEFR level: {raw}")]
pub struct ParseLevelError {
    pub raw: String,
}

impl FromStr for CefrLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|level| level.as_str() == normalized)
            .ok_or_else(|| ParseLevelError { raw: s.to_string() })
    }
}

//
// ─── PLACEMENT ─────────────────────────────────────────────────────────────────
//

/// Outcome of a level test: a CEFR level, or below the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "level", rename_all = "snake_case")]
pub enum Placement {
    BelowA1,
    Level(CefrLevel),
}

impl Placement {
    #[must_use]
    pub fn level(self) -> Option<CefrLevel> {
        match self {
            Placement::BelowA1 => None,
            Placement::Level(level) => Some(level),
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placement::BelowA1 => f.write_str("below A1"),
            Placement::Level(level) => level.fmt(f),
        }
    }
}
