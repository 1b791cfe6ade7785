use super::types::MigrationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Apply pending units.
    Up,
    /// Revert migrated units.
    Down,
}

impl Direction {
    /// Negative values mean down, anything else up.
    pub fn from_sign(sign: i64) -> Self {
        if sign < 0 {
            Direction::Down
        } else {
            Direction::Up
        }
    }

    pub fn is_up(&self) -> bool {
        matches!(self, Direction::Up)
    }

    pub fn is_down(&self) -> bool {
        matches!(self, Direction::Down)
    }

    pub fn opposite(&self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl FromStr for Direction {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(MigrationError::InvalidArgument(format!(
                "unknown direction '{}', expected 'up' or 'down'",
                other
            ))),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
