//! Three-level spaced repetition schedule
//!
//! Correct answers climb the ladder and lengthen the interval; any
//! incorrect answer drops the item back to Level One with the shortest
//! interval:
//!
//! | current | correct | new level | interval (days) |
//! |---------|---------|-----------|-----------------|
//! | One     | true    | Two       | 3               |
//! | Two     | true    | Three     | 7               |
//! | Three   | true    | Three     | 14              |
//! | any     | false   | One       | 1               |
//!
//! Level Three is a steady state, not an exit: mastered items keep coming
//! back every two weeks.
//!
//! A persisted level outside 1..=3 is corruption; a review of such a row
//! lands at (One, 1 day) whatever the outcome, and the event is logged.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Coarse mastery rank driving the review interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Level {
    /// New or struggling
    One,
    /// Consolidating
    Two,
    /// Mastered
    Three,
}

impl Level {
    /// Numeric rank as persisted (1..=3).
    pub fn rank(self) -> i64 {
        match self {
            Level::One => 1,
            Level::Two => 2,
            Level::Three => 3,
        }
    }

    /// Decode a persisted rank, or `None` if it is outside 1..=3.
    pub fn checked_from_rank(rank: i64) -> Option<Level> {
        match rank {
            1 => Some(Level::One),
            2 => Some(Level::Two),
            3 => Some(Level::Three),
            _ => None,
        }
    }

    /// Decode a persisted rank for display paths. Anything outside 1..=3 is
    /// treated as corruption: normalized to Level One and logged so
    /// operators can see it happening.
    pub fn from_rank(rank: i64) -> Level {
        Level::checked_from_rank(rank).unwrap_or_else(|| {
            log::warn!("Normalizing out-of-range mastery level {} to 1", rank);
            Level::One
        })
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> u8 {
        level.rank() as u8
    }
}

impl TryFrom<u8> for Level {
    type Error = String;

    fn try_from(rank: u8) -> Result<Level, String> {
        match rank {
            1..=3 => Ok(Level::from_rank(rank as i64)),
            other => Err(format!("Mastery level out of range: {}", other)),
        }
    }
}

/// Result of applying one review outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub level: Level,
    pub interval_days: i64,
}

/// Compute the next level and review interval for one outcome.
pub fn next(level: Level, correct: bool) -> Transition {
    if !correct {
        // Any miss resets to the shortest interval
        return Transition {
            level: Level::One,
            interval_days: 1,
        };
    }

    match level {
        Level::One => Transition {
            level: Level::Two,
            interval_days: 3,
        },
        Level::Two => Transition {
            level: Level::Three,
            interval_days: 7,
        },
        Level::Three => Transition {
            level: Level::Three,
            interval_days: 14,
        },
    }
}

/// Compute the transition straight from a persisted rank. An out-of-range
/// rank lands at (One, 1 day) regardless of the outcome — a corrupt row is
/// rescheduled at the shortest interval, not credited with a climb.
pub fn next_from_rank(rank: i64, correct: bool) -> Transition {
    match Level::checked_from_rank(rank) {
        Some(level) => next(level, correct),
        None => {
            log::warn!("Resetting out-of-range mastery level {} to 1", rank);
            Transition {
                level: Level::One,
                interval_days: 1,
            }
        }
    }
}

/// Due date for a freshly created item: one short interval out.
pub fn initial_due(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::days(1)
}

impl Transition {
    /// Due date implied by this transition, counted from `now`.
    pub fn due_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::days(self.interval_days)
    }
}
