//! Chess clocks.
//!
//! Each side gets its own [`Clock`] built from the match [`TimeControl`].
//! A clock may carry a total budget with an increment, a cap on any single
//! move, both, or neither.

use std::time::Duration;
use thiserror::Error;

/// Returned when a move took longer than the mover was allowed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("move took {elapsed:?}, limit was {limit:?}")]
pub struct TimeForfeit {
    pub elapsed: Duration,
    pub limit: Duration,
}

/// Time limits shared by both sides of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeControl {
    /// Starting budget for the whole game, if any.
    pub total: Option<Duration>,
    /// Time added back after every completed move.
    pub increment: Duration,
    /// Cap on any single move, independent of the budget.
    pub per_move: Option<Duration>,
}

impl TimeControl {
    /// No limits at all.
    pub const UNLIMITED: TimeControl = TimeControl {
        total: None,
        increment: Duration::ZERO,
        per_move: None,
    };

    /// A `minutes` + `increment` budget, as written "5+3".
    pub fn sudden_death(minutes: u64, increment_secs: u64) -> Self {
        TimeControl {
            total: Some(Duration::from_secs(minutes * 60)),
            increment: Duration::from_secs(increment_secs),
            per_move: None,
        }
    }

    /// Returns this control with a per-move cap.
    #[must_use]
    pub fn with_per_move(mut self, cap: Duration) -> Self {
        self.per_move = Some(cap);
        self
    }

    /// Returns true if no limit applies.
    pub fn is_unlimited(&self) -> bool {
        self.total.is_none() && self.per_move.is_none()
    }
}

/// One side's clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clock {
    remaining: Option<Duration>,
    increment: Duration,
    per_move: Option<Duration>,
}

impl Clock {
    pub fn new(control: &TimeControl) -> Self {
        Clock {
            remaining: control.total,
            increment: control.increment,
            per_move: control.per_move,
        }
    }

    /// Time left on the budget, if there is one.
    #[inline]
    pub fn remaining(&self) -> Option<Duration> {
        self.remaining
    }

    /// The most the next move may take: the smaller of the remaining budget
    /// and the per-move cap.
    pub fn limit(&self) -> Option<Duration> {
        match (self.remaining, self.per_move) {
            (Some(remaining), Some(cap)) => Some(remaining.min(cap)),
            (remaining, cap) => remaining.or(cap),
        }
    }

    /// Charges a completed move to the clock.
    ///
    /// On success the elapsed time is taken off the budget and the
    /// increment added. An overrun leaves the clock as it was.
    pub fn charge(&mut self, elapsed: Duration) -> Result<(), TimeForfeit> {
        if let Some(limit) = self.limit() {
            if elapsed > limit {
                return Err(TimeForfeit { elapsed, limit });
            }
        }
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining = remaining.saturating_sub(elapsed) + self.increment;
        }
        Ok(())
    }
}
