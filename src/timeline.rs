//! Score events and the game clock.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

pub const QUARTERS: u8 = 4;
pub const QUARTER_SECONDS: u32 = 12 * 60;
pub const GAME_SECONDS: u32 = QUARTERS as u32 * QUARTER_SECONDS;

/// Parsed scores above this are rejected as malformed.
pub const MAX_SCORE: u32 = 999;

/// A single observed scoreboard state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEvent {
    pub elapsed: u32,
    pub home: u32,
    pub away: u32,
    pub quarter: u8,
    pub play: Option<String>,
}
impl ScoreEvent {
    pub fn new(elapsed: u32, home: u32, away: u32) -> Self {
        Self {
            elapsed,
            home,
            away,
            quarter: quarter_of(elapsed),
            play: None,
        }
    }

    pub fn with_play(mut self, play: impl Into<String>) -> Self {
        self.play = Some(play.into());
        self
    }

    pub fn with_quarter(mut self, quarter: u8) -> Self {
        self.quarter = quarter;
        self
    }

    #[inline]
    pub fn total(&self) -> u32 {
        self.home.saturating_add(self.away)
    }

    #[inline]
    pub fn remaining(&self) -> u32 {
        GAME_SECONDS.saturating_sub(self.elapsed)
    }

    /// Fraction of regulation time elapsed, in `[0, 1]`.
    #[inline]
    pub fn progress(&self) -> f64 {
        self.elapsed as f64 / GAME_SECONDS as f64
    }

    #[inline]
    pub fn same_score(&self, other: &ScoreEvent) -> bool {
        self.home == other.home && self.away == other.away
    }
}

/// The quarter that contains the given elapsed time; the final buzzer belongs to the 4th.
pub fn quarter_of(elapsed: u32) -> u8 {
    u8::min((elapsed / QUARTER_SECONDS) as u8 + 1, QUARTERS)
}

/// Renders elapsed seconds as `M:SS`.
pub struct GameClock(pub u32);

impl Display for GameClock {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{:02}", self.0 / 60, self.0 % 60)
    }
}
