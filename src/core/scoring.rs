//! Scoring module - line-clear points, leveling, and the gravity curve
//!
//! Level is a pure function of total lines (`1 + lines / 10`). Line clears
//! pay `base * level` where the level is the one computed *after* the
//! cleared lines are counted. Score and lines only ever grow, short of an
//! explicit reset.

use serde::{Deserialize, Serialize};

use crate::types::{BASE_DROP_MS, DROP_DECAY_PER_LEVEL_MS, MIN_DROP_MS};

/// Base points per simultaneous clear count (index = lines cleared)
pub const LINE_CLEAR_SCORES: [u32; 5] = [0, 100, 300, 500, 800];

/// Points per row descended
pub const SOFT_DROP_POINTS: u32 = 1;
pub const HARD_DROP_POINTS: u32 = 2;

/// Score, level, and total line count for one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreState {
    score: u32,
    lines: u32,
}

impl ScoreState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    /// Level starts at 1 and advances every 10 lines
    pub fn level(&self) -> u32 {
        1 + self.lines / 10
    }

    /// Account for a simultaneous clear of `cleared` rows.
    ///
    /// The multiplier uses the post-clear level. Returns the points added.
    pub fn apply_line_clear(&mut self, cleared: usize) -> u32 {
        if cleared == 0 {
            return 0;
        }
        self.lines += cleared as u32;
        let base = LINE_CLEAR_SCORES.get(cleared).copied().unwrap_or(0);
        let points = base * self.level();
        self.score += points;
        points
    }

    /// Award descent points (1 per row soft, 2 per row hard)
    pub fn add_drop_points(&mut self, rows: u32, hard: bool) {
        let per_row = if hard {
            HARD_DROP_POINTS
        } else {
            SOFT_DROP_POINTS
        };
        self.score += rows * per_row;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Gravity interval for a level: linear decay from 1000ms, floored at 50ms
pub fn drop_interval_ms(level: u32) -> u64 {
    BASE_DROP_MS
        .saturating_sub(u64::from(level.saturating_sub(1)) * DROP_DECAY_PER_LEVEL_MS)
        .max(MIN_DROP_MS)
}
