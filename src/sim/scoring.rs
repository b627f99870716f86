//! Score and combo multiplier
//!
//! Every bounce scores the current combo. Bounces within the combo window of
//! each other grow the combo (up to the cap); a gap resets it.

use serde::{Deserialize, Serialize};

use crate::consts::{COMBO_WINDOW_MS, MAX_COMBO};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreState {
    /// Never decreases within a session
    pub score: u64,
    /// Multiplier in 1..=MAX_COMBO
    pub combo: u32,
    /// Time of the last bounce (ms), `None` before the first one
    pub last_bounce_ms: Option<f64>,
}

impl Default for ScoreState {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreState {
    pub fn new() -> Self {
        Self {
            score: 0,
            combo: 1,
            last_bounce_ms: None,
        }
    }

    fn within_window(&self, now_ms: f64) -> bool {
        self.last_bounce_ms
            .is_some_and(|last| now_ms - last < COMBO_WINDOW_MS)
    }

    /// Register a bounce at `now_ms` and return the combo it scored with
    pub fn on_bounce(&mut self, now_ms: f64) -> u32 {
        self.combo = if self.within_window(now_ms) {
            (self.combo + 1).min(MAX_COMBO)
        } else {
            1
        };
        self.last_bounce_ms = Some(now_ms);
        self.score += u64::from(self.combo);
        self.combo
    }

    /// Drop the combo back to 1 once the window has passed without a bounce.
    /// Returns true if the combo changed. Score is never touched.
    pub fn decay(&mut self, now_ms: f64) -> bool {
        let expired = self
            .last_bounce_ms
            .is_some_and(|last| now_ms - last > COMBO_WINDOW_MS);
        if self.combo > 1 && expired {
            log::debug!("Combo x{} expired", self.combo);
            self.combo = 1;
            true
        } else {
            false
        }
    }

    /// Zero the state, returning the final score if it is worth keeping
    pub fn reset(&mut self) -> Option<u64> {
        let final_score = (self.score > 0).then_some(self.score);
        *self = Self::new();
        final_score
    }
}
