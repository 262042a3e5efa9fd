//! Spawn timing and clamped difficulty ramps

use serde::{Deserialize, Serialize};

/// Countdown that fires when it reaches zero and resets on fire
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnTimer {
    remaining: f32,
}

impl SpawnTimer {
    pub fn new(interval: f32) -> Self {
        Self { remaining: interval }
    }

    /// Decrement by `amount`; on reaching zero reset to `interval` and return true
    pub fn tick(&mut self, amount: f32, interval: f32) -> bool {
        self.remaining -= amount;
        if self.remaining <= 0.0 {
            self.remaining = interval;
            true
        } else {
            false
        }
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn reset(&mut self, interval: f32) {
        self.remaining = interval;
    }
}

/// Monotonic value that moves by `step` per stage and stops at `limit`.
///
/// `step` may be negative (shrinking paddles, shorter intervals); the limit is
/// then a floor instead of a ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ramp {
    pub base: f32,
    pub step: f32,
    pub limit: f32,
}

impl Ramp {
    pub const fn new(base: f32, step: f32, limit: f32) -> Self {
        Self { base, step, limit }
    }

    /// Value after `stages` steps, clamped at the limit
    pub fn at(&self, stages: f32) -> f32 {
        let v = self.base + self.step * stages;
        if self.step >= 0.0 {
            v.min(self.limit)
        } else {
            v.max(self.limit)
        }
    }

    /// One step from `current`, clamped at the limit
    pub fn advance(&self, current: f32) -> f32 {
        let v = current + self.step;
        if self.step >= 0.0 {
            v.min(self.limit)
        } else {
            v.max(self.limit)
        }
    }
}
