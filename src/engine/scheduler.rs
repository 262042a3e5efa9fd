//! Tick scheduling
//!
//! The host owns real time. The engine only asks for "another tick for this
//! generation in about this long" and, on reset, cancels. Callbacks carry the
//! generation they were scheduled for so a tick that lands after a reset is
//! recognised as stale and dropped.

use serde::{Deserialize, Serialize};

use super::game::Timing;
use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS};

/// Token distinguishing the active scheduling loop from cancelled ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Generation(pub u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

/// Host-side tick scheduler
pub trait Scheduler {
    /// Request a tick for `generation` after `timing` has elapsed
    fn schedule_tick(&mut self, generation: Generation, timing: Timing);
    /// Drop any outstanding request
    fn cancel(&mut self);
}

/// Scheduler that only records requests; tests drive ticks by hand
#[derive(Debug, Default, Clone)]
pub struct ManualScheduler {
    pending: Option<(Generation, Timing)>,
    pub scheduled: u64,
    pub cancelled: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The outstanding request, if any
    pub fn pending(&self) -> Option<(Generation, Timing)> {
        self.pending
    }

    /// Take the outstanding request, as a host would when the timer fires
    pub fn take(&mut self) -> Option<(Generation, Timing)> {
        self.pending.take()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_tick(&mut self, generation: Generation, timing: Timing) {
        self.pending = Some((generation, timing));
        self.scheduled += 1;
    }

    fn cancel(&mut self) {
        self.pending = None;
        self.cancelled += 1;
    }
}

/// Converts host frame timestamps into simulation ticks.
///
/// Fixed-interval games accumulate frame time and emit whole ticks (capped at
/// `MAX_SUBSTEPS` per frame to prevent a spiral of death). Variable-delta
/// games get exactly one tick per frame carrying the clamped frame delta.
#[derive(Debug, Clone, Default)]
pub struct FrameDriver {
    accumulator: f32,
    last_time_ms: Option<f64>,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget timing history (after pause or reset, so the gap is not replayed)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last_time_ms = None;
    }

    /// Feed a frame timestamp; returns the `dt` (seconds) of each tick to run
    pub fn frame(&mut self, now_ms: f64, timing: Timing) -> Vec<f32> {
        let dt = match self.last_time_ms {
            Some(last) => (((now_ms - last) / 1000.0) as f32).clamp(0.0, MAX_FRAME_DT),
            None => 0.0,
        };
        self.last_time_ms = Some(now_ms);

        match timing {
            Timing::Variable => {
                if dt > 0.0 {
                    vec![dt]
                } else {
                    Vec::new()
                }
            }
            Timing::Fixed { interval_ms } => {
                let step = interval_ms / 1000.0;
                if step <= 0.0 {
                    return Vec::new();
                }
                self.accumulator += dt;
                let mut ticks = Vec::new();
                while self.accumulator >= step && (ticks.len() as u32) < MAX_SUBSTEPS {
                    self.accumulator -= step;
                    ticks.push(step);
                }
                if ticks.len() as u32 == MAX_SUBSTEPS {
                    // Drop the backlog rather than replaying it next frame
                    self.accumulator = 0.0;
                }
                ticks
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_scheduler_records_and_cancels() {
        let mut s = ManualScheduler::new();
        s.schedule_tick(Generation(3), Timing::FRAME);
        assert_eq!(s.pending(), Some((Generation(3), Timing::FRAME)));
        s.cancel();
        assert!(s.pending().is_none());
        assert_eq!(s.cancelled, 1);
    }

    #[test]
    fn fixed_timing_accumulates_whole_ticks() {
        let mut driver = FrameDriver::new();
        let timing = Timing::Fixed { interval_ms: 100.0 };
        assert!(driver.frame(0.0, timing).is_empty());
        assert!(driver.frame(50.0, timing).is_empty());
        assert_eq!(driver.frame(120.0, timing).len(), 1);
        // 210 ms gap is clamped to one interval
        assert_eq!(driver.frame(330.0, timing).len(), 1);
    }

    #[test]
    fn long_stall_is_clamped_and_keeps_the_remainder() {
        let mut driver = FrameDriver::new();
        let timing = Timing::Fixed { interval_ms: 60.0 };
        driver.frame(0.0, timing);
        // A second-long stall counts as MAX_FRAME_DT: one 60 ms tick, 40 ms left over
        assert_eq!(driver.frame(1000.0, timing).len(), 1);
        // 30 ms more only reaches a full interval because the 40 ms was kept
        assert_eq!(driver.frame(1030.0, timing).len(), 1);
        assert!(driver.frame(1040.0, timing).is_empty());
    }

    #[test]
    fn substeps_are_capped() {
        let mut driver = FrameDriver::new();
        let timing = Timing::Fixed { interval_ms: 1.0 };
        driver.frame(0.0, timing);
        let ticks = driver.frame(5000.0, timing);
        assert_eq!(ticks.len() as u32, MAX_SUBSTEPS);
    }

    #[test]
    fn variable_timing_is_one_tick_per_frame() {
        let mut driver = FrameDriver::new();
        driver.frame(0.0, Timing::Variable);
        let ticks = driver.frame(16.0, Timing::Variable);
        assert_eq!(ticks.len(), 1);
        assert!((ticks[0] - 0.016).abs() < 1e-6);
    }

    #[test]
    fn generations_increase() {
        let g = Generation::default();
        assert!(g.next() > g);
    }
}
