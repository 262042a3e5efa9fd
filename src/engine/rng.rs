//! Seedable random source
//!
//! Every random draw in a session (spawn positions, launch angles, shuffles,
//! AI jitter) goes through the session's `SimRng`, so a seed plus an input
//! trace reproduces a run exactly.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    /// Number of draws taken so far
    pub draws: u64,
}

/// Deterministic random source for one session
#[derive(Debug, Clone)]
pub struct SimRng {
    state: RngState,
    rng: Pcg32,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self {
            state: RngState { seed, draws: 0 },
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Rebuild from a saved state by replaying the draw count
    pub fn from_state(state: &RngState) -> Self {
        let mut rng = Self::new(state.seed);
        for _ in 0..state.draws {
            rng.next_f32();
        }
        rng
    }

    pub fn state(&self) -> &RngState {
        &self.state
    }

    pub fn seed(&self) -> u64 {
        self.state.seed
    }

    /// Uniform in [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        self.state.draws += 1;
        self.rng.random::<f32>()
    }

    /// Uniform in [lo, hi)
    pub fn range_f32(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }

    /// Uniform integer in [0, n). Returns 0 when n is 0.
    pub fn index(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        ((self.next_f32() * n as f32) as usize).min(n - 1)
    }

    /// True with the given probability
    pub fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }

    /// +1.0 or -1.0 with equal odds
    pub fn sign(&mut self) -> f32 {
        if self.next_f32() > 0.5 { 1.0 } else { -1.0 }
    }

    /// Fisher-Yates shuffle
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.index(i + 1);
            items.swap(i, j);
        }
    }
}
