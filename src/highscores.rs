//! Best-score / best-time records
//!
//! One numeric best per (game, difficulty) key, held by a `KeyValueStore`.
//! The engine only computes the candidate and the comparison; the store does
//! the keeping.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::persistence::KeyValueStore;

/// Which direction counts as an improvement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BestOrder {
    /// Scores
    HigherIsBetter,
    /// Elapsed times
    LowerIsBetter,
}

impl BestOrder {
    /// Strict improvement of `candidate` over `stored`
    pub fn beats(self, candidate: f64, stored: f64) -> bool {
        match self {
            BestOrder::HigherIsBetter => candidate > stored,
            BestOrder::LowerIsBetter => candidate < stored,
        }
    }
}

/// Stored best for a key; `None` means "no best yet"
pub fn load_best(store: &dyn KeyValueStore, key: &str) -> Option<f64> {
    store.get_number(key)
}

/// Offer a candidate; store it if it strictly beats the current best.
///
/// Returns whether the stored value changed.
pub fn record(store: &mut dyn KeyValueStore, key: &str, order: BestOrder, candidate: f64) -> Result<bool> {
    let improved = match load_best(store, key) {
        Some(stored) => order.beats(candidate, stored),
        None => true,
    };
    if improved {
        store.set_number(key, candidate)?;
        log::info!("New best for {key}: {candidate}");
    }
    Ok(improved)
}

/// Format whole seconds as m:ss
pub fn format_time(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Best-time display with the "no best yet" placeholder
pub fn format_best_time(best: Option<f64>) -> String {
    match best {
        Some(s) => format_time(s.max(0.0) as u64),
        None => "--:--".to_string(),
    }
}
