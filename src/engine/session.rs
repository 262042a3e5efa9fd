//! Session state machine and per-playthrough counters
//!
//! `NotStarted -> Running <-> Paused`, `Running|Paused -> Ended`, and any state
//! back to `NotStarted` through a reset. Illegal transitions are ignored and
//! reported as `false`; interactive input is forgiving.

use serde::{Deserialize, Serialize};

use super::entity::World;
use super::game::Game;
use super::input::InputState;
use super::rng::SimRng;
use super::step;

/// Lifecycle phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionPhase {
    #[default]
    NotStarted,
    Running,
    Paused,
    Ended,
}

/// How a finished run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Won,
    Lost,
    /// Head-to-head games: the winning player (1-based)
    Winner(u8),
}

/// Terminal result recorded when a session ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub verdict: Verdict,
    pub score: u64,
}

/// Scoring counters for one playthrough
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Stats {
    /// Non-decreasing within a session
    pub score: u64,
    pub lives: u32,
    /// 1-based level / wave
    pub level: u32,
    /// Simulation ticks advanced while running
    pub ticks: u64,
    /// Seconds of running time
    pub elapsed: f32,
}

/// One playthrough: the game's rule state, its entities, counters and phase
pub struct Session<G: Game> {
    pub game: G,
    pub world: World<G::Kind>,
    pub stats: Stats,
    pub(crate) rng: SimRng,
    phase: SessionPhase,
    outcome: Option<Outcome>,
}

impl<G: Game> Session<G> {
    /// Create a fresh session in `NotStarted`
    pub fn new(mut game: G, seed: u64) -> Self {
        let mut rng = SimRng::new(seed);
        let mut world = World::new();
        game.setup(&mut world, &mut rng);
        let stats = Stats {
            lives: game.initial_lives(),
            level: 1,
            ..Default::default()
        };
        Self {
            game,
            world,
            stats,
            rng,
            phase: SessionPhase::NotStarted,
            outcome: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    /// NotStarted -> Running
    pub fn start(&mut self) -> bool {
        if self.phase != SessionPhase::NotStarted {
            return false;
        }
        self.phase = SessionPhase::Running;
        log::info!("{}: session started", self.game.name());
        true
    }

    /// Running -> Paused
    pub fn pause(&mut self) -> bool {
        if self.phase != SessionPhase::Running {
            return false;
        }
        self.phase = SessionPhase::Paused;
        log::info!("{}: paused", self.game.name());
        true
    }

    /// Paused -> Running
    pub fn resume(&mut self) -> bool {
        if self.phase != SessionPhase::Paused {
            return false;
        }
        self.phase = SessionPhase::Running;
        log::info!("{}: resumed", self.game.name());
        true
    }

    /// Running <-> Paused; ignored elsewhere
    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            SessionPhase::Running => self.pause(),
            SessionPhase::Paused => self.resume(),
            _ => false,
        }
    }

    /// Running|Paused -> Ended with a terminal outcome
    pub fn end(&mut self, verdict: Verdict) -> bool {
        if !matches!(self.phase, SessionPhase::Running | SessionPhase::Paused) {
            return false;
        }
        let outcome = Outcome {
            verdict,
            score: self.stats.score,
        };
        self.phase = SessionPhase::Ended;
        self.outcome = Some(outcome);
        log::info!(
            "{}: ended {:?} with score {} at level {}",
            self.game.name(),
            verdict,
            outcome.score,
            self.stats.level
        );
        true
    }

    /// Any state -> NotStarted with a wholesale replacement session
    pub fn reset(&mut self, game: G, seed: u64) {
        log::info!("{}: reset (seed {})", game.name(), seed);
        *self = Session::new(game, seed);
    }

    /// Advance one tick if running. Returns true when the tick ran.
    pub fn tick(&mut self, input: &InputState, dt: f32) -> bool {
        if self.phase != SessionPhase::Running {
            return false;
        }
        if let Some(verdict) = step::advance(self, input, dt) {
            self.end(verdict);
        }
        true
    }
}
