//! The capability set a game plugs into the engine
//!
//! A game is a data table plus a handful of hooks. The engine owns the loop,
//! the ordering of update phases, the contact pass and the lifecycle; a game
//! only says which kinds move, which pairs interact, what a contact does and
//! when the session is over.

use super::collision::{Contact, Effect, shapes_overlap};
use super::entity::{Entity, EntityKind, World};
use super::input::InputState;
use super::rng::SimRng;
use super::session::{Stats, Verdict};
use crate::highscores::BestOrder;
use crate::render::DrawList;
use crate::ui::HudField;

/// How the scheduler should drive ticks for a game
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timing {
    /// One tick every `interval_ms`; motion is integrated with time scale 1
    Fixed { interval_ms: f32 },
    /// One tick per rendered frame; motion scales with elapsed time
    Variable,
}

impl Timing {
    /// The 60 Hz frame tick most games use
    pub const FRAME: Timing = Timing::Fixed {
        interval_ms: 1000.0 / 60.0,
    };
}

/// Result of evaluating terminal conditions at the end of a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Continue,
    /// Targets cleared: rebuild for the next level, keep running
    NextLevel,
    End(Verdict),
}

/// Best-value bookkeeping for a game
#[derive(Debug, Clone, PartialEq)]
pub struct BestSpec {
    /// Storage key (per game, per difficulty where applicable)
    pub key: String,
    pub order: BestOrder,
    /// Update the stored best the moment it is beaten, not only at run end
    pub live: bool,
    /// UI element that shows the stored best
    pub element: &'static str,
}

/// Mutable view handed to game hooks during one tick
pub struct StepContext<'a> {
    pub rng: &'a mut SimRng,
    /// Counters as of the current phase (the engine folds effects back in)
    pub stats: Stats,
    /// Seconds since the previous tick
    pub dt: f32,
    /// Motion multiplier: 1 for fixed ticks, `dt * 60` for variable ticks
    pub time_scale: f32,
    pub(crate) effects: Vec<Effect>,
}

impl<'a> StepContext<'a> {
    pub fn new(rng: &'a mut SimRng, stats: Stats, dt: f32, time_scale: f32) -> Self {
        Self {
            rng,
            stats,
            dt,
            time_scale,
            effects: Vec::new(),
        }
    }

    /// Queue a resolution effect
    pub fn emit(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub fn add_score(&mut self, points: u64) {
        self.emit(Effect::AddScore(points));
    }

    pub fn lose_life(&mut self) {
        self.emit(Effect::LoseLife);
    }

    pub fn end(&mut self, verdict: Verdict) {
        self.emit(Effect::End(verdict));
    }
}

/// A game rule set driven by the engine's update step.
///
/// Hooks are called in the order of the update phases; see
/// [`crate::engine::step::advance`].
pub trait Game {
    type Kind: EntityKind;

    /// Stable identifier used for logging and storage keys
    fn name(&self) -> &'static str;

    fn timing(&self) -> Timing {
        Timing::FRAME
    }

    /// Starting lives; 0 for games without lives
    fn initial_lives(&self) -> u32 {
        0
    }

    /// Build the initial entities for a fresh session
    fn setup(&mut self, world: &mut World<Self::Kind>, rng: &mut SimRng);

    /// Phase 1: apply input to controllable entities
    fn apply_input(&mut self, _world: &mut World<Self::Kind>, _input: &InputState, _ctx: &mut StepContext) {}

    /// Phase 2: which kinds get `pos += vel * time_scale`
    fn integrates(&self, _kind: Self::Kind) -> bool {
        false
    }

    /// Phase 3: gravity, friction and other environmental forces
    fn apply_forces(&mut self, _world: &mut World<Self::Kind>, _ctx: &mut StepContext) {}

    /// Phase 4 filter: which kind pairs are tested at all
    fn interacts(&self, _a: Self::Kind, _b: Self::Kind) -> bool {
        false
    }

    /// Phase 4 shape test for an interacting pair
    fn touching(&self, a: &Entity<Self::Kind>, b: &Entity<Self::Kind>) -> bool {
        shapes_overlap(a, b)
    }

    /// Phase 4: emit effects for one contact
    fn resolve(&mut self, _contact: &Contact<Self::Kind>, _world: &World<Self::Kind>, _ctx: &mut StepContext) {}

    /// Phase 5: game-owned lifecycle after collision effects (bounds exits, timers, spawns)
    fn after_collisions(&mut self, _world: &mut World<Self::Kind>, _ctx: &mut StepContext) {}

    /// A life was lost and at least one remains
    fn on_life_lost(&mut self, _world: &mut World<Self::Kind>, _ctx: &mut StepContext) {}

    /// Phase 6: terminal conditions
    fn evaluate(&mut self, _world: &World<Self::Kind>, _ctx: &StepContext) -> Progress {
        Progress::Continue
    }

    /// Rebuild for the next level (called after `evaluate` returns `NextLevel`)
    fn next_level(&mut self, _world: &mut World<Self::Kind>, _ctx: &mut StepContext) {}

    /// HUD values pushed to the UI after each state-affecting tick
    fn hud(&self, world: &World<Self::Kind>, stats: &Stats) -> Vec<HudField>;

    /// Read-only render pass
    fn draw(&self, world: &World<Self::Kind>, out: &mut DrawList);

    fn best(&self) -> Option<BestSpec> {
        None
    }

    /// Value offered to the best record; defaults to the score
    fn best_candidate(&self, stats: &Stats, _verdict: Option<Verdict>) -> Option<f64> {
        Some(stats.score as f64)
    }

    /// Demo input for headless runs
    fn autopilot(&self, _world: &World<Self::Kind>, _stats: &Stats) -> InputState {
        InputState::default()
    }
}
