//! Generic arcade simulation engine
//!
//! Games plug in through the `Game` trait; everything else is shared:
//! - Seeded RNG only
//! - Stable iteration order (insertion order, ids never reused)
//! - Mark-then-purge removal, queued spawns
//! - No drawing backend or platform dependencies

pub mod collision;
pub mod controller;
pub mod entity;
pub mod game;
pub mod input;
pub mod progression;
pub mod rng;
pub mod scheduler;
pub mod session;
pub mod step;

pub use collision::{Aabb, Axis, Contact, Effect, find_contacts, reflect_axis, shapes_overlap};
pub use controller::{Arcade, Controller};
pub use entity::{Entity, EntityId, EntityKind, Shape, Spawn, World};
pub use game::{BestSpec, Game, Progress, StepContext, Timing};
pub use input::{Action, ActionSet, InputState};
pub use progression::{Ramp, SpawnTimer};
pub use rng::{RngState, SimRng};
pub use scheduler::{FrameDriver, Generation, ManualScheduler, Scheduler};
pub use session::{Outcome, Session, SessionPhase, Stats, Verdict};
