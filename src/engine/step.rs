//! The per-tick update step
//!
//! Phases run in a fixed order and each finishes before the next begins:
//!
//! 1. input
//! 2. integrate motion
//! 3. environmental forces
//! 4. contact pass and collision resolution
//! 5. scoring and lifecycle effects
//! 6. terminal conditions
//! 7. purge not-live entities and apply queued spawns

use super::collision::{Effect, find_contacts, reflect_axis};
use super::entity::{EntityKind, World};
use super::game::{Game, Progress, StepContext, Timing};
use super::input::InputState;
use super::session::{Session, Verdict};

/// Advance a running session by one tick.
///
/// Returns a verdict when the tick ended the session. The caller owns the
/// state transition.
pub fn advance<G: Game>(session: &mut Session<G>, input: &InputState, dt: f32) -> Option<Verdict> {
    let time_scale = match session.game.timing() {
        Timing::Fixed { .. } => 1.0,
        Timing::Variable => dt * 60.0,
    };

    let Session {
        game,
        world,
        stats,
        rng,
        ..
    } = session;

    stats.ticks += 1;
    stats.elapsed += dt;

    let mut ctx = StepContext::new(rng, *stats, dt, time_scale);
    let mut verdict = None;

    // 1. Input
    game.apply_input(world, input, &mut ctx);

    // 2. Integrate
    for entity in world.all_mut() {
        if entity.live && game.integrates(entity.kind) {
            entity.pos += entity.vel * time_scale;
        }
    }

    // 3. Forces
    game.apply_forces(world, &mut ctx);

    // Effects emitted by the input and force hooks
    let mut deferred = Vec::new();
    for effect in ctx.effects.drain(..) {
        if effect.is_motion() {
            apply_motion(world, effect);
        } else {
            deferred.push(effect);
        }
    }

    // 4. Collisions: motion effects land in contact order so later contacts
    //    see earlier bounces
    let contacts = find_contacts(world, |a, b| game.interacts(a, b), |a, b| game.touching(a, b));
    for contact in &contacts {
        game.resolve(contact, world, &mut ctx);
        for effect in ctx.effects.drain(..) {
            if effect.is_motion() {
                apply_motion(world, effect);
            } else {
                deferred.push(effect);
            }
        }
    }

    // 5. Scoring and lifecycle
    apply_lifecycle(game, world, &mut ctx, deferred, &mut verdict);

    game.after_collisions(world, &mut ctx);
    let late: Vec<_> = ctx.effects.drain(..).collect();
    apply_lifecycle(game, world, &mut ctx, late, &mut verdict);

    // 6. Terminal conditions
    if verdict.is_none() {
        match game.evaluate(world, &ctx) {
            Progress::Continue => {}
            Progress::NextLevel => {
                ctx.stats.level += 1;
                log::info!("{}: advancing to level {}", game.name(), ctx.stats.level);
                game.next_level(world, &mut ctx);
                let late: Vec<_> = ctx.effects.drain(..).collect();
                apply_lifecycle(game, world, &mut ctx, late, &mut verdict);
            }
            Progress::End(v) => verdict = Some(v),
        }
    }

    // 7. Purge
    world.purge();

    *stats = ctx.stats;
    verdict
}

fn apply_motion<K: EntityKind>(world: &mut World<K>, effect: Effect) {
    match effect {
        Effect::Reflect { id, axis } => {
            if let Some(e) = world.get_mut(id) {
                e.vel = reflect_axis(e.vel, axis);
            }
        }
        Effect::SetVelocity { id, vel } => {
            if let Some(e) = world.get_mut(id) {
                e.vel = vel;
            }
        }
        _ => {}
    }
}

fn apply_lifecycle<G: Game>(
    game: &mut G,
    world: &mut World<G::Kind>,
    ctx: &mut StepContext,
    effects: Vec<Effect>,
    verdict: &mut Option<Verdict>,
) {
    for effect in effects {
        match effect {
            Effect::AddScore(points) => ctx.stats.score += points,
            Effect::Kill(id) => {
                world.kill(id);
            }
            Effect::LoseLife => {
                if verdict.is_some() {
                    continue;
                }
                ctx.stats.lives = ctx.stats.lives.saturating_sub(1);
                if ctx.stats.lives == 0 {
                    *verdict = Some(Verdict::Lost);
                } else {
                    game.on_life_lost(world, ctx);
                    // on_life_lost may itself emit lifecycle effects
                    let nested: Vec<_> = ctx.effects.drain(..).collect();
                    apply_lifecycle(game, world, ctx, nested, verdict);
                }
            }
            Effect::End(v) => {
                if verdict.is_none() {
                    *verdict = Some(v);
                }
            }
            motion => apply_motion(world, motion),
        }
    }
}
