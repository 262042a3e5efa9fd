//! Meteor Dodge: survive a rising meteor storm
//!
//! Everything is a circle positioned by its centre. The speed multiplier grows
//! with the tick count and drives both meteor speed and spawn rate.

use glam::Vec2;

use crate::engine::{
    Action, BestSpec, Contact, Entity, Game, InputState, Shape, SimRng, Spawn, Stats, StepContext, Verdict, World,
    shapes_overlap,
};
use crate::highscores::BestOrder;
use crate::render::{Color, DrawList};
use crate::settings::ControlScheme;
use crate::ui::HudField;

pub mod consts {
    pub const WIDTH: f32 = 800.0;
    pub const HEIGHT: f32 = 600.0;
    pub const PLAYER_RADIUS: f32 = 25.0;
    pub const PLAYER_SPEED: f32 = 5.0;
    /// Fraction of the remaining distance covered per tick when following the pointer
    pub const POINTER_FOLLOW: f32 = 0.15;

    pub const BASE_SPAWN_TICKS: f32 = 60.0;
    pub const MIN_SPAWN_TICKS: f32 = 15.0;
    pub const BASE_METEOR_SPEED: f32 = 2.0;
    pub const METEOR_SPEED_SPREAD: f32 = 2.0;
    pub const METEOR_MIN_RADIUS: f32 = 15.0;
    pub const METEOR_RADIUS_SPREAD: f32 = 15.0;
    /// Sideways drift range, centred on zero
    pub const METEOR_DRIFT: f32 = 4.0;
    /// Meteors appear this far outside the field
    pub const SPAWN_MARGIN: f32 = 30.0;
    /// and count as dodged once this far outside
    pub const EXIT_MARGIN: f32 = 50.0;

    pub const MULTIPLIER_PER_TICK: f32 = 0.001;
    pub const MAX_MULTIPLIER: f32 = 5.0;
    pub const DODGE_POINTS: f32 = 10.0;
    pub const BEST_KEY: &str = "meteorDodgeHighScore";
}

use consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Player,
    Meteor,
}

#[derive(Debug, Clone)]
pub struct MeteorDodge {
    control: ControlScheme,
    /// Last pointer position seen
    target: Vec2,
    since_spawn: u32,
    dodged: u32,
    multiplier: f32,
    crashed: bool,
}

impl MeteorDodge {
    pub fn new(control: ControlScheme) -> Self {
        Self {
            control,
            target: Vec2::new(WIDTH / 2.0, HEIGHT / 2.0),
            since_spawn: 0,
            dodged: 0,
            multiplier: 1.0,
            crashed: false,
        }
    }

    pub fn control(&self) -> ControlScheme {
        self.control
    }

    pub fn dodged(&self) -> u32 {
        self.dodged
    }

    pub fn multiplier(&self) -> f32 {
        self.multiplier
    }

    pub fn multiplier_at(ticks: u64) -> f32 {
        (1.0 + ticks as f32 * MULTIPLIER_PER_TICK).min(MAX_MULTIPLIER)
    }

    pub fn spawn_interval(multiplier: f32) -> f32 {
        (BASE_SPAWN_TICKS / multiplier).max(MIN_SPAWN_TICKS)
    }

    fn spawn_meteor(world: &mut World<Kind>, rng: &mut SimRng) {
        let speed = BASE_METEOR_SPEED + rng.next_f32() * METEOR_SPEED_SPREAD;
        let radius = METEOR_MIN_RADIUS + rng.next_f32() * METEOR_RADIUS_SPREAD;
        let side = rng.index(4);
        let along = rng.next_f32();
        let drift = (rng.next_f32() - 0.5) * METEOR_DRIFT;
        // 0 top, 1 right, 2 bottom, 3 left
        let (pos, vel) = match side {
            0 => (Vec2::new(along * WIDTH, -SPAWN_MARGIN), Vec2::new(drift, speed)),
            1 => (Vec2::new(WIDTH + SPAWN_MARGIN, along * HEIGHT), Vec2::new(-speed, drift)),
            2 => (Vec2::new(along * WIDTH, HEIGHT + SPAWN_MARGIN), Vec2::new(drift, -speed)),
            _ => (Vec2::new(-SPAWN_MARGIN, along * HEIGHT), Vec2::new(speed, drift)),
        };
        world.spawn_now(Spawn::new(Kind::Meteor, pos, Shape::circle(radius)).with_velocity(vel));
    }

    fn outside(pos: Vec2) -> bool {
        pos.x < -EXIT_MARGIN || pos.x > WIDTH + EXIT_MARGIN || pos.y < -EXIT_MARGIN || pos.y > HEIGHT + EXIT_MARGIN
    }

    fn clamp_to_field(pos: Vec2) -> Vec2 {
        pos.clamp(
            Vec2::splat(PLAYER_RADIUS),
            Vec2::new(WIDTH - PLAYER_RADIUS, HEIGHT - PLAYER_RADIUS),
        )
    }
}

impl Game for MeteorDodge {
    type Kind = Kind;

    fn name(&self) -> &'static str {
        "meteor-dodge"
    }

    fn setup(&mut self, world: &mut World<Kind>, _rng: &mut SimRng) {
        world.spawn_now(Spawn::new(
            Kind::Player,
            Vec2::new(WIDTH / 2.0, HEIGHT / 2.0),
            Shape::circle(PLAYER_RADIUS),
        ));
    }

    /// Direction keys switch to keyboard steering, pointer motion back to following
    fn apply_input(&mut self, world: &mut World<Kind>, input: &InputState, ctx: &mut StepContext) {
        const KEYS: [Action; 4] = [Action::Left, Action::Right, Action::Up, Action::Down];
        if KEYS.iter().any(|&a| input.is_active(a)) {
            self.control = ControlScheme::Keyboard;
        }
        if let Some(p) = input.pointer {
            self.target = p;
            self.control = ControlScheme::Pointer;
        }
        self.multiplier = Self::multiplier_at(ctx.stats.ticks);

        let Some(player) = world.first_mut(Kind::Player) else {
            return;
        };
        match self.control {
            ControlScheme::Keyboard => {
                let step = Vec2::new(
                    input.axis(Action::Left, Action::Right),
                    input.axis(Action::Up, Action::Down),
                ) * PLAYER_SPEED;
                player.pos = Self::clamp_to_field(player.pos + step);
            }
            ControlScheme::Pointer => {
                let pos = player.pos + (self.target - player.pos) * POINTER_FOLLOW;
                player.pos = Self::clamp_to_field(pos);
            }
        }
    }

    /// Spawning and meteor motion; both scale with the multiplier
    fn apply_forces(&mut self, world: &mut World<Kind>, ctx: &mut StepContext) {
        self.since_spawn += 1;
        if self.since_spawn as f32 >= Self::spawn_interval(self.multiplier) {
            self.since_spawn = 0;
            Self::spawn_meteor(world, ctx.rng);
        }

        let scale = self.multiplier * ctx.time_scale;
        let mut exited = Vec::new();
        for meteor in world.by_kind_mut(Kind::Meteor) {
            meteor.pos += meteor.vel * scale;
            if Self::outside(meteor.pos) {
                exited.push(meteor.id);
            }
        }
        for id in exited {
            world.kill(id);
            self.dodged += 1;
            ctx.add_score((DODGE_POINTS * self.multiplier).floor() as u64);
        }
    }

    fn interacts(&self, a: Kind, b: Kind) -> bool {
        a != b
    }

    fn touching(&self, a: &Entity<Kind>, b: &Entity<Kind>) -> bool {
        shapes_overlap(a, b)
    }

    fn resolve(&mut self, _contact: &Contact<Kind>, _world: &World<Kind>, ctx: &mut StepContext) {
        self.crashed = true;
        ctx.end(Verdict::Lost);
    }

    fn hud(&self, _world: &World<Kind>, stats: &Stats) -> Vec<HudField> {
        let time = format!("{:.1}s", stats.ticks as f32 / 60.0);
        let mut fields = vec![
            HudField::new("score", stats.score),
            HudField::new("time", &time),
            HudField::new("meteors-dodged", self.dodged),
            HudField::new("speed-mult", format!("{:.1}x", self.multiplier)),
        ];
        if self.crashed {
            fields.push(HudField::new("final-time", time));
        }
        fields
    }

    fn draw(&self, world: &World<Kind>, out: &mut DrawList) {
        out.clear(Color::hex(0x0A0515));
        for e in world.live() {
            let r = e.width() / 2.0;
            match e.kind {
                Kind::Meteor => {
                    out.circle(e.pos, r, Color::hex(0xFF4500));
                    out.circle(e.pos - Vec2::new(r * 0.3, r * 0.2), r * 0.3, Color::hex(0x5A1A00));
                }
                Kind::Player => {
                    out.circle(e.pos, r, Color::hex(0x0088FF));
                    out.rect(e.pos - Vec2::new(4.0, r + 5.0), Vec2::new(8.0, 10.0), Color::hex(0x00FFFF));
                }
            }
        }
    }

    fn best(&self) -> Option<BestSpec> {
        Some(BestSpec {
            key: BEST_KEY.to_string(),
            order: BestOrder::HigherIsBetter,
            live: true,
            element: "high-score",
        })
    }

    /// Steer away from the nearest meteor, drifting back toward the centre
    fn autopilot(&self, world: &World<Kind>, _stats: &Stats) -> InputState {
        let Some(player) = world.first(Kind::Player) else {
            return InputState::default();
        };
        let threat = world
            .by_kind(Kind::Meteor)
            .min_by(|a, b| a.pos.distance(player.pos).total_cmp(&b.pos.distance(player.pos)));
        let centre = Vec2::new(WIDTH / 2.0, HEIGHT / 2.0);
        let away = match threat {
            Some(m) if m.pos.distance(player.pos) < 150.0 => (player.pos - m.pos).normalize_or_zero() * 120.0,
            _ => Vec2::ZERO,
        };
        let mut input = InputState::default();
        input.pointer = Some(player.pos + away + (centre - player.pos) * 0.2);
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Session, SessionPhase};

    const DT: f32 = 1.0 / 60.0;

    fn running(control: ControlScheme) -> Session<MeteorDodge> {
        let mut s = Session::new(MeteorDodge::new(control), 11);
        s.start();
        s
    }

    fn player(s: &Session<MeteorDodge>) -> Vec2 {
        s.world.first(Kind::Player).unwrap().pos
    }

    #[test]
    fn multiplier_ramps_and_caps() {
        assert_eq!(MeteorDodge::multiplier_at(0), 1.0);
        assert!((MeteorDodge::multiplier_at(1000) - 2.0).abs() < 1e-5);
        assert_eq!(MeteorDodge::multiplier_at(100_000), MAX_MULTIPLIER);
    }

    #[test]
    fn spawn_interval_floors() {
        assert_eq!(MeteorDodge::spawn_interval(1.0), 60.0);
        assert_eq!(MeteorDodge::spawn_interval(2.0), 30.0);
        assert_eq!(MeteorDodge::spawn_interval(5.0), 15.0);
    }

    #[test]
    fn first_meteor_within_a_second() {
        let mut s = running(ControlScheme::Keyboard);
        for _ in 0..50 {
            s.tick(&InputState::default(), DT);
        }
        assert_eq!(s.world.count(Kind::Meteor), 0);
        for _ in 0..10 {
            s.tick(&InputState::default(), DT);
        }
        assert_eq!(s.world.count(Kind::Meteor), 1);
        let m = s.world.first(Kind::Meteor).unwrap();
        let r = m.width() / 2.0;
        assert!((METEOR_MIN_RADIUS..=METEOR_MIN_RADIUS + METEOR_RADIUS_SPREAD).contains(&r));
    }

    #[test]
    fn keyboard_moves_and_clamps() {
        let mut s = running(ControlScheme::Keyboard);
        s.tick(&InputState::holding(&[Action::Right]), DT);
        assert_eq!(player(&s), Vec2::new(405.0, 300.0));
        for _ in 0..100 {
            s.tick(&InputState::holding(&[Action::Up]), DT);
        }
        assert_eq!(player(&s).y, PLAYER_RADIUS);
    }

    #[test]
    fn pointer_follows_smoothly() {
        let mut s = running(ControlScheme::Keyboard);
        let mut input = InputState::default();
        input.pointer = Some(Vec2::new(500.0, 300.0));
        s.tick(&input, DT);
        assert_eq!(s.game.control(), ControlScheme::Pointer);
        assert!((player(&s).x - 415.0).abs() < 1e-3);
        // Without a new pointer sample it keeps closing on the last target
        s.tick(&InputState::default(), DT);
        assert!(player(&s).x > 415.0);
    }

    #[test]
    fn leaving_the_field_counts_as_dodged() {
        let mut s = running(ControlScheme::Keyboard);
        s.world.spawn_now(
            Spawn::new(Kind::Meteor, Vec2::new(100.0, -EXIT_MARGIN + 1.0), Shape::circle(15.0))
                .with_velocity(Vec2::new(0.0, -3.0)),
        );
        s.tick(&InputState::default(), DT);
        assert_eq!(s.world.count(Kind::Meteor), 0);
        assert_eq!(s.game.dodged(), 1);
        assert_eq!(s.stats.score, 10);
    }

    #[test]
    fn hit_ends_the_run() {
        let mut s = running(ControlScheme::Keyboard);
        s.world.spawn_now(
            Spawn::new(Kind::Meteor, Vec2::new(400.0, 270.0), Shape::circle(20.0)).with_velocity(Vec2::new(0.0, 2.0)),
        );
        s.tick(&InputState::default(), DT);
        assert_eq!(s.phase(), SessionPhase::Ended);
        assert_eq!(s.outcome().map(|o| o.verdict), Some(Verdict::Lost));
    }

    #[test]
    fn final_time_only_after_a_crash() {
        let final_time = |s: &Session<MeteorDodge>| {
            s.game
                .hud(&s.world, &s.stats)
                .into_iter()
                .find(|f| f.id == "final-time")
                .map(|f| f.value)
        };
        let mut s = running(ControlScheme::Keyboard);
        for _ in 0..30 {
            s.tick(&InputState::default(), DT);
        }
        assert_eq!(final_time(&s), None);

        let player = player(&s);
        s.world.spawn_now(Spawn::new(Kind::Meteor, player, Shape::circle(20.0)));
        s.tick(&InputState::default(), DT);
        assert_eq!(s.phase(), SessionPhase::Ended);
        assert_eq!(final_time(&s).as_deref(), Some("0.5s"));
    }

    #[test]
    fn near_miss_survives() {
        let mut s = running(ControlScheme::Keyboard);
        // 45 apart with radii 25 + 20: touching is not a hit
        s.world.spawn_now(Spawn::new(Kind::Meteor, Vec2::new(400.0, 255.0), Shape::circle(20.0)));
        s.tick(&InputState::default(), DT);
        assert_eq!(s.phase(), SessionPhase::Running);
    }
}
