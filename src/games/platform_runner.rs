//! Platform Runner: three hand-built levels of jumping, stomping and coins
//!
//! The player runs its own physics (gravity, double jump, platform
//! resolution) in the force phase; enemies and coins are ordinary contacts.

use std::collections::BTreeMap;

use glam::Vec2;

use crate::engine::{
    Aabb, Action, Contact, Effect, Entity, EntityId, Game, InputState, Progress, Shape, SimRng, Spawn, Stats,
    StepContext, Verdict, World, shapes_overlap,
};
use crate::engine::collision::rects_overlap;
use crate::render::{Color, DrawList};
use crate::ui::HudField;

pub mod consts {
    pub const WIDTH: f32 = 800.0;
    pub const HEIGHT: f32 = 600.0;
    pub const GRAVITY: f32 = 0.6;
    /// Extra gravity share while holding down in the air
    pub const FAST_FALL: f32 = 0.8;
    pub const JUMP_VELOCITY: f32 = -14.0;
    /// Bounce after a stomp, as a share of a full jump
    pub const STOMP_BOUNCE: f32 = 0.6;
    /// How far into the enemy's top a falling player may sink and still stomp
    pub const STOMP_TOLERANCE: f32 = 5.0;
    pub const PLAYER_SPEED: f32 = 5.0;
    pub const PLAYER_SIZE: f32 = 30.0;
    pub const SPAWN_POINT: (f32, f32) = (50.0, 100.0);

    pub const PLATFORM_SPEED: f32 = 2.0;
    pub const PLATFORM_RANGE: f32 = 100.0;
    pub const ENEMY_SIZE: f32 = 25.0;
    pub const ENEMY_SPEED: f32 = 1.5;
    /// Look-ahead before an enemy turns at a platform edge
    pub const EDGE_MARGIN: f32 = 5.0;
    pub const COIN_SIZE: f32 = 15.0;

    pub const STOMP_POINTS: u64 = 50;
    pub const COIN_POINTS: u64 = 10;
    /// Reaching x > GOAL_X with y < GOAL_Y completes the level
    pub const GOAL_X: f32 = WIDTH - 100.0;
    pub const GOAL_Y: f32 = 100.0;
    pub const LAST_LEVEL: u32 = 3;
    pub const LIVES: u32 = 3;
}

use consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Player,
    Platform,
    MovingPlatform,
    Enemy,
    Coin,
}

impl Kind {
    fn is_platform(self) -> bool {
        matches!(self, Kind::Platform | Kind::MovingPlatform)
    }
}

/// Static description of one level
pub struct Layout {
    /// x, y, width, height, moving
    pub platforms: &'static [(f32, f32, f32, f32, bool)],
    /// x, y, patrol range
    pub enemies: &'static [(f32, f32, f32)],
    pub coins: &'static [(f32, f32)],
}

pub const LEVELS: [Layout; 3] = [
    Layout {
        platforms: &[
            (0.0, 550.0, WIDTH, 50.0, false),
            (200.0, 450.0, 150.0, 20.0, false),
            (450.0, 350.0, 150.0, 20.0, false),
            (150.0, 250.0, 120.0, 20.0, false),
            (400.0, 150.0, 150.0, 20.0, false),
            (650.0, 100.0, 100.0, 20.0, false),
        ],
        enemies: &[(220.0, 425.0, 100.0), (460.0, 325.0, 80.0)],
        coins: &[(280.0, 410.0), (520.0, 310.0), (200.0, 210.0), (470.0, 110.0), (700.0, 60.0)],
    },
    Layout {
        platforms: &[
            (0.0, 550.0, 200.0, 50.0, false),
            (600.0, 550.0, 200.0, 50.0, false),
            (200.0, 450.0, 100.0, 20.0, true),
            (400.0, 350.0, 100.0, 20.0, true),
            (200.0, 250.0, 100.0, 20.0, true),
            (550.0, 200.0, 120.0, 20.0, false),
            (100.0, 150.0, 120.0, 20.0, false),
            (650.0, 80.0, 100.0, 20.0, false),
        ],
        enemies: &[(50.0, 525.0, 120.0), (620.0, 525.0, 140.0), (560.0, 175.0, 90.0)],
        coins: &[(250.0, 410.0), (450.0, 310.0), (250.0, 210.0), (600.0, 160.0), (700.0, 40.0)],
    },
    Layout {
        platforms: &[
            (0.0, 550.0, 150.0, 50.0, false),
            (650.0, 550.0, 150.0, 50.0, false),
            (200.0, 500.0, 80.0, 20.0, false),
            (300.0, 450.0, 80.0, 20.0, false),
            (400.0, 400.0, 80.0, 20.0, false),
            (500.0, 350.0, 80.0, 20.0, false),
            (150.0, 300.0, 100.0, 20.0, true),
            (450.0, 200.0, 100.0, 20.0, true),
            (100.0, 100.0, 100.0, 20.0, false),
            (600.0, 50.0, 150.0, 20.0, false),
        ],
        enemies: &[(20.0, 525.0, 100.0), (670.0, 525.0, 100.0), (210.0, 475.0, 50.0), (420.0, 375.0, 40.0)],
        coins: &[
            (240.0, 460.0),
            (340.0, 410.0),
            (440.0, 360.0),
            (200.0, 260.0),
            (500.0, 160.0),
            (150.0, 60.0),
            (675.0, 10.0),
        ],
    },
];

/// Back-and-forth motion around a start x
#[derive(Debug, Clone, Copy, PartialEq)]
struct Patrol {
    start_x: f32,
    range: f32,
    /// Signed horizontal speed
    speed: f32,
}

impl Patrol {
    fn out_of_range(&self, x: f32) -> bool {
        x > self.start_x + self.range || x < self.start_x - self.range
    }
}

#[derive(Debug, Clone)]
pub struct PlatformRunner {
    lives: u32,
    patrols: BTreeMap<EntityId, Patrol>,
    on_ground: bool,
    can_double_jump: bool,
    facing: f32,
    fast_fall: bool,
    coins_total: usize,
    coins_taken: usize,
    /// Level finished, waiting for the continue press
    intermission: bool,
    advance: bool,
    /// A life was already lost this tick
    hurt: bool,
}

impl Default for PlatformRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformRunner {
    pub fn new() -> Self {
        Self::with_lives(LIVES)
    }

    pub fn with_lives(lives: u32) -> Self {
        Self {
            lives,
            patrols: BTreeMap::new(),
            on_ground: false,
            can_double_jump: true,
            facing: 1.0,
            fast_fall: false,
            coins_total: 0,
            coins_taken: 0,
            intermission: false,
            advance: false,
            hurt: false,
        }
    }

    pub fn on_ground(&self) -> bool {
        self.on_ground
    }

    pub fn in_intermission(&self) -> bool {
        self.intermission
    }

    pub fn coins(&self) -> (usize, usize) {
        (self.coins_taken, self.coins_total)
    }

    fn load_level(&mut self, world: &mut World<Kind>, level: u32) {
        world.clear();
        self.patrols.clear();
        self.intermission = false;
        self.advance = false;

        let index = (level.clamp(1, LAST_LEVEL) - 1) as usize;
        let layout = &LEVELS[index];
        for &(x, y, w, h, moving) in layout.platforms {
            let kind = if moving { Kind::MovingPlatform } else { Kind::Platform };
            let id = world.spawn_now(Spawn::new(kind, Vec2::new(x, y), Shape::rect(w, h)));
            if moving {
                self.patrols.insert(
                    id,
                    Patrol {
                        start_x: x,
                        range: PLATFORM_RANGE,
                        speed: PLATFORM_SPEED,
                    },
                );
            }
        }
        for &(x, y, range) in layout.enemies {
            let id = world.spawn_now(Spawn::new(Kind::Enemy, Vec2::new(x, y), Shape::rect(ENEMY_SIZE, ENEMY_SIZE)));
            self.patrols.insert(
                id,
                Patrol {
                    start_x: x,
                    range,
                    speed: ENEMY_SPEED,
                },
            );
        }
        for &(x, y) in layout.coins {
            world.spawn_now(Spawn::new(Kind::Coin, Vec2::new(x, y), Shape::rect(COIN_SIZE, COIN_SIZE)));
        }
        self.coins_total = layout.coins.len();
        self.coins_taken = 0;

        world.spawn_now(Spawn::new(
            Kind::Player,
            Vec2::new(SPAWN_POINT.0, SPAWN_POINT.1),
            Shape::rect(PLAYER_SIZE, PLAYER_SIZE),
        ));
    }

    fn respawn(world: &mut World<Kind>) {
        if let Some(player) = world.first_mut(Kind::Player) {
            player.pos = Vec2::new(SPAWN_POINT.0, SPAWN_POINT.1);
            player.vel = Vec2::ZERO;
        }
    }

    fn hurt(&mut self, ctx: &mut StepContext) {
        if !self.hurt {
            self.hurt = true;
            ctx.lose_life();
        }
    }

    /// Gravity, movement and platform resolution in platform list order
    fn move_player(&mut self, world: &mut World<Kind>) -> Option<Vec2> {
        let platforms: Vec<Aabb> = world.live().filter(|e| e.kind.is_platform()).map(Aabb::of).collect();
        let player = world.first_mut(Kind::Player)?;

        player.vel.y += GRAVITY;
        if self.fast_fall && !self.on_ground {
            player.vel.y += GRAVITY * FAST_FALL;
        }
        player.pos += player.vel;

        self.on_ground = false;
        for p in &platforms {
            if !rects_overlap(&Aabb::of(player), p) {
                continue;
            }
            let vel = player.vel;
            if vel.y > 0.0 && player.pos.y + PLAYER_SIZE - vel.y <= p.y {
                player.pos.y = p.y - PLAYER_SIZE;
                player.vel.y = 0.0;
                self.on_ground = true;
                self.can_double_jump = true;
            } else if vel.y < 0.0 && player.pos.y - vel.y >= p.bottom() {
                player.pos.y = p.bottom();
                player.vel.y = 0.0;
            } else if vel.x > 0.0 {
                player.pos.x = p.x - PLAYER_SIZE;
            } else if vel.x < 0.0 {
                player.pos.x = p.right();
            }
        }
        player.pos.x = player.pos.x.clamp(0.0, WIDTH - PLAYER_SIZE);
        Some(player.pos)
    }

    fn move_platforms(&mut self, world: &mut World<Kind>) {
        for platform in world.by_kind_mut(Kind::MovingPlatform) {
            if let Some(patrol) = self.patrols.get_mut(&platform.id) {
                platform.pos.x += patrol.speed;
                if patrol.out_of_range(platform.pos.x) {
                    patrol.speed = -patrol.speed;
                }
            }
        }
    }

    /// Enemies walk their range and turn back before stepping off a platform
    fn move_enemies(&mut self, world: &mut World<Kind>) {
        let platforms: Vec<Aabb> = world.live().filter(|e| e.kind.is_platform()).map(Aabb::of).collect();
        for enemy in world.by_kind_mut(Kind::Enemy) {
            let Some(patrol) = self.patrols.get_mut(&enemy.id) else {
                continue;
            };
            enemy.pos.x += patrol.speed;
            let (x, feet) = (enemy.pos.x, enemy.pos.y + ENEMY_SIZE);
            let near_edge = platforms.iter().any(|p| {
                let standing = x + ENEMY_SIZE > p.x && x < p.right() && feet >= p.y - 2.0 && feet <= p.y + 10.0;
                standing
                    && ((patrol.speed < 0.0 && x - EDGE_MARGIN < p.x)
                        || (patrol.speed > 0.0 && x + ENEMY_SIZE + EDGE_MARGIN > p.right()))
            });
            if near_edge || patrol.out_of_range(x) {
                patrol.speed = -patrol.speed;
            }
        }
    }

    fn player_and_other<'w>(contact: &Contact<Kind>, world: &'w World<Kind>) -> Option<(&'w Entity<Kind>, EntityId, Kind)> {
        let (player, other) = contact.oriented(Kind::Player)?;
        let other_kind = if contact.a == other { contact.a_kind } else { contact.b_kind };
        Some((world.get(player)?, other, other_kind))
    }
}

impl Game for PlatformRunner {
    type Kind = Kind;

    fn name(&self) -> &'static str {
        "platform-runner"
    }

    fn initial_lives(&self) -> u32 {
        self.lives
    }

    fn setup(&mut self, world: &mut World<Kind>, _rng: &mut SimRng) {
        self.load_level(world, 1);
    }

    fn apply_input(&mut self, world: &mut World<Kind>, input: &InputState, _ctx: &mut StepContext) {
        self.hurt = false;
        if self.intermission {
            if input.was_pressed(Action::Primary) {
                self.advance = true;
            }
            return;
        }
        let Some(player) = world.first_mut(Kind::Player) else {
            return;
        };
        player.vel.x = if input.is_held(Action::Left) {
            self.facing = -1.0;
            -PLAYER_SPEED
        } else if input.is_held(Action::Right) {
            self.facing = 1.0;
            PLAYER_SPEED
        } else {
            0.0
        };
        if input.was_pressed(Action::Primary) || input.was_pressed(Action::Up) {
            if self.on_ground {
                player.vel.y = JUMP_VELOCITY;
                self.on_ground = false;
            } else if self.can_double_jump {
                player.vel.y = JUMP_VELOCITY;
                self.can_double_jump = false;
            }
        }
        self.fast_fall = input.is_held(Action::Down);
    }

    fn apply_forces(&mut self, world: &mut World<Kind>, ctx: &mut StepContext) {
        if self.intermission {
            return;
        }
        if let Some(pos) = self.move_player(world) {
            if pos.y > HEIGHT {
                self.hurt(ctx);
            }
        }
        self.move_platforms(world);
        self.move_enemies(world);
    }

    fn interacts(&self, a: Kind, b: Kind) -> bool {
        let pair = |x: Kind, y: Kind| x == Kind::Player && matches!(y, Kind::Enemy | Kind::Coin);
        pair(a, b) || pair(b, a)
    }

    fn touching(&self, a: &Entity<Kind>, b: &Entity<Kind>) -> bool {
        shapes_overlap(a, b)
    }

    fn resolve(&mut self, contact: &Contact<Kind>, world: &World<Kind>, ctx: &mut StepContext) {
        let Some((player, other, kind)) = Self::player_and_other(contact, world) else {
            return;
        };
        match kind {
            Kind::Coin => {
                ctx.emit(Effect::Kill(other));
                ctx.add_score(COIN_POINTS);
                self.coins_taken += 1;
            }
            Kind::Enemy => {
                let Some(enemy) = world.get(other) else {
                    return;
                };
                let falling = player.vel.y > 0.0;
                let from_above = player.pos.y + PLAYER_SIZE - player.vel.y <= enemy.pos.y + STOMP_TOLERANCE;
                if falling && from_above {
                    ctx.emit(Effect::Kill(other));
                    ctx.add_score(STOMP_POINTS);
                    ctx.emit(Effect::SetVelocity {
                        id: player.id,
                        vel: Vec2::new(player.vel.x, JUMP_VELOCITY * STOMP_BOUNCE),
                    });
                } else {
                    self.hurt(ctx);
                }
            }
            _ => {}
        }
    }

    fn after_collisions(&mut self, world: &mut World<Kind>, ctx: &mut StepContext) {
        if self.intermission || self.hurt {
            return;
        }
        let Some(player) = world.first(Kind::Player) else {
            return;
        };
        if player.pos.x > GOAL_X && player.pos.y < GOAL_Y {
            if ctx.stats.level >= LAST_LEVEL {
                ctx.end(Verdict::Won);
            } else {
                log::info!("platform-runner: level {} complete", ctx.stats.level);
                self.intermission = true;
            }
        }
    }

    fn on_life_lost(&mut self, world: &mut World<Kind>, _ctx: &mut StepContext) {
        Self::respawn(world);
    }

    fn evaluate(&mut self, _world: &World<Kind>, _ctx: &StepContext) -> Progress {
        if self.advance {
            Progress::NextLevel
        } else {
            Progress::Continue
        }
    }

    fn next_level(&mut self, world: &mut World<Kind>, ctx: &mut StepContext) {
        self.load_level(world, ctx.stats.level);
    }

    fn hud(&self, _world: &World<Kind>, stats: &Stats) -> Vec<HudField> {
        vec![
            HudField::new("level", stats.level),
            HudField::new("score", stats.score),
            HudField::new("coins", format!("{}/{}", self.coins_taken, self.coins_total)),
            HudField::new("lives", "\u{2764}\u{fe0f}".repeat(stats.lives as usize)),
            HudField::new("level-score", stats.score),
        ]
    }

    fn draw(&self, world: &World<Kind>, out: &mut DrawList) {
        out.clear(Color::hex(0x1A0A2E));
        out.rect(Vec2::new(GOAL_X, 0.0), Vec2::new(WIDTH - GOAL_X, GOAL_Y), Color::hex(0xFFBE0B).with_alpha(0.2));
        out.text(Vec2::new(WIDTH - 75.0, 50.0), "GOAL", Color::hex(0xFFBE0B));
        for e in world.live() {
            let size = Vec2::new(e.width(), e.height());
            match e.kind {
                Kind::Platform => out.rect(e.pos, size, Color::hex(0x06FFA5)),
                Kind::MovingPlatform => out.rect(e.pos, size, Color::hex(0xFF006E)),
                Kind::Coin => out.circle(e.center(), COIN_SIZE / 2.0, Color::hex(0xFFBE0B)),
                Kind::Enemy => {
                    out.rect(e.pos, size, Color::hex(0xFF006E));
                    out.rect(e.pos + Vec2::new(5.0, 8.0), Vec2::splat(4.0), Color::WHITE);
                    out.rect(e.pos + Vec2::new(ENEMY_SIZE - 9.0, 8.0), Vec2::splat(4.0), Color::WHITE);
                }
                Kind::Player => {
                    out.rect(e.pos, size, Color::hex(0x3A86FF));
                    let eye = if self.facing > 0.0 { PLAYER_SIZE * 0.6 } else { PLAYER_SIZE * 0.2 };
                    out.rect(e.pos + Vec2::new(eye, PLAYER_SIZE * 0.3), Vec2::splat(6.0), Color::WHITE);
                }
            }
        }
    }

    /// Run right and hop regularly; continue through intermissions
    fn autopilot(&self, _world: &World<Kind>, stats: &Stats) -> InputState {
        if self.intermission {
            return InputState::press(Action::Primary);
        }
        let mut input = InputState::holding(&[Action::Right]);
        if stats.ticks % 40 == 0 {
            input.pressed.insert(Action::Primary);
        }
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Session, SessionPhase};

    const DT: f32 = 1.0 / 60.0;

    fn running() -> Session<PlatformRunner> {
        let mut s = Session::new(PlatformRunner::new(), 5);
        s.start();
        s
    }

    fn idle(s: &mut Session<PlatformRunner>, ticks: usize) {
        for _ in 0..ticks {
            s.tick(&InputState::default(), DT);
        }
    }

    fn place_player(s: &mut Session<PlatformRunner>, pos: Vec2, vel: Vec2) {
        let p = s.world.first_mut(Kind::Player).unwrap();
        p.pos = pos;
        p.vel = vel;
    }

    fn player(s: &Session<PlatformRunner>) -> &Entity<Kind> {
        s.world.first(Kind::Player).unwrap()
    }

    fn platform_count(s: &Session<PlatformRunner>) -> usize {
        s.world.count(Kind::Platform) + s.world.count(Kind::MovingPlatform)
    }

    #[test]
    fn first_level_layout() {
        let s = Session::new(PlatformRunner::new(), 1);
        assert_eq!(platform_count(&s), 6);
        assert_eq!(s.world.count(Kind::Enemy), 2);
        assert_eq!(s.world.count(Kind::Coin), 5);
        assert_eq!(player(&s).pos, Vec2::new(50.0, 100.0));
        assert_eq!(s.game.coins(), (0, 5));
    }

    #[test]
    fn falls_onto_ground() {
        let mut s = running();
        idle(&mut s, 120);
        assert_eq!(player(&s).pos.y, 550.0 - PLAYER_SIZE);
        assert!(s.game.on_ground());
    }

    #[test]
    fn double_jump_then_no_more() {
        let mut s = running();
        idle(&mut s, 120);
        s.tick(&InputState::press(Action::Primary), DT);
        assert_eq!(player(&s).vel.y, JUMP_VELOCITY + GRAVITY);
        idle(&mut s, 5);
        s.tick(&InputState::press(Action::Primary), DT);
        assert_eq!(player(&s).vel.y, JUMP_VELOCITY + GRAVITY);
        idle(&mut s, 5);
        let before = player(&s).vel.y;
        s.tick(&InputState::press(Action::Primary), DT);
        assert_eq!(player(&s).vel.y, before + GRAVITY);
    }

    #[test]
    fn up_jumps_like_primary() {
        let mut s = running();
        idle(&mut s, 120);
        s.tick(&InputState::press(Action::Up), DT);
        assert_eq!(player(&s).vel.y, JUMP_VELOCITY + GRAVITY);
    }

    #[test]
    fn fast_fall_adds_gravity() {
        let mut s = running();
        s.tick(&InputState::holding(&[Action::Down]), DT);
        assert!((player(&s).vel.y - GRAVITY * (1.0 + FAST_FALL)).abs() < 1e-5);
    }

    #[test]
    fn collects_coin() {
        let mut s = running();
        place_player(&mut s, Vec2::new(275.0, 400.0), Vec2::ZERO);
        s.tick(&InputState::default(), DT);
        assert_eq!(s.stats.score, COIN_POINTS);
        assert_eq!(s.world.count(Kind::Coin), 4);
        assert_eq!(s.game.coins(), (1, 5));
    }

    #[test]
    fn stomp_defeats_enemy_and_bounces() {
        let mut s = running();
        let enemy = s.world.first(Kind::Enemy).unwrap().pos;
        place_player(&mut s, enemy - Vec2::new(0.0, PLAYER_SIZE + 2.0), Vec2::new(0.0, 4.0));
        s.tick(&InputState::default(), DT);
        assert_eq!(s.stats.score, STOMP_POINTS);
        assert_eq!(s.world.count(Kind::Enemy), 1);
        assert_eq!(player(&s).vel.y, JUMP_VELOCITY * STOMP_BOUNCE);
        assert_eq!(s.stats.lives, 3);
    }

    #[test]
    fn side_contact_costs_life_and_respawns() {
        let mut s = running();
        let enemy = s.world.first(Kind::Enemy).unwrap().pos;
        place_player(&mut s, enemy - Vec2::new(20.0, 0.0), Vec2::ZERO);
        s.tick(&InputState::default(), DT);
        assert_eq!(s.stats.lives, 2);
        assert_eq!(player(&s).pos, Vec2::new(50.0, 100.0));
        assert_eq!(s.world.count(Kind::Enemy), 2);
    }

    #[test]
    fn falling_off_costs_life() {
        let mut s = running();
        place_player(&mut s, Vec2::new(300.0, HEIGHT - 1.0), Vec2::new(0.0, 5.0));
        s.tick(&InputState::default(), DT);
        assert_eq!(s.stats.lives, 2);
        assert_eq!(player(&s).pos, Vec2::new(50.0, 100.0));
    }

    #[test]
    fn last_life_lost_ends() {
        let mut s = Session::new(PlatformRunner::with_lives(1), 5);
        s.start();
        place_player(&mut s, Vec2::new(300.0, HEIGHT - 1.0), Vec2::new(0.0, 5.0));
        s.tick(&InputState::default(), DT);
        assert_eq!(s.outcome().map(|o| o.verdict), Some(Verdict::Lost));
    }

    #[test]
    fn goal_pauses_until_continue() {
        let mut s = running();
        place_player(&mut s, Vec2::new(720.0, 50.0), Vec2::ZERO);
        s.tick(&InputState::default(), DT);
        assert!(s.game.in_intermission());
        assert_eq!(s.stats.level, 1);

        let frozen = s.world.first(Kind::Enemy).unwrap().pos;
        idle(&mut s, 10);
        assert_eq!(s.world.first(Kind::Enemy).unwrap().pos, frozen);

        s.tick(&InputState::press(Action::Primary), DT);
        assert_eq!(s.stats.level, 2);
        assert!(!s.game.in_intermission());
        assert_eq!(platform_count(&s), 8);
        assert_eq!(s.world.count(Kind::MovingPlatform), 3);
        assert_eq!(s.world.count(Kind::Enemy), 3);
        assert_eq!(player(&s).pos, Vec2::new(50.0, 100.0));
    }

    #[test]
    fn finishing_last_level_wins() {
        let mut s = running();
        s.stats.level = LAST_LEVEL;
        place_player(&mut s, Vec2::new(720.0, 50.0), Vec2::ZERO);
        s.tick(&InputState::default(), DT);
        assert_eq!(s.phase(), SessionPhase::Ended);
        assert_eq!(s.outcome().map(|o| o.verdict), Some(Verdict::Won));
    }

    #[test]
    fn enemy_turns_before_platform_edge() {
        let mut s = running();
        let id = s.world.first(Kind::Enemy).unwrap().id;
        let mut max_x: f32 = 0.0;
        idle(&mut s, 200);
        for _ in 0..200 {
            s.tick(&InputState::default(), DT);
            let x = s.world.get(id).unwrap().pos.x;
            max_x = max_x.max(x);
        }
        // Platform spans 200..350; the enemy never walks off it
        assert!(max_x + ENEMY_SIZE <= 350.0);
    }

    #[test]
    fn moving_platform_reverses() {
        let mut game = PlatformRunner::new();
        let mut world = World::new();
        game.load_level(&mut world, 2);
        let id = world.first(Kind::MovingPlatform).unwrap().id;
        let start = world.get(id).unwrap().pos.x;
        let mut seen_max = start;
        for _ in 0..120 {
            game.move_platforms(&mut world);
            seen_max = seen_max.max(world.get(id).unwrap().pos.x);
        }
        assert_eq!(seen_max, start + PLATFORM_RANGE + PLATFORM_SPEED);
        assert!(world.get(id).unwrap().pos.x < seen_max);
    }
}
