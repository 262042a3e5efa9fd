//! Pong against a CPU paddle, first to five
//!
//! Balls are 15px squares positioned by their top-left corner. Hard
//! difficulty plays three balls at once; a new serve comes half a second
//! after the last ball leaves the field.

use glam::Vec2;

use crate::engine::{
    Action, Contact, Effect, Game, InputState, Shape, SimRng, Spawn, SpawnTimer, Stats, StepContext, Verdict, World,
};
use crate::render::{Color, DrawList};
use crate::settings::Difficulty;
use crate::ui::HudField;

pub mod consts {
    pub const WIDTH: f32 = 800.0;
    pub const HEIGHT: f32 = 600.0;
    pub const PADDLE_WIDTH: f32 = 15.0;
    pub const PADDLE_HEIGHT: f32 = 100.0;
    pub const PADDLE_MARGIN: f32 = 30.0;
    pub const PLAYER_SPEED: f32 = 6.0;
    pub const BALL_SIZE: f32 = 15.0;
    pub const WINNING_SCORE: u32 = 5;
    /// Horizontal speed multiplier on every paddle contact (sign flips too)
    pub const PADDLE_BOOST: f32 = 1.05;
    /// Vertical speed range set by where the ball meets the paddle
    pub const SPIN: f32 = 10.0;
    /// CPU ignores offsets smaller than this
    pub const CPU_DEAD_ZONE: f32 = 10.0;
    /// Serve delay after the field empties (500 ms at 60 Hz)
    pub const SERVE_DELAY_TICKS: f32 = 30.0;
    pub const BALL_SPACING: f32 = 50.0;
}

use consts::*;

/// Speeds and ball count per difficulty
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PongConfig {
    pub ball_speed: f32,
    pub cpu_speed: f32,
    pub balls: usize,
}

impl PongConfig {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                ball_speed: 3.0,
                cpu_speed: 2.0,
                balls: 1,
            },
            Difficulty::Medium => Self {
                ball_speed: 5.0,
                cpu_speed: 3.5,
                balls: 1,
            },
            Difficulty::Hard => Self {
                ball_speed: 7.0,
                cpu_speed: 5.0,
                balls: 3,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Player,
    Cpu,
    Ball,
}

#[derive(Debug, Clone)]
pub struct Pong {
    config: PongConfig,
    player_score: u32,
    cpu_score: u32,
    serve: Option<SpawnTimer>,
}

impl Pong {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            config: PongConfig::for_difficulty(difficulty),
            player_score: 0,
            cpu_score: 0,
            serve: None,
        }
    }

    pub fn scores(&self) -> (u32, u32) {
        (self.player_score, self.cpu_score)
    }

    fn paddle() -> Shape {
        Shape::rect(PADDLE_WIDTH, PADDLE_HEIGHT)
    }

    fn serve_balls(&self, rng: &mut SimRng) -> Vec<Spawn<Kind>> {
        let speed = self.config.ball_speed;
        (0..self.config.balls)
            .map(|i| {
                let pos = Vec2::new(WIDTH / 2.0, HEIGHT / 2.0 + i as f32 * BALL_SPACING - BALL_SPACING);
                let vx = speed * rng.sign();
                let vy = speed * (rng.next_f32() * 0.5 + 0.5) * rng.sign();
                Spawn::new(Kind::Ball, pos, Shape::rect(BALL_SIZE, BALL_SIZE)).with_velocity(Vec2::new(vx, vy))
            })
            .collect()
    }
}

impl Game for Pong {
    type Kind = Kind;

    fn name(&self) -> &'static str {
        "pong"
    }

    fn setup(&mut self, world: &mut World<Kind>, rng: &mut SimRng) {
        let y = HEIGHT / 2.0 - PADDLE_HEIGHT / 2.0;
        world.spawn_now(Spawn::new(Kind::Player, Vec2::new(PADDLE_MARGIN, y), Self::paddle()));
        world.spawn_now(Spawn::new(
            Kind::Cpu,
            Vec2::new(WIDTH - PADDLE_MARGIN - PADDLE_WIDTH, y),
            Self::paddle(),
        ));
        for ball in self.serve_balls(rng) {
            world.spawn_now(ball);
        }
    }

    fn apply_input(&mut self, world: &mut World<Kind>, input: &InputState, _ctx: &mut StepContext) {
        if let Some(player) = world.first_mut(Kind::Player) {
            let dir = input.axis(Action::Up, Action::Down);
            player.pos.y = (player.pos.y + dir * PLAYER_SPEED).clamp(0.0, HEIGHT - PADDLE_HEIGHT);
        }

        // CPU follows the ball closest to it horizontally
        let Some(cpu_x) = world.first(Kind::Cpu).map(|c| c.pos.x) else {
            return;
        };
        let target = world
            .by_kind(Kind::Ball)
            .min_by(|a, b| (a.pos.x - cpu_x).abs().total_cmp(&(b.pos.x - cpu_x).abs()))
            .map(|b| b.pos.y + BALL_SIZE / 2.0);
        let cpu_speed = self.config.cpu_speed;
        if let (Some(target), Some(cpu)) = (target, world.first_mut(Kind::Cpu)) {
            let center = cpu.pos.y + PADDLE_HEIGHT / 2.0;
            if center < target - CPU_DEAD_ZONE {
                cpu.pos.y += cpu_speed;
            } else if center > target + CPU_DEAD_ZONE {
                cpu.pos.y -= cpu_speed;
            }
            cpu.pos.y = cpu.pos.y.clamp(0.0, HEIGHT - PADDLE_HEIGHT);
        }
    }

    fn integrates(&self, kind: Kind) -> bool {
        kind == Kind::Ball
    }

    /// Top and bottom walls
    fn apply_forces(&mut self, world: &mut World<Kind>, _ctx: &mut StepContext) {
        for ball in world.by_kind_mut(Kind::Ball) {
            if ball.pos.y <= 0.0 || ball.pos.y + BALL_SIZE >= HEIGHT {
                ball.vel.y = -ball.vel.y;
            }
        }
    }

    fn interacts(&self, a: Kind, b: Kind) -> bool {
        (a == Kind::Ball) != (b == Kind::Ball)
    }

    fn resolve(&mut self, contact: &Contact<Kind>, world: &World<Kind>, ctx: &mut StepContext) {
        let Some((ball_id, _)) = contact.oriented(Kind::Ball) else {
            return;
        };
        let Some(ball) = world.get(ball_id) else {
            return;
        };
        // Spin comes from the paddle on the ball's half of the field
        let side = if ball.pos.x < WIDTH / 2.0 { Kind::Player } else { Kind::Cpu };
        let Some(paddle) = world.first(side) else {
            return;
        };
        let hit = (ball.pos.y - paddle.pos.y) / PADDLE_HEIGHT;
        ctx.emit(Effect::SetVelocity {
            id: ball_id,
            vel: Vec2::new(ball.vel.x * -PADDLE_BOOST, (hit - 0.5) * SPIN),
        });
    }

    fn after_collisions(&mut self, world: &mut World<Kind>, ctx: &mut StepContext) {
        if let Some(timer) = self.serve.as_mut() {
            if timer.tick(1.0, SERVE_DELAY_TICKS) {
                self.serve = None;
                for ball in self.serve_balls(ctx.rng) {
                    world.spawn(ball);
                }
                log::debug!("pong: served {} ball(s)", self.config.balls);
            }
        }

        let exits: Vec<_> = world
            .by_kind(Kind::Ball)
            .filter(|b| b.pos.x < 0.0 || b.pos.x > WIDTH)
            .map(|b| (b.id, b.pos.x < 0.0))
            .collect();
        for (id, cpu_point) in exits {
            world.kill(id);
            if cpu_point {
                self.cpu_score += 1;
            } else {
                self.player_score += 1;
                ctx.add_score(1);
            }
            if self.player_score >= WINNING_SCORE {
                ctx.end(Verdict::Won);
            } else if self.cpu_score >= WINNING_SCORE {
                ctx.end(Verdict::Lost);
            }
            if world.count(Kind::Ball) == 0 && self.serve.is_none() {
                self.serve = Some(SpawnTimer::new(SERVE_DELAY_TICKS));
            }
        }
    }

    fn hud(&self, _world: &World<Kind>, _stats: &Stats) -> Vec<HudField> {
        vec![
            HudField::new("player-score", self.player_score),
            HudField::new("cpu-score", self.cpu_score),
        ]
    }

    fn draw(&self, world: &World<Kind>, out: &mut DrawList) {
        out.clear(Color::hex(0x211912));
        let dash = Color::hex(0xFB5607).with_alpha(0.3);
        let mut y = 0.0;
        while y < HEIGHT {
            out.rect(Vec2::new(WIDTH / 2.0 - 2.0, y), Vec2::new(4.0, 15.0), dash);
            y += 30.0;
        }
        for e in world.live() {
            match e.kind {
                Kind::Player | Kind::Cpu => out.rect(e.pos, Vec2::new(e.width(), e.height()), Color::hex(0xFB5607)),
                Kind::Ball => {
                    let c = e.center();
                    out.circle(c, BALL_SIZE, Color::hex(0xFFBE0B).with_alpha(0.3));
                    out.circle(c, BALL_SIZE / 2.0, Color::hex(0xFFBE0B));
                }
            }
        }
    }

    fn autopilot(&self, world: &World<Kind>, _stats: &Stats) -> InputState {
        let Some(player) = world.first(Kind::Player) else {
            return InputState::default();
        };
        let nearest = world
            .by_kind(Kind::Ball)
            .min_by(|a, b| (a.pos.x - player.pos.x).abs().total_cmp(&(b.pos.x - player.pos.x).abs()));
        match nearest {
            Some(ball) if ball.center().y < player.center().y - CPU_DEAD_ZONE => InputState::holding(&[Action::Up]),
            Some(ball) if ball.center().y > player.center().y + CPU_DEAD_ZONE => InputState::holding(&[Action::Down]),
            _ => InputState::default(),
        }
    }
}
