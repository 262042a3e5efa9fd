//! Breakout: paddle, ball and a 6x10 brick wall
//!
//! The ball rides the paddle until launched. Clearing the wall advances the
//! level with a faster ball and a narrower paddle; there is no final level.

use glam::Vec2;

use crate::engine::{
    Action, Axis, Contact, Effect, Entity, Game, InputState, Progress, Ramp, Shape, SimRng, Spawn, Stats, StepContext,
    World,
};
use crate::render::{Color, DrawList};
use crate::ui::HudField;

pub mod consts {
    pub const WIDTH: f32 = 800.0;
    pub const HEIGHT: f32 = 600.0;

    pub const PADDLE_WIDTH: f32 = 120.0;
    pub const PADDLE_HEIGHT: f32 = 20.0;
    pub const PADDLE_Y: f32 = HEIGHT - 50.0;
    pub const PADDLE_SPEED: f32 = 8.0;
    pub const PADDLE_MIN_WIDTH: f32 = 80.0;
    pub const PADDLE_SHRINK: f32 = 10.0;

    pub const BALL_RADIUS: f32 = 8.0;
    pub const BALL_SPEED: f32 = 5.0;
    pub const BALL_SPEEDUP: f32 = 1.0;
    /// No ceiling in play; the ramp needs one
    pub const BALL_MAX_SPEED: f32 = f32::MAX;

    pub const BRICK_ROWS: usize = 6;
    pub const BRICK_COLS: usize = 10;
    pub const BRICK_WIDTH: f32 = 65.0;
    pub const BRICK_HEIGHT: f32 = 22.0;
    pub const BRICK_PADDING: f32 = 10.0;
    pub const BRICK_OFFSET_TOP: f32 = 80.0;
    pub const BRICK_OFFSET_LEFT: f32 = 28.0;
    pub const BRICK_POINTS: [u64; BRICK_ROWS] = [60, 50, 40, 30, 20, 10];
    pub const BRICK_COLORS: [u32; BRICK_ROWS] = [0xFF006E, 0xFB5607, 0xFFBE0B, 0x06FFA5, 0x3A86FF, 0x8338EC];

    pub const LIVES: u32 = 3;
    /// Launch angle spread either side of straight up, as a fraction of pi
    pub const LAUNCH_SPREAD: f32 = 0.3;
    /// Paddle bounce angle range, as a fraction of pi
    pub const BOUNCE_SPREAD: f32 = 0.6;
}

use consts::*;

const PADDLE_RAMP: Ramp = Ramp::new(PADDLE_WIDTH, -PADDLE_SHRINK, PADDLE_MIN_WIDTH);
const SPEED_RAMP: Ramp = Ramp::new(BALL_SPEED, BALL_SPEEDUP, BALL_MAX_SPEED);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Paddle,
    Ball,
    Brick,
}

#[derive(Debug, Clone)]
pub struct Breakout {
    lives: u32,
    ball_speed: f32,
    paddle_width: f32,
    launched: bool,
}

impl Default for Breakout {
    fn default() -> Self {
        Self::new()
    }
}

impl Breakout {
    pub fn new() -> Self {
        Self::with_lives(LIVES)
    }

    pub fn with_lives(lives: u32) -> Self {
        Self {
            lives,
            ball_speed: BALL_SPEED,
            paddle_width: PADDLE_WIDTH,
            launched: false,
        }
    }

    pub fn ball_speed(&self) -> f32 {
        self.ball_speed
    }

    pub fn paddle_width(&self) -> f32 {
        self.paddle_width
    }

    pub fn launched(&self) -> bool {
        self.launched
    }

    /// Row index recovered from a brick's y position
    pub fn brick_row(brick: &Entity<Kind>) -> usize {
        let row = ((brick.pos.y - BRICK_OFFSET_TOP) / (BRICK_HEIGHT + BRICK_PADDING)).round();
        (row.max(0.0) as usize).min(BRICK_ROWS - 1)
    }

    pub fn brick_points(brick: &Entity<Kind>) -> u64 {
        BRICK_POINTS[Self::brick_row(brick)]
    }

    fn build_bricks(world: &mut World<Kind>) {
        world.remove_kind(Kind::Brick);
        for row in 0..BRICK_ROWS {
            for col in 0..BRICK_COLS {
                let pos = Vec2::new(
                    col as f32 * (BRICK_WIDTH + BRICK_PADDING) + BRICK_OFFSET_LEFT,
                    row as f32 * (BRICK_HEIGHT + BRICK_PADDING) + BRICK_OFFSET_TOP,
                );
                world.spawn_now(Spawn::new(Kind::Brick, pos, Shape::rect(BRICK_WIDTH, BRICK_HEIGHT)));
            }
        }
    }

    /// Put the ball back on the paddle, stationary
    fn serve(&mut self, world: &mut World<Kind>) {
        self.launched = false;
        let Some(paddle) = world.first(Kind::Paddle) else {
            return;
        };
        let rest = Vec2::new(paddle.pos.x + paddle.width() / 2.0, PADDLE_Y - BALL_RADIUS);
        if let Some(ball) = world.first_mut(Kind::Ball) {
            ball.pos = rest;
            ball.vel = Vec2::ZERO;
        }
    }

    fn launch(&mut self, world: &mut World<Kind>, rng: &mut SimRng) {
        let angle = (rng.next_f32() * 2.0 * LAUNCH_SPREAD - LAUNCH_SPREAD) * std::f32::consts::PI;
        if let Some(ball) = world.first_mut(Kind::Ball) {
            ball.vel = Vec2::new(self.ball_speed * angle.sin(), -self.ball_speed * angle.cos());
            self.launched = true;
            log::debug!("breakout: ball launched at {:.2} rad", angle);
        }
    }
}

impl Game for Breakout {
    type Kind = Kind;

    fn name(&self) -> &'static str {
        "breakout"
    }

    fn initial_lives(&self) -> u32 {
        self.lives
    }

    fn setup(&mut self, world: &mut World<Kind>, _rng: &mut SimRng) {
        world.spawn_now(Spawn::new(
            Kind::Paddle,
            Vec2::new(WIDTH / 2.0 - PADDLE_WIDTH / 2.0, PADDLE_Y),
            Shape::rect(self.paddle_width, PADDLE_HEIGHT),
        ));
        world.spawn_now(Spawn::new(
            Kind::Ball,
            Vec2::new(WIDTH / 2.0, PADDLE_Y - BALL_RADIUS),
            Shape::circle(BALL_RADIUS),
        ));
        Self::build_bricks(world);
    }

    fn apply_input(&mut self, world: &mut World<Kind>, input: &InputState, ctx: &mut StepContext) {
        if let Some(paddle) = world.first_mut(Kind::Paddle) {
            if input.is_held(Action::Left) {
                paddle.pos.x = (paddle.pos.x - PADDLE_SPEED).max(0.0);
            }
            if input.is_held(Action::Right) {
                paddle.pos.x = (paddle.pos.x + PADDLE_SPEED).min(WIDTH - paddle.width());
            }
        }

        if !self.launched {
            self.serve(world);
            if input.was_pressed(Action::Primary) {
                self.launch(world, ctx.rng);
            }
        }
    }

    fn integrates(&self, kind: Kind) -> bool {
        kind == Kind::Ball
    }

    /// Wall bounces
    fn apply_forces(&mut self, world: &mut World<Kind>, _ctx: &mut StepContext) {
        if !self.launched {
            return;
        }
        for ball in world.by_kind_mut(Kind::Ball) {
            if ball.pos.x - BALL_RADIUS <= 0.0 || ball.pos.x + BALL_RADIUS >= WIDTH {
                ball.vel.x = -ball.vel.x;
            }
            if ball.pos.y - BALL_RADIUS <= 0.0 {
                ball.vel.y = -ball.vel.y;
            }
        }
    }

    fn interacts(&self, a: Kind, b: Kind) -> bool {
        matches!(
            (a, b),
            (Kind::Ball, Kind::Paddle) | (Kind::Paddle, Kind::Ball) | (Kind::Ball, Kind::Brick) | (Kind::Brick, Kind::Ball)
        )
    }

    fn touching(&self, a: &Entity<Kind>, b: &Entity<Kind>) -> bool {
        let (ball, other) = if a.kind == Kind::Ball { (a, b) } else { (b, a) };
        match other.kind {
            // Only the top edge counts, and only while falling
            Kind::Paddle => {
                self.launched
                    && ball.vel.y > 0.0
                    && ball.pos.y + BALL_RADIUS >= other.pos.y
                    && ball.pos.x >= other.pos.x
                    && ball.pos.x <= other.pos.x + other.width()
            }
            _ => crate::engine::shapes_overlap(ball, other),
        }
    }

    fn resolve(&mut self, contact: &Contact<Kind>, world: &World<Kind>, ctx: &mut StepContext) {
        let Some((ball_id, other_id)) = contact.oriented(Kind::Ball) else {
            return;
        };
        let (Some(ball), Some(other)) = (world.get(ball_id), world.get(other_id)) else {
            return;
        };

        match other.kind {
            Kind::Paddle => {
                let hit = (ball.pos.x - other.pos.x) / other.width();
                let angle = (hit - 0.5) * std::f32::consts::PI * BOUNCE_SPREAD;
                ctx.emit(Effect::SetVelocity {
                    id: ball_id,
                    vel: Vec2::new(self.ball_speed * angle.sin(), -self.ball_speed * angle.cos()),
                });
            }
            Kind::Brick => {
                ctx.emit(Effect::Kill(other_id));
                ctx.add_score(Self::brick_points(other));
                ctx.emit(Effect::Reflect { id: ball_id, axis: Axis::Y });
            }
            Kind::Ball => {}
        }
    }

    fn after_collisions(&mut self, world: &mut World<Kind>, ctx: &mut StepContext) {
        let fell = world.by_kind(Kind::Ball).any(|b| b.pos.y - BALL_RADIUS > HEIGHT);
        if fell {
            ctx.lose_life();
        }
    }

    fn on_life_lost(&mut self, world: &mut World<Kind>, _ctx: &mut StepContext) {
        self.serve(world);
    }

    fn evaluate(&mut self, world: &World<Kind>, _ctx: &StepContext) -> Progress {
        if world.count(Kind::Brick) == 0 {
            Progress::NextLevel
        } else {
            Progress::Continue
        }
    }

    fn next_level(&mut self, world: &mut World<Kind>, _ctx: &mut StepContext) {
        self.ball_speed = SPEED_RAMP.advance(self.ball_speed);
        self.paddle_width = PADDLE_RAMP.advance(self.paddle_width);
        if let Some(paddle) = world.first_mut(Kind::Paddle) {
            paddle.set_width(self.paddle_width);
            paddle.pos.x = paddle.pos.x.min(WIDTH - self.paddle_width);
        }
        self.serve(world);
        Self::build_bricks(world);
    }

    fn hud(&self, world: &World<Kind>, stats: &Stats) -> Vec<HudField> {
        vec![
            HudField::new("score", stats.score),
            HudField::new("level", stats.level),
            HudField::new("lives", stats.lives),
            HudField::new("blocks-remaining", world.count(Kind::Brick)),
        ]
    }

    fn draw(&self, world: &World<Kind>, out: &mut DrawList) {
        out.clear(Color::hex(0x221D12));
        for brick in world.by_kind(Kind::Brick) {
            let color = Color::hex(BRICK_COLORS[Self::brick_row(brick)]);
            out.rect(brick.pos, Vec2::new(brick.width(), brick.height()), color);
        }
        for paddle in world.by_kind(Kind::Paddle) {
            out.rect(paddle.pos, Vec2::new(paddle.width(), paddle.height()), Color::hex(0xFB5607));
        }
        for ball in world.by_kind(Kind::Ball) {
            out.circle(ball.pos, BALL_RADIUS * 2.0, Color::hex(0xFFBE0B).with_alpha(0.4));
            out.circle(ball.pos, BALL_RADIUS, Color::hex(0xFFBE0B));
        }
    }

    fn autopilot(&self, world: &World<Kind>, _stats: &Stats) -> InputState {
        if !self.launched {
            return InputState::press(Action::Primary);
        }
        let (Some(paddle), Some(ball)) = (world.first(Kind::Paddle), world.first(Kind::Ball)) else {
            return InputState::default();
        };
        let center = paddle.center().x;
        if ball.pos.x < center - 10.0 {
            InputState::holding(&[Action::Left])
        } else if ball.pos.x > center + 10.0 {
            InputState::holding(&[Action::Right])
        } else {
            InputState::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Session, SessionPhase, Verdict};

    const DT: f32 = 1.0 / 60.0;

    fn running(game: Breakout) -> Session<Breakout> {
        let mut s = Session::new(game, 11);
        s.start();
        s
    }

    fn ball(s: &mut Session<Breakout>) -> &mut Entity<Kind> {
        s.world.first_mut(Kind::Ball).unwrap()
    }

    #[test]
    fn setup_builds_full_wall() {
        let s = Session::new(Breakout::new(), 1);
        assert_eq!(s.world.count(Kind::Brick), BRICK_ROWS * BRICK_COLS);
        assert_eq!(s.stats.lives, 3);
        let first = s.world.first(Kind::Brick).unwrap();
        assert_eq!(first.pos, Vec2::new(28.0, 80.0));
        assert_eq!(Breakout::brick_points(first), 60);
        let last = s.world.by_kind(Kind::Brick).last().unwrap();
        assert_eq!(Breakout::brick_points(last), 10);
    }

    #[test]
    fn ball_rides_paddle_until_launch() {
        let mut s = running(Breakout::new());
        s.tick(&InputState::holding(&[Action::Left]), DT);
        let paddle_center = s.world.first(Kind::Paddle).unwrap().center().x;
        assert_eq!(ball(&mut s).pos.x, paddle_center);
        assert_eq!(ball(&mut s).vel, Vec2::ZERO);

        s.tick(&InputState::press(Action::Primary), DT);
        assert!(s.game.launched());
        let vel = ball(&mut s).vel;
        assert!((vel.length() - BALL_SPEED).abs() < 1e-4);
        assert!(vel.y < 0.0);
        assert!(vel.x.abs() <= BALL_SPEED * (LAUNCH_SPREAD * std::f32::consts::PI).sin() + 1e-4);
    }

    #[test]
    fn paddle_clamps_to_field() {
        let mut s = running(Breakout::new());
        for _ in 0..200 {
            s.tick(&InputState::holding(&[Action::Left]), DT);
        }
        assert_eq!(s.world.first(Kind::Paddle).unwrap().pos.x, 0.0);
        for _ in 0..200 {
            s.tick(&InputState::holding(&[Action::Right]), DT);
        }
        assert_eq!(s.world.first(Kind::Paddle).unwrap().pos.x, WIDTH - PADDLE_WIDTH);
    }

    #[test]
    fn paddle_center_hit_goes_straight_up() {
        let mut s = running(Breakout::new());
        s.tick(&InputState::press(Action::Primary), DT);
        let paddle_center = s.world.first(Kind::Paddle).unwrap().center().x;
        let b = ball(&mut s);
        b.pos = Vec2::new(paddle_center, PADDLE_Y - BALL_RADIUS - 2.0);
        b.vel = Vec2::new(0.0, 3.0);
        s.tick(&InputState::default(), DT);
        let vel = ball(&mut s).vel;
        assert!(vel.x.abs() < 1e-4);
        assert!((vel.y + BALL_SPEED).abs() < 1e-4);
    }

    #[test]
    fn overlapping_bricks_both_score_and_flips_cancel() {
        let mut s = running(Breakout::new());
        s.tick(&InputState::press(Action::Primary), DT);
        s.world.remove_kind(Kind::Brick);
        // Two bricks stacked on the same spot in row 5 (10 points each)
        let y = BRICK_OFFSET_TOP + 5.0 * (BRICK_HEIGHT + BRICK_PADDING);
        s.world.spawn_now(Spawn::new(Kind::Brick, Vec2::new(100.0, y), Shape::rect(BRICK_WIDTH, BRICK_HEIGHT)));
        s.world.spawn_now(Spawn::new(Kind::Brick, Vec2::new(100.0, y), Shape::rect(BRICK_WIDTH, BRICK_HEIGHT)));
        // A third brick far away keeps the level from ending
        s.world.spawn_now(Spawn::new(Kind::Brick, Vec2::new(600.0, 80.0), Shape::rect(BRICK_WIDTH, BRICK_HEIGHT)));
        let b = ball(&mut s);
        b.pos = Vec2::new(130.0, y + BRICK_HEIGHT + 5.0);
        b.vel = Vec2::new(0.0, -5.0);

        s.tick(&InputState::default(), DT);
        assert_eq!(s.stats.score, 20);
        assert_eq!(s.world.count(Kind::Brick), 1);
        // Two flips: still moving up
        assert!(ball(&mut s).vel.y < 0.0);
    }

    #[test]
    fn clearing_wall_advances_level() {
        let mut s = running(Breakout::new());
        s.tick(&InputState::press(Action::Primary), DT);
        s.world.remove_kind(Kind::Brick);
        s.world.spawn_now(Spawn::new(Kind::Brick, Vec2::new(90.0, 80.0), Shape::rect(BRICK_WIDTH, BRICK_HEIGHT)));
        let b = ball(&mut s);
        b.pos = Vec2::new(100.0, 100.0);
        b.vel = Vec2::new(0.0, -5.0);

        s.tick(&InputState::default(), DT);
        assert_eq!(s.phase(), SessionPhase::Running);
        assert_eq!(s.stats.level, 2);
        assert_eq!(s.stats.score, 60);
        assert_eq!(s.world.count(Kind::Brick), BRICK_ROWS * BRICK_COLS);
        assert_eq!(s.game.ball_speed(), BALL_SPEED + BALL_SPEEDUP);
        assert_eq!(s.game.paddle_width(), PADDLE_WIDTH - PADDLE_SHRINK);
        assert_eq!(s.world.first(Kind::Paddle).unwrap().width(), PADDLE_WIDTH - PADDLE_SHRINK);
        assert!(!s.game.launched());
    }

    #[test]
    fn paddle_width_floors() {
        let mut width = PADDLE_WIDTH;
        for _ in 0..20 {
            width = PADDLE_RAMP.advance(width);
        }
        assert_eq!(width, PADDLE_MIN_WIDTH);
    }

    #[test]
    fn falling_ball_costs_a_life_and_reserves() {
        let mut s = running(Breakout::new());
        s.tick(&InputState::press(Action::Primary), DT);
        let b = ball(&mut s);
        b.pos = Vec2::new(400.0, HEIGHT + 20.0);
        b.vel = Vec2::new(0.0, 5.0);
        s.tick(&InputState::default(), DT);
        assert_eq!(s.stats.lives, 2);
        assert_eq!(s.phase(), SessionPhase::Running);
        assert!(!s.game.launched());
        assert_eq!(ball(&mut s).pos.y, PADDLE_Y - BALL_RADIUS);
    }

    #[test]
    fn last_life_ends_the_session() {
        let mut s = running(Breakout::with_lives(1));
        s.tick(&InputState::press(Action::Primary), DT);
        let b = ball(&mut s);
        b.pos = Vec2::new(400.0, HEIGHT + 20.0);
        b.vel = Vec2::new(0.0, 5.0);
        s.tick(&InputState::default(), DT);
        assert_eq!(s.phase(), SessionPhase::Ended);
        assert_eq!(s.outcome().map(|o| o.verdict), Some(Verdict::Lost));
        assert_eq!(s.stats.lives, 0);
    }

    #[test]
    fn positions_stay_finite_under_autopilot() {
        let mut s = running(Breakout::new());
        for _ in 0..2000 {
            let input = s.game.autopilot(&s.world, &s.stats);
            s.tick(&input, DT);
            for e in s.world.live() {
                assert!(e.pos.is_finite());
            }
            let paddle = s.world.first(Kind::Paddle).unwrap();
            assert!(paddle.pos.x >= 0.0 && paddle.pos.x + paddle.width() <= WIDTH);
        }
    }
}
