//! Two-player racing on a rectangular ring track, first to three laps
//!
//! Cars are rects positioned by their top-left corner with `rotation` as the
//! heading; all track tests use the car's centre.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec2;

use crate::engine::{Action, Aabb, Entity, Game, InputState, Progress, Shape, SimRng, Spawn, Stats, StepContext, Verdict, World};
use crate::render::{Color, DrawList};
use crate::ui::HudField;

pub mod consts {
    pub const WIDTH: f32 = 800.0;
    pub const HEIGHT: f32 = 600.0;
    pub const CAR_WIDTH: f32 = 30.0;
    pub const CAR_HEIGHT: f32 = 50.0;
    pub const MAX_SPEED: f32 = 5.0;
    /// Reverse speed limit as a share of MAX_SPEED
    pub const REVERSE_LIMIT: f32 = 0.5;
    pub const ACCELERATION: f32 = 0.3;
    /// Braking force as a share of ACCELERATION
    pub const BRAKE: f32 = 0.6;
    pub const FRICTION: f32 = 0.95;
    pub const TURN_SPEED: f32 = 0.08;
    pub const OFF_TRACK_DRAG: f32 = 0.5;
    pub const TOTAL_LAPS: u32 = 3;

    pub const OUTER_WIDTH: f32 = 700.0;
    pub const OUTER_HEIGHT: f32 = 500.0;
    pub const INNER_WIDTH: f32 = 400.0;
    pub const INNER_HEIGHT: f32 = 250.0;
    pub const TRACK_X: f32 = (WIDTH - OUTER_WIDTH) / 2.0;
    pub const TRACK_Y: f32 = (HEIGHT - OUTER_HEIGHT) / 2.0;
    pub const INNER_X: f32 = TRACK_X + (OUTER_WIDTH - INNER_WIDTH) / 2.0;
    pub const INNER_Y: f32 = TRACK_Y + (OUTER_HEIGHT - INNER_HEIGHT) / 2.0;

    pub const FINISH_X: f32 = TRACK_X + OUTER_WIDTH / 2.0;
    pub const FINISH_Y: f32 = TRACK_Y;
    pub const FINISH_WIDTH: f32 = 80.0;
    /// Distance from the line that still counts as crossing it
    pub const LINE_DEPTH: f32 = 50.0;
    pub const CHECKPOINT_Y: f32 = TRACK_Y + OUTER_HEIGHT - LINE_DEPTH;
    /// Grid offset of each car from the finish line centre
    pub const GRID_OFFSET: f32 = 40.0;
    pub const GRID_DEPTH: f32 = 30.0;
}

use consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Player index, 0 or 1
    Car(u8),
}

/// One frame of driver intent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    pub throttle: bool,
    pub brake: bool,
    pub left: bool,
    pub right: bool,
}

impl Controls {
    /// Player 1 drives with the primary directions, player 2 with the alternates
    pub fn for_player(input: &InputState, player: u8) -> Self {
        let [up, down, left, right] = if player == 0 {
            [Action::Up, Action::Down, Action::Left, Action::Right]
        } else {
            [Action::AltUp, Action::AltDown, Action::AltLeft, Action::AltRight]
        };
        Self {
            throttle: input.is_held(up),
            brake: input.is_held(down),
            left: input.is_held(left),
            right: input.is_held(right),
        }
    }

    fn apply_to(self, input: &mut InputState, player: u8) {
        let actions = if player == 0 {
            [Action::Up, Action::Down, Action::Left, Action::Right]
        } else {
            [Action::AltUp, Action::AltDown, Action::AltLeft, Action::AltRight]
        };
        for (on, action) in [self.throttle, self.brake, self.left, self.right].into_iter().zip(actions) {
            if on {
                input.held.insert(action);
            }
        }
    }
}

/// Per-car race state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Car {
    pub speed: f32,
    pub laps: u32,
    pub passed_checkpoint: bool,
}

impl Car {
    /// Throttle, friction, clamp, steering, then motion along the heading
    pub fn drive(&mut self, body: &mut Entity<Kind>, controls: Controls) {
        if controls.throttle {
            self.speed += ACCELERATION;
        }
        if controls.brake {
            self.speed -= ACCELERATION * BRAKE;
        }
        self.speed = (self.speed * FRICTION).clamp(-MAX_SPEED * REVERSE_LIMIT, MAX_SPEED);

        if self.speed != 0.0 {
            let turn = TURN_SPEED * (self.speed / MAX_SPEED);
            if controls.left {
                body.rotation -= turn;
            }
            if controls.right {
                body.rotation += turn;
            }
        }
        body.pos += Vec2::from_angle(body.rotation) * self.speed;
    }

    /// Off the tarmac (outside the ring or inside the infield) halves the speed
    pub fn keep_on_track(&mut self, center: Vec2) {
        if !on_track(center) {
            self.speed *= OFF_TRACK_DRAG;
        }
    }

    /// Checkpoint near the bottom straight, then the finish line counts a lap
    pub fn check_lap(&mut self, center: Vec2) -> bool {
        if center.y > CHECKPOINT_Y && !self.passed_checkpoint {
            self.passed_checkpoint = true;
        }
        let on_line = center.y < FINISH_Y + LINE_DEPTH
            && center.x > FINISH_X - FINISH_WIDTH / 2.0
            && center.x < FINISH_X + FINISH_WIDTH / 2.0;
        if self.passed_checkpoint && on_line {
            self.laps += 1;
            self.passed_checkpoint = false;
            return true;
        }
        false
    }
}

pub fn on_track(p: Vec2) -> bool {
    let outer = Aabb::new(TRACK_X, TRACK_Y, OUTER_WIDTH, OUTER_HEIGHT);
    let infield = p.x > INNER_X && p.x < INNER_X + INNER_WIDTH && p.y > INNER_Y && p.y < INNER_Y + INNER_HEIGHT;
    outer.contains(p) && !infield
}

#[derive(Debug, Clone, Default)]
pub struct Racing {
    cars: [Car; 2],
}

impl Racing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn car(&self, player: u8) -> &Car {
        &self.cars[usize::from(player.min(1))]
    }

    pub fn car_mut(&mut self, player: u8) -> &mut Car {
        &mut self.cars[usize::from(player.min(1))]
    }

    fn lap_text(&self, player: u8) -> String {
        format!("{} / {}", self.car(player).laps, TOTAL_LAPS)
    }

    /// Drive toward a point a little further round an ellipse through the track
    fn steer(body: &Entity<Kind>) -> Controls {
        let centre = Vec2::new(WIDTH / 2.0, HEIGHT / 2.0);
        let radii = Vec2::new(275.0, 215.0);
        let rel = (body.center() - centre) / radii;
        let theta = rel.y.atan2(rel.x) + 0.5;
        let target = centre + Vec2::new(theta.cos(), theta.sin()) * radii;
        let wanted = (target - body.center()).to_angle();
        let mut diff = wanted - body.rotation;
        while diff > PI {
            diff -= 2.0 * PI;
        }
        while diff < -PI {
            diff += 2.0 * PI;
        }
        Controls {
            throttle: true,
            brake: false,
            left: diff < -0.05,
            right: diff > 0.05,
        }
    }
}

impl Game for Racing {
    type Kind = Kind;

    fn name(&self) -> &'static str {
        "racing"
    }

    fn initial_lives(&self) -> u32 {
        0
    }

    fn setup(&mut self, world: &mut World<Kind>, _rng: &mut SimRng) {
        self.cars = [Car::default(); 2];
        for (player, dx) in [(0u8, -GRID_OFFSET), (1, GRID_OFFSET)] {
            let center = Vec2::new(FINISH_X + dx, FINISH_Y + GRID_DEPTH);
            let id = world.spawn_now(Spawn::new(
                Kind::Car(player),
                center - Vec2::new(CAR_WIDTH, CAR_HEIGHT) / 2.0,
                Shape::rect(CAR_WIDTH, CAR_HEIGHT),
            ));
            if let Some(car) = world.get_mut(id) {
                car.rotation = FRAC_PI_2;
            }
        }
    }

    fn apply_input(&mut self, world: &mut World<Kind>, input: &InputState, _ctx: &mut StepContext) {
        for player in 0..2u8 {
            if let Some(body) = world.first_mut(Kind::Car(player)) {
                self.cars[usize::from(player)].drive(body, Controls::for_player(input, player));
            }
        }
    }

    fn apply_forces(&mut self, world: &mut World<Kind>, _ctx: &mut StepContext) {
        for player in 0..2u8 {
            if let Some(body) = world.first(Kind::Car(player)) {
                self.cars[usize::from(player)].keep_on_track(body.center());
            }
        }
    }

    fn after_collisions(&mut self, world: &mut World<Kind>, _ctx: &mut StepContext) {
        for player in 0..2u8 {
            if let Some(body) = world.first(Kind::Car(player)) {
                let car = &mut self.cars[usize::from(player)];
                if car.check_lap(body.center()) {
                    log::debug!("racing: player {} lap {}", player + 1, car.laps);
                }
            }
        }
    }

    /// Player 1 is checked first when both finish on the same tick
    fn evaluate(&mut self, _world: &World<Kind>, _ctx: &StepContext) -> Progress {
        match self.cars.iter().position(|c| c.laps >= TOTAL_LAPS) {
            Some(i) => Progress::End(Verdict::Winner(i as u8 + 1)),
            None => Progress::Continue,
        }
    }

    fn hud(&self, _world: &World<Kind>, _stats: &Stats) -> Vec<HudField> {
        vec![
            HudField::new("player1-laps", self.lap_text(0)),
            HudField::new("player2-laps", self.lap_text(1)),
        ]
    }

    fn draw(&self, world: &World<Kind>, out: &mut DrawList) {
        out.clear(Color::hex(0x2D4A2D));
        out.rect(
            Vec2::new(TRACK_X, TRACK_Y),
            Vec2::new(OUTER_WIDTH, OUTER_HEIGHT),
            Color::hex(0x404040),
        );
        out.rect(
            Vec2::new(INNER_X, INNER_Y),
            Vec2::new(INNER_WIDTH, INNER_HEIGHT),
            Color::hex(0x2D4A2D),
        );
        let square = 10.0;
        for i in 0..(FINISH_WIDTH / square) as usize {
            for j in 0..3usize {
                let color = if (i + j) % 2 == 0 { Color::WHITE } else { Color::BLACK };
                out.rect(
                    Vec2::new(FINISH_X - FINISH_WIDTH / 2.0 + i as f32 * square, FINISH_Y + j as f32 * square),
                    Vec2::splat(square),
                    color,
                );
            }
        }
        out.text(Vec2::new(FINISH_X, FINISH_Y - 10.0), "START/FINISH", Color::hex(0xFFEB3B));
        for e in world.live() {
            let Kind::Car(player) = e.kind;
            let color = if player == 0 { Color::hex(0xFF3366) } else { Color::hex(0x3388FF) };
            // Drawn along the heading: the car's long side points where it drives
            out.rotated_rect(e.pos, Vec2::new(e.width(), e.height()), color, e.rotation - FRAC_PI_2);
        }
    }

    fn autopilot(&self, world: &World<Kind>, _stats: &Stats) -> InputState {
        let mut input = InputState::default();
        for player in 0..2u8 {
            if let Some(body) = world.first(Kind::Car(player)) {
                Self::steer(body).apply_to(&mut input, player);
            }
        }
        input
    }
}
