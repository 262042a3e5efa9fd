//! Snake on a 30x30 grid
//!
//! Entity positions are grid cells. The body is kept in list order with the
//! tail first: each step appends a segment where the head was and, unless
//! food was eaten, kills the oldest one.

use glam::Vec2;

use crate::engine::{
    Action, BestSpec, Contact, Game, InputState, Ramp, Shape, SimRng, Spawn, Stats, StepContext, Timing, Verdict, World,
};
use crate::highscores::BestOrder;
use crate::render::{Color, DrawList};
use crate::ui::HudField;

pub mod consts {
    pub const GRID_SIZE: i32 = 30;
    pub const CELL_SIZE: f32 = 20.0;
    pub const INITIAL_INTERVAL_MS: f32 = 150.0;
    pub const INTERVAL_STEP_MS: f32 = 5.0;
    pub const MIN_INTERVAL_MS: f32 = 50.0;
    /// Speed up each time the score reaches a multiple of this
    pub const SPEEDUP_EVERY: u64 = 50;
    pub const FOOD_POINTS: u64 = 10;
    pub const INITIAL_LENGTH: i32 = 3;
    pub const BEST_KEY: &str = "snakeHighScore";
}

use consts::*;

const INTERVAL_RAMP: Ramp = Ramp::new(INITIAL_INTERVAL_MS, -INTERVAL_STEP_MS, MIN_INTERVAL_MS);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Head,
    Body,
    Food,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    Up,
    Down,
    Left,
    Right,
}

impl Heading {
    pub fn delta(self) -> Vec2 {
        match self {
            Heading::Up => Vec2::new(0.0, -1.0),
            Heading::Down => Vec2::new(0.0, 1.0),
            Heading::Left => Vec2::new(-1.0, 0.0),
            Heading::Right => Vec2::new(1.0, 0.0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Heading::Up => Heading::Down,
            Heading::Down => Heading::Up,
            Heading::Left => Heading::Right,
            Heading::Right => Heading::Left,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Snake {
    direction: Heading,
    next_direction: Heading,
    interval_ms: f32,
    ate: bool,
    crashed: bool,
}

impl Default for Snake {
    fn default() -> Self {
        Self::new()
    }
}

impl Snake {
    pub fn new() -> Self {
        Self {
            direction: Heading::Right,
            next_direction: Heading::Right,
            interval_ms: INITIAL_INTERVAL_MS,
            ate: false,
            crashed: false,
        }
    }

    pub fn direction(&self) -> Heading {
        self.direction
    }

    pub fn interval_ms(&self) -> f32 {
        self.interval_ms
    }

    /// Head plus body segments
    pub fn length(world: &World<Kind>) -> usize {
        world.count(Kind::Head) + world.count(Kind::Body)
    }

    fn cell() -> Shape {
        Shape::rect(1.0, 1.0)
    }

    fn occupied(world: &World<Kind>, cell: Vec2) -> bool {
        world
            .live()
            .any(|e| matches!(e.kind, Kind::Head | Kind::Body) && e.pos == cell)
    }

    /// A random free cell, or `None` when the snake fills the board
    fn free_cell(world: &World<Kind>, rng: &mut SimRng) -> Option<Vec2> {
        let free: Vec<Vec2> = (0..GRID_SIZE)
            .flat_map(|y| (0..GRID_SIZE).map(move |x| Vec2::new(x as f32, y as f32)))
            .filter(|&c| !Self::occupied(world, c))
            .collect();
        if free.is_empty() {
            None
        } else {
            Some(free[rng.index(free.len())])
        }
    }

    fn steer(&mut self, input: &InputState) {
        for (action, heading) in [
            (Action::Up, Heading::Up),
            (Action::Down, Heading::Down),
            (Action::Left, Heading::Left),
            (Action::Right, Heading::Right),
        ] {
            if input.is_active(action) && self.direction != heading.opposite() {
                self.next_direction = heading;
            }
        }
    }
}

impl Game for Snake {
    type Kind = Kind;

    fn name(&self) -> &'static str {
        "snake"
    }

    fn timing(&self) -> Timing {
        Timing::Fixed {
            interval_ms: self.interval_ms,
        }
    }

    fn setup(&mut self, world: &mut World<Kind>, rng: &mut SimRng) {
        let mid = (GRID_SIZE / 2) as f32;
        world.spawn_now(Spawn::new(Kind::Head, Vec2::new(mid, mid), Self::cell()));
        // Tail first
        for i in (1..INITIAL_LENGTH).rev() {
            world.spawn_now(Spawn::new(Kind::Body, Vec2::new(mid - i as f32, mid), Self::cell()));
        }
        if let Some(food) = Self::free_cell(world, rng) {
            world.spawn_now(Spawn::new(Kind::Food, food, Self::cell()));
        }
    }

    fn apply_input(&mut self, world: &mut World<Kind>, input: &InputState, _ctx: &mut StepContext) {
        self.steer(input);
        self.direction = self.next_direction;
        self.ate = false;

        let Some(head) = world.first_mut(Kind::Head) else {
            return;
        };
        head.vel = self.direction.delta();
        let neck = head.pos;
        world.spawn_now(Spawn::new(Kind::Body, neck, Self::cell()));
    }

    fn integrates(&self, kind: Kind) -> bool {
        kind == Kind::Head
    }

    /// Walls
    fn apply_forces(&mut self, world: &mut World<Kind>, ctx: &mut StepContext) {
        let Some(head) = world.first(Kind::Head) else {
            return;
        };
        let limit = GRID_SIZE as f32;
        if head.pos.x < 0.0 || head.pos.x >= limit || head.pos.y < 0.0 || head.pos.y >= limit {
            self.crashed = true;
            ctx.end(Verdict::Lost);
        }
    }

    fn interacts(&self, a: Kind, b: Kind) -> bool {
        matches!(
            (a, b),
            (Kind::Head, Kind::Body) | (Kind::Body, Kind::Head) | (Kind::Head, Kind::Food) | (Kind::Food, Kind::Head)
        )
    }

    fn resolve(&mut self, contact: &Contact<Kind>, _world: &World<Kind>, ctx: &mut StepContext) {
        if contact.is(Kind::Head, Kind::Body) {
            self.crashed = true;
            ctx.end(Verdict::Lost);
        } else if let Some((food, _)) = contact.oriented(Kind::Food) {
            if self.crashed {
                return;
            }
            ctx.emit(crate::engine::Effect::Kill(food));
            ctx.add_score(FOOD_POINTS);
            self.ate = true;
        }
    }

    fn after_collisions(&mut self, world: &mut World<Kind>, ctx: &mut StepContext) {
        if self.crashed {
            return;
        }
        if !self.ate {
            let tail = world.first(Kind::Body).map(|e| e.id);
            if let Some(tail) = tail {
                world.kill(tail);
            }
            return;
        }

        match Self::free_cell(world, ctx.rng) {
            Some(cell) => world.spawn(Spawn::new(Kind::Food, cell, Self::cell())),
            None => ctx.end(Verdict::Won),
        }
        if ctx.stats.score % SPEEDUP_EVERY == 0 && self.interval_ms > MIN_INTERVAL_MS {
            self.interval_ms = INTERVAL_RAMP.advance(self.interval_ms);
            log::debug!("snake: interval now {} ms", self.interval_ms);
        }
    }

    fn hud(&self, world: &World<Kind>, stats: &Stats) -> Vec<HudField> {
        let multiplier = (INITIAL_INTERVAL_MS - self.interval_ms) / INTERVAL_STEP_MS + 1.0;
        vec![
            HudField::new("score", stats.score),
            HudField::new("length", Self::length(world)),
            HudField::new("speed", format!("{multiplier:.1}x")),
        ]
    }

    fn draw(&self, world: &World<Kind>, out: &mut DrawList) {
        out.clear(Color::hex(0x121F17));
        let size = Vec2::splat(CELL_SIZE - 2.0);
        for e in world.live() {
            let corner = e.pos * CELL_SIZE;
            match e.kind {
                Kind::Food => out.circle(
                    corner + Vec2::splat(CELL_SIZE / 2.0),
                    CELL_SIZE / 2.0 - 2.0,
                    Color::hex(0xFF006E),
                ),
                Kind::Body => out.rect(corner + Vec2::ONE, size, Color::hex(0x06FFA5)),
                Kind::Head => out.rect(corner + Vec2::ONE, size, Color::hex(0x00FF88)),
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

    /// Greedy chase of the food that avoids walls and the body one step ahead
    fn autopilot(&self, world: &World<Kind>, _stats: &Stats) -> InputState {
        let (Some(head), Some(food)) = (world.first(Kind::Head), world.first(Kind::Food)) else {
            return InputState::default();
        };
        let limit = GRID_SIZE as f32;
        let safe = |h: Heading| {
            let next = head.pos + h.delta();
            h != self.direction.opposite()
                && next.x >= 0.0
                && next.x < limit
                && next.y >= 0.0
                && next.y < limit
                && !Self::occupied(world, next)
        };
        let mut preferred = Vec::new();
        if food.pos.x > head.pos.x {
            preferred.push(Heading::Right);
        }
        if food.pos.x < head.pos.x {
            preferred.push(Heading::Left);
        }
        if food.pos.y > head.pos.y {
            preferred.push(Heading::Down);
        }
        if food.pos.y < head.pos.y {
            preferred.push(Heading::Up);
        }
        preferred.extend([self.direction, Heading::Up, Heading::Down, Heading::Left, Heading::Right]);
        let choice = preferred.into_iter().find(|&h| safe(h)).unwrap_or(self.direction);
        let action = match choice {
            Heading::Up => Action::Up,
            Heading::Down => Action::Down,
            Heading::Left => Action::Left,
            Heading::Right => Action::Right,
        };
        InputState::press(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Session, SessionPhase};

    const DT: f32 = 0.15;

    fn running() -> Session<Snake> {
        let mut s = Session::new(Snake::new(), 5);
        s.start();
        s
    }

    /// Replace the board: `cells[0]` is the head, the rest run from neck to tail
    fn layout(s: &mut Session<Snake>, cells: &[(f32, f32)], food: (f32, f32)) {
        s.world.clear();
        s.world.spawn_now(Spawn::new(Kind::Head, Vec2::from(cells[0]), Snake::cell()));
        for &c in cells[1..].iter().rev() {
            s.world.spawn_now(Spawn::new(Kind::Body, Vec2::from(c), Snake::cell()));
        }
        s.world.spawn_now(Spawn::new(Kind::Food, Vec2::from(food), Snake::cell()));
    }

    fn cells(s: &Session<Snake>) -> Vec<Vec2> {
        s.world
            .live()
            .filter(|e| e.kind != Kind::Food)
            .map(|e| e.pos)
            .collect()
    }

    #[test]
    fn starts_centered_heading_right() {
        let s = Session::new(Snake::new(), 1);
        assert_eq!(s.world.first(Kind::Head).unwrap().pos, Vec2::new(15.0, 15.0));
        assert_eq!(Snake::length(&s.world), 3);
        let food = s.world.first(Kind::Food).unwrap().pos;
        assert!(!Snake::occupied(&s.world, food));
        assert_eq!(s.game.timing(), Timing::Fixed { interval_ms: 150.0 });
    }

    #[test]
    fn moves_one_cell_and_keeps_length() {
        let mut s = running();
        layout(&mut s, &[(15.0, 15.0), (14.0, 15.0), (13.0, 15.0)], (0.0, 0.0));
        s.tick(&InputState::default(), DT);
        assert_eq!(s.world.first(Kind::Head).unwrap().pos, Vec2::new(16.0, 15.0));
        assert_eq!(Snake::length(&s.world), 3);
        assert!(cells(&s).contains(&Vec2::new(15.0, 15.0)));
        assert!(!cells(&s).contains(&Vec2::new(13.0, 15.0)));
    }

    #[test]
    fn head_into_body_ends_immediately() {
        let mut s = running();
        // Head at (10,10) heading right into a mid-body segment at (11,10)
        layout(
            &mut s,
            &[(10.0, 10.0), (10.0, 11.0), (11.0, 11.0), (11.0, 10.0), (12.0, 10.0)],
            (0.0, 0.0),
        );
        s.tick(&InputState::default(), DT);
        assert_eq!(s.phase(), SessionPhase::Ended);
        assert_eq!(s.outcome().map(|o| o.verdict), Some(Verdict::Lost));
        assert_eq!(s.stats.score, 0);
    }

    #[test]
    fn moving_into_the_tail_cell_still_collides() {
        let mut s = running();
        s.game.direction = Heading::Down;
        s.game.next_direction = Heading::Down;
        layout(&mut s, &[(10.0, 10.0), (11.0, 10.0), (11.0, 11.0), (10.0, 11.0)], (0.0, 0.0));
        s.tick(&InputState::default(), DT);
        assert_eq!(s.phase(), SessionPhase::Ended);
    }

    #[test]
    fn eating_grows_and_moves_food_off_body() {
        let mut s = running();
        layout(&mut s, &[(10.0, 10.0), (9.0, 10.0), (8.0, 10.0)], (11.0, 10.0));
        s.tick(&InputState::default(), DT);
        assert_eq!(s.phase(), SessionPhase::Running);
        assert_eq!(s.stats.score, FOOD_POINTS);
        assert_eq!(Snake::length(&s.world), 4);
        // No tail removal on the eating tick
        assert!(cells(&s).contains(&Vec2::new(8.0, 10.0)));
        let food: Vec<_> = s.world.by_kind(Kind::Food).collect();
        assert_eq!(food.len(), 1);
        assert!(!Snake::occupied(&s.world, food[0].pos));
    }

    #[test]
    fn reversal_is_ignored() {
        let mut s = running();
        layout(&mut s, &[(10.0, 10.0), (9.0, 10.0), (8.0, 10.0)], (0.0, 0.0));
        s.tick(&InputState::press(Action::Left), DT);
        assert_eq!(s.world.first(Kind::Head).unwrap().pos, Vec2::new(11.0, 10.0));
        s.tick(&InputState::press(Action::Up), DT);
        assert_eq!(s.world.first(Kind::Head).unwrap().pos, Vec2::new(11.0, 9.0));
        assert_eq!(s.game.direction(), Heading::Up);
    }

    #[test]
    fn wall_ends_the_game() {
        let mut s = running();
        layout(&mut s, &[(29.0, 5.0), (28.0, 5.0), (27.0, 5.0)], (0.0, 0.0));
        s.tick(&InputState::default(), DT);
        assert_eq!(s.phase(), SessionPhase::Ended);
    }

    #[test]
    fn speeds_up_every_fifty_points() {
        let mut s = running();
        s.stats.score = 40;
        layout(&mut s, &[(10.0, 10.0), (9.0, 10.0), (8.0, 10.0)], (11.0, 10.0));
        s.tick(&InputState::default(), DT);
        assert_eq!(s.stats.score, 50);
        assert_eq!(s.game.interval_ms(), INITIAL_INTERVAL_MS - INTERVAL_STEP_MS);
    }

    #[test]
    fn interval_floors_at_minimum() {
        let mut interval = INITIAL_INTERVAL_MS;
        for _ in 0..100 {
            interval = INTERVAL_RAMP.advance(interval);
        }
        assert_eq!(interval, MIN_INTERVAL_MS);
    }

    #[test]
    fn autopilot_eats_something() {
        let mut s = running();
        for _ in 0..400 {
            let input = s.game.autopilot(&s.world, &s.stats);
            s.tick(&input, DT);
        }
        assert!(s.stats.score >= FOOD_POINTS);
    }
}
