//! Space Invaders: a marching 4x10 alien block, player cannon, falling bombs

use glam::Vec2;

use crate::engine::{
    Action, Aabb, BestSpec, Contact, Effect, Entity, EntityId, Game, InputState, Progress, Shape, SimRng, Spawn,
    SpawnTimer, Stats, StepContext, Verdict, World,
};
use crate::highscores::BestOrder;
use crate::render::{Color, DrawList};
use crate::ui::HudField;

pub mod consts {
    pub const WIDTH: f32 = 800.0;
    pub const HEIGHT: f32 = 600.0;

    pub const PLAYER_WIDTH: f32 = 50.0;
    pub const PLAYER_HEIGHT: f32 = 35.0;
    pub const PLAYER_Y: f32 = HEIGHT - 80.0;
    pub const PLAYER_SPEED: f32 = 6.0;

    pub const ALIEN_ROWS: u8 = 4;
    pub const ALIEN_COLS: usize = 10;
    pub const ALIEN_WIDTH: f32 = 40.0;
    pub const ALIEN_HEIGHT: f32 = 30.0;
    pub const ALIEN_SPACING: f32 = 15.0;
    pub const ALIEN_START: (f32, f32) = (100.0, 80.0);
    /// Horizontal step per march, multiplied by the alien speed
    pub const ALIEN_STEP: f32 = 10.0;
    pub const ALIEN_DROP: f32 = 10.0;
    pub const ALIEN_BASE_SPEED: f32 = 1.0;
    pub const ALIEN_SPEEDUP: f32 = 0.5;
    /// March interval in ticks is max(BASE - PER_LEVEL * level, MIN)
    pub const MARCH_BASE_TICKS: f32 = 20.0;
    pub const MARCH_PER_LEVEL_TICKS: f32 = 2.0;
    pub const MARCH_MIN_TICKS: f32 = 5.0;

    pub const BULLET_WIDTH: f32 = 4.0;
    pub const BULLET_HEIGHT: f32 = 15.0;
    pub const BULLET_SPEED: f32 = 8.0;
    pub const MAX_BULLETS: usize = 3;

    pub const BOMB_WIDTH: f32 = 4.0;
    pub const BOMB_HEIGHT: f32 = 10.0;
    pub const BOMB_SPEED: f32 = 4.0;
    pub const BOMB_INTERVAL_TICKS: f32 = 60.0;
    pub const BOMB_CHANCE: f32 = 0.3;

    pub const LIVES: u32 = 3;
    pub const BEST_KEY: &str = "spaceInvadersHighScore";
}

use consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Player,
    /// Row 0 is the top row
    Alien(u8),
    Bullet,
    Bomb,
}

impl Kind {
    pub fn is_alien(self) -> bool {
        matches!(self, Kind::Alien(_))
    }

    /// Points for destroying an alien of this kind
    pub fn points(self) -> u64 {
        match self {
            Kind::Alien(row) => u64::from(ALIEN_ROWS.saturating_sub(row)) * 10,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpaceInvaders {
    lives: u32,
    direction: f32,
    alien_speed: f32,
    march: SpawnTimer,
    bombs: SpawnTimer,
}

impl Default for SpaceInvaders {
    fn default() -> Self {
        Self::new()
    }
}

impl SpaceInvaders {
    pub fn new() -> Self {
        Self::with_lives(LIVES)
    }

    pub fn with_lives(lives: u32) -> Self {
        Self {
            lives,
            direction: 1.0,
            alien_speed: ALIEN_BASE_SPEED,
            march: SpawnTimer::new(Self::march_interval(1)),
            bombs: SpawnTimer::new(BOMB_INTERVAL_TICKS),
        }
    }

    pub fn alien_speed(&self) -> f32 {
        self.alien_speed
    }

    pub fn march_interval(level: u32) -> f32 {
        (MARCH_BASE_TICKS - MARCH_PER_LEVEL_TICKS * level as f32).max(MARCH_MIN_TICKS)
    }

    pub fn aliens(world: &World<Kind>) -> impl Iterator<Item = &Entity<Kind>> {
        world.live().filter(|e| e.kind.is_alien())
    }

    fn build_aliens(&mut self, world: &mut World<Kind>) {
        self.direction = 1.0;
        for row in 0..ALIEN_ROWS {
            for col in 0..ALIEN_COLS {
                let pos = Vec2::new(
                    ALIEN_START.0 + col as f32 * (ALIEN_WIDTH + ALIEN_SPACING),
                    ALIEN_START.1 + row as f32 * (ALIEN_HEIGHT + ALIEN_SPACING),
                );
                world.spawn_now(Spawn::new(Kind::Alien(row), pos, Shape::rect(ALIEN_WIDTH, ALIEN_HEIGHT)));
            }
        }
    }

    /// One step of the block; returns true if an alien reached the player row
    fn march(&mut self, world: &mut World<Kind>) -> bool {
        let player_y = world.first(Kind::Player).map_or(PLAYER_Y, |p| p.pos.y);
        let dx = self.direction * self.alien_speed * ALIEN_STEP;
        let mut hit_edge = false;
        let mut landed = false;
        for alien in world.all_mut().iter_mut().filter(|e| e.live && e.kind.is_alien()) {
            alien.pos.x += dx;
            if alien.pos.x <= 0.0 || alien.pos.x + ALIEN_WIDTH >= WIDTH {
                hit_edge = true;
            }
            if alien.pos.y + ALIEN_HEIGHT >= player_y {
                landed = true;
            }
        }
        if hit_edge {
            self.direction = -self.direction;
            for alien in world.all_mut().iter_mut().filter(|e| e.live && e.kind.is_alien()) {
                alien.pos.y += ALIEN_DROP;
            }
        }
        landed
    }

    fn drop_bomb(world: &mut World<Kind>, rng: &mut SimRng) {
        let shooters: Vec<Vec2> = Self::aliens(world).map(|a| a.pos).collect();
        if shooters.is_empty() || !rng.chance(BOMB_CHANCE) {
            return;
        }
        let from = shooters[rng.index(shooters.len())];
        let pos = Vec2::new(from.x + ALIEN_WIDTH / 2.0 - BOMB_WIDTH / 2.0, from.y + ALIEN_HEIGHT);
        world.spawn(
            Spawn::new(Kind::Bomb, pos, Shape::rect(BOMB_WIDTH, BOMB_HEIGHT)).with_velocity(Vec2::new(0.0, BOMB_SPEED)),
        );
    }

    fn pair(contact: &Contact<Kind>, kind: Kind) -> Option<(EntityId, EntityId, Kind)> {
        if contact.a_kind == kind {
            Some((contact.a, contact.b, contact.b_kind))
        } else if contact.b_kind == kind {
            Some((contact.b, contact.a, contact.a_kind))
        } else {
            None
        }
    }
}

impl Game for SpaceInvaders {
    type Kind = Kind;

    fn name(&self) -> &'static str {
        "space-invaders"
    }

    fn initial_lives(&self) -> u32 {
        self.lives
    }

    fn setup(&mut self, world: &mut World<Kind>, _rng: &mut SimRng) {
        world.spawn_now(Spawn::new(
            Kind::Player,
            Vec2::new(WIDTH / 2.0 - PLAYER_WIDTH / 2.0, PLAYER_Y),
            Shape::rect(PLAYER_WIDTH, PLAYER_HEIGHT),
        ));
        self.build_aliens(world);
    }

    fn apply_input(&mut self, world: &mut World<Kind>, input: &InputState, _ctx: &mut StepContext) {
        let Some(player) = world.first_mut(Kind::Player) else {
            return;
        };
        if input.is_held(Action::Left) {
            player.pos.x = (player.pos.x - PLAYER_SPEED).max(0.0);
        }
        if input.is_held(Action::Right) {
            player.pos.x = (player.pos.x + PLAYER_SPEED).min(WIDTH - PLAYER_WIDTH);
        }
        let muzzle = Vec2::new(player.pos.x + PLAYER_WIDTH / 2.0 - BULLET_WIDTH / 2.0, player.pos.y);

        if input.was_pressed(Action::Primary) && world.count(Kind::Bullet) < MAX_BULLETS {
            world.spawn_now(
                Spawn::new(Kind::Bullet, muzzle, Shape::rect(BULLET_WIDTH, BULLET_HEIGHT))
                    .with_velocity(Vec2::new(0.0, -BULLET_SPEED)),
            );
        }
    }

    fn integrates(&self, kind: Kind) -> bool {
        matches!(kind, Kind::Bullet | Kind::Bomb)
    }

    /// The alien block marches on its own clock
    fn apply_forces(&mut self, world: &mut World<Kind>, ctx: &mut StepContext) {
        let interval = Self::march_interval(ctx.stats.level);
        if self.march.tick(1.0, interval) && self.march(world) {
            ctx.end(Verdict::Lost);
        }
    }

    fn interacts(&self, a: Kind, b: Kind) -> bool {
        let hits = |x: Kind, y: Kind| (x == Kind::Bullet && y.is_alien()) || (x == Kind::Bomb && y == Kind::Player);
        hits(a, b) || hits(b, a)
    }

    fn touching(&self, a: &Entity<Kind>, b: &Entity<Kind>) -> bool {
        let (shot, target) = if matches!(a.kind, Kind::Bullet | Kind::Bomb) { (a, b) } else { (b, a) };
        match shot.kind {
            // The bullet's corner point inside the alien, edges inclusive
            Kind::Bullet => Aabb::of(target).contains(shot.pos),
            // Bomb centre line within the cannon span once its tip reaches the cannon's top
            Kind::Bomb => {
                let x = shot.pos.x + BOMB_WIDTH / 2.0;
                shot.pos.y + BOMB_HEIGHT >= target.pos.y && x >= target.pos.x && x <= target.pos.x + target.width()
            }
            _ => false,
        }
    }

    fn resolve(&mut self, contact: &Contact<Kind>, _world: &World<Kind>, ctx: &mut StepContext) {
        if let Some((bullet, alien, kind)) = Self::pair(contact, Kind::Bullet) {
            ctx.emit(Effect::Kill(alien));
            ctx.emit(Effect::Kill(bullet));
            ctx.add_score(kind.points());
        } else if let Some((bomb, _, _)) = Self::pair(contact, Kind::Bomb) {
            ctx.emit(Effect::Kill(bomb));
            ctx.lose_life();
        }
    }

    fn after_collisions(&mut self, world: &mut World<Kind>, ctx: &mut StepContext) {
        let gone: Vec<EntityId> = world
            .live()
            .filter(|e| (e.kind == Kind::Bullet && e.pos.y < 0.0) || (e.kind == Kind::Bomb && e.pos.y > HEIGHT))
            .map(|e| e.id)
            .collect();
        for id in gone {
            world.kill(id);
        }

        if self.bombs.tick(1.0, BOMB_INTERVAL_TICKS) {
            Self::drop_bomb(world, ctx.rng);
        }
    }

    fn evaluate(&mut self, world: &World<Kind>, _ctx: &StepContext) -> Progress {
        if Self::aliens(world).next().is_none() {
            Progress::NextLevel
        } else {
            Progress::Continue
        }
    }

    fn next_level(&mut self, world: &mut World<Kind>, ctx: &mut StepContext) {
        self.alien_speed += ALIEN_SPEEDUP;
        self.march.reset(Self::march_interval(ctx.stats.level));
        world.remove_kind(Kind::Bullet);
        world.remove_kind(Kind::Bomb);
        for row in 0..ALIEN_ROWS {
            world.remove_kind(Kind::Alien(row));
        }
        self.build_aliens(world);
    }

    fn hud(&self, _world: &World<Kind>, stats: &Stats) -> Vec<HudField> {
        vec![
            HudField::new("score", stats.score),
            HudField::new("level", stats.level),
            HudField::new("lives", stats.lives),
        ]
    }

    fn draw(&self, world: &World<Kind>, out: &mut DrawList) {
        out.clear(Color::hex(0x121F1F));
        for e in world.live() {
            let size = Vec2::new(e.width(), e.height());
            match e.kind {
                Kind::Player => {
                    out.rect(e.pos, size, Color::hex(0x06FFA5));
                    out.rect(
                        Vec2::new(e.pos.x + PLAYER_WIDTH / 2.0 - 3.0, e.pos.y + PLAYER_HEIGHT),
                        Vec2::new(6.0, 8.0),
                        Color::hex(0xFFBE0B),
                    );
                }
                Kind::Alien(_) => {
                    out.rect(e.pos, size, Color::hex(0x06FFA5));
                    out.circle(e.pos + Vec2::new(12.0, 10.0), 4.0, Color::hex(0xFF006E));
                    out.circle(e.pos + Vec2::new(28.0, 10.0), 4.0, Color::hex(0xFF006E));
                }
                Kind::Bullet => out.rect(e.pos, size, Color::hex(0xFFBE0B)),
                Kind::Bomb => out.rect(e.pos, size, Color::hex(0xFF006E)),
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

    /// Sit under the nearest alien column and keep firing
    fn autopilot(&self, world: &World<Kind>, stats: &Stats) -> InputState {
        let Some(player) = world.first(Kind::Player) else {
            return InputState::default();
        };
        let cx = player.center().x;
        let target = Self::aliens(world)
            .map(|a| a.center().x)
            .min_by(|a, b| (a - cx).abs().total_cmp(&(b - cx).abs()));
        let mut input = match target {
            Some(x) if x < cx - 4.0 => InputState::holding(&[Action::Left]),
            Some(x) if x > cx + 4.0 => InputState::holding(&[Action::Right]),
            _ => InputState::default(),
        };
        if stats.ticks % 10 == 0 {
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

    fn running(game: SpaceInvaders) -> Session<SpaceInvaders> {
        let mut s = Session::new(game, 8);
        s.start();
        s
    }

    fn alien_positions(s: &Session<SpaceInvaders>) -> Vec<Vec2> {
        SpaceInvaders::aliens(&s.world).map(|a| a.pos).collect()
    }

    #[test]
    fn setup_layout() {
        let s = Session::new(SpaceInvaders::new(), 1);
        assert_eq!(SpaceInvaders::aliens(&s.world).count(), 40);
        assert_eq!(s.world.first(Kind::Player).unwrap().pos, Vec2::new(375.0, 520.0));
        assert_eq!(Kind::Alien(0).points(), 40);
        assert_eq!(Kind::Alien(3).points(), 10);
        assert_eq!(alien_positions(&s)[0], Vec2::new(100.0, 80.0));
        assert_eq!(alien_positions(&s)[1], Vec2::new(155.0, 80.0));
    }

    #[test]
    fn at_most_three_bullets() {
        let mut s = running(SpaceInvaders::new());
        for _ in 0..5 {
            s.tick(&InputState::press(Action::Primary), DT);
        }
        assert_eq!(s.world.count(Kind::Bullet), MAX_BULLETS);
    }

    #[test]
    fn bullet_kills_alien_and_scores_by_row() {
        let mut s = running(SpaceInvaders::new());
        let target = SpaceInvaders::aliens(&s.world).last().map(|a| (a.id, a.pos, a.kind)).unwrap();
        let (id, pos, kind) = target;
        assert_eq!(kind, Kind::Alien(3));
        // One tick of travel puts the bullet tip inside the alien
        s.world.spawn_now(
            Spawn::new(Kind::Bullet, pos + Vec2::new(5.0, ALIEN_HEIGHT + 4.0), Shape::rect(BULLET_WIDTH, BULLET_HEIGHT))
                .with_velocity(Vec2::new(0.0, -BULLET_SPEED)),
        );
        s.tick(&InputState::default(), DT);
        assert!(s.world.get(id).is_none());
        assert_eq!(s.stats.score, 10);
        assert_eq!(s.world.count(Kind::Bullet), 0);
    }

    #[test]
    fn block_marches_on_interval() {
        let mut s = running(SpaceInvaders::new());
        let start = alien_positions(&s)[0];
        let interval = SpaceInvaders::march_interval(1) as usize;
        assert_eq!(interval, 18);
        for _ in 0..interval - 1 {
            s.tick(&InputState::default(), DT);
        }
        assert_eq!(alien_positions(&s)[0], start);
        s.tick(&InputState::default(), DT);
        assert_eq!(alien_positions(&s)[0], start + Vec2::new(10.0, 0.0));
    }

    #[test]
    fn march_interval_floors() {
        assert_eq!(SpaceInvaders::march_interval(2), 16.0);
        assert_eq!(SpaceInvaders::march_interval(8), 5.0);
        assert_eq!(SpaceInvaders::march_interval(30), 5.0);
    }

    #[test]
    fn edge_reverses_and_drops() {
        let mut game = SpaceInvaders::new();
        let mut world = World::new();
        let mut rng = SimRng::new(1);
        game.setup(&mut world, &mut rng);
        // Rightmost column starts at 595; ten steps to the wall
        let mut steps = 0;
        while game.direction > 0.0 {
            game.march(&mut world);
            steps += 1;
            assert!(steps < 100);
        }
        let first = SpaceInvaders::aliens(&world).next().unwrap().pos;
        assert_eq!(first.y, 80.0 + ALIEN_DROP);
        game.march(&mut world);
        let after = SpaceInvaders::aliens(&world).next().unwrap().pos;
        assert_eq!(after.x, first.x - ALIEN_STEP);
    }

    #[test]
    fn bomb_costs_a_life() {
        let mut s = running(SpaceInvaders::new());
        let player = s.world.first(Kind::Player).unwrap().pos;
        s.world.spawn_now(
            Spawn::new(Kind::Bomb, Vec2::new(player.x + 20.0, player.y - 12.0), Shape::rect(BOMB_WIDTH, BOMB_HEIGHT))
                .with_velocity(Vec2::new(0.0, BOMB_SPEED)),
        );
        s.tick(&InputState::default(), DT);
        assert_eq!(s.stats.lives, 2);
        assert_eq!(s.world.count(Kind::Bomb), 0);
        assert_eq!(s.phase(), SessionPhase::Running);
    }

    #[test]
    fn last_life_ends() {
        let mut s = running(SpaceInvaders::with_lives(1));
        let player = s.world.first(Kind::Player).unwrap().pos;
        s.world.spawn_now(
            Spawn::new(Kind::Bomb, Vec2::new(player.x + 20.0, player.y - 12.0), Shape::rect(BOMB_WIDTH, BOMB_HEIGHT))
                .with_velocity(Vec2::new(0.0, BOMB_SPEED)),
        );
        s.tick(&InputState::default(), DT);
        assert_eq!(s.outcome().map(|o| o.verdict), Some(Verdict::Lost));
    }

    #[test]
    fn reaching_player_row_ends() {
        let mut s = running(SpaceInvaders::new());
        for alien in s.world.all_mut().iter_mut().filter(|e| e.kind.is_alien()) {
            alien.pos.y += 400.0;
        }
        for _ in 0..18 {
            s.tick(&InputState::default(), DT);
        }
        assert_eq!(s.phase(), SessionPhase::Ended);
    }

    #[test]
    fn clearing_block_advances_level() {
        let mut s = running(SpaceInvaders::new());
        s.tick(&InputState::press(Action::Primary), DT);
        let ids: Vec<_> = SpaceInvaders::aliens(&s.world).map(|a| a.id).collect();
        for id in ids {
            s.world.kill(id);
        }
        s.tick(&InputState::default(), DT);
        assert_eq!(s.stats.level, 2);
        assert_eq!(s.game.alien_speed(), ALIEN_BASE_SPEED + ALIEN_SPEEDUP);
        assert_eq!(SpaceInvaders::aliens(&s.world).count(), 40);
        assert_eq!(s.world.count(Kind::Bullet), 0);
    }

    #[test]
    fn new_wave_marches_on_a_full_interval() {
        let mut s = running(SpaceInvaders::new());
        for _ in 0..10 {
            s.tick(&InputState::default(), DT);
        }
        let ids: Vec<_> = SpaceInvaders::aliens(&s.world).map(|a| a.id).collect();
        for id in ids {
            s.world.kill(id);
        }
        s.tick(&InputState::default(), DT);
        assert_eq!(s.stats.level, 2);

        let start = alien_positions(&s)[0];
        let interval = SpaceInvaders::march_interval(2) as usize;
        for _ in 0..interval - 1 {
            s.tick(&InputState::default(), DT);
        }
        assert_eq!(alien_positions(&s)[0], start);
        s.tick(&InputState::default(), DT);
        assert_eq!(alien_positions(&s)[0].x, start.x + ALIEN_STEP * s.game.alien_speed());
    }
}
