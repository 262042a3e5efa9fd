//! Tetris on a 10x20 board with time-based gravity
//!
//! The board and the falling piece live in the game state; the world stays
//! empty. Each frame carries its real delta and gravity accumulates it.

use glam::Vec2;

use crate::engine::{Action, Game, InputState, Progress, SimRng, Stats, StepContext, Timing, Verdict, World};
use crate::render::{Color, DrawList};
use crate::ui::HudField;

pub mod consts {
    pub const COLS: usize = 10;
    pub const ROWS: usize = 20;
    pub const BLOCK_SIZE: f32 = 30.0;
    pub const BASE_DROP_MS: f32 = 1000.0;
    pub const DROP_MS_PER_LEVEL: f32 = 100.0;
    pub const MIN_DROP_MS: f32 = 100.0;
    /// Points for 1..=4 lines, multiplied by the level
    pub const LINE_POINTS: [u64; 4] = [100, 300, 500, 800];
    pub const SOFT_DROP_POINTS: u64 = 1;
    pub const HARD_DROP_POINTS: u64 = 2;
    pub const LINES_PER_LEVEL: u32 = 10;
}

use consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tetromino {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl Tetromino {
    pub const ALL: [Tetromino; 7] = [
        Tetromino::I,
        Tetromino::J,
        Tetromino::L,
        Tetromino::O,
        Tetromino::S,
        Tetromino::T,
        Tetromino::Z,
    ];

    /// Spawn orientation, row-major
    pub fn shape(self) -> Vec<Vec<bool>> {
        let rows: &[&[u8]] = match self {
            Tetromino::I => &[&[1, 1, 1, 1]],
            Tetromino::J => &[&[1, 0, 0], &[1, 1, 1]],
            Tetromino::L => &[&[0, 0, 1], &[1, 1, 1]],
            Tetromino::O => &[&[1, 1], &[1, 1]],
            Tetromino::S => &[&[0, 1, 1], &[1, 1, 0]],
            Tetromino::T => &[&[0, 1, 0], &[1, 1, 1]],
            Tetromino::Z => &[&[1, 1, 0], &[0, 1, 1]],
        };
        rows.iter().map(|r| r.iter().map(|&c| c == 1).collect()).collect()
    }

    pub fn color(self) -> Color {
        match self {
            Tetromino::I | Tetromino::Z => Color::hex(0xFF006E),
            Tetromino::J => Color::hex(0x8338EC),
            Tetromino::L => Color::hex(0x3A86FF),
            Tetromino::O => Color::hex(0xFFBE0B),
            Tetromino::S => Color::hex(0x06FFA5),
            Tetromino::T => Color::hex(0xFB5607),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    pub kind: Tetromino,
    pub shape: Vec<Vec<bool>>,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    /// Centred on the top row
    pub fn spawn(kind: Tetromino) -> Self {
        let shape = kind.shape();
        let width = shape.first().map_or(0, Vec::len) as i32;
        Self {
            kind,
            shape,
            x: (COLS / 2) as i32 - width / 2,
            y: 0,
        }
    }

    /// Occupied cells in board coordinates
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape.iter().enumerate().flat_map(move |(r, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, filled)| **filled)
                .map(move |(c, _)| (self.x + c as i32, self.y + r as i32))
        })
    }

    /// Clockwise quarter turn
    pub fn rotated(&self) -> Vec<Vec<bool>> {
        let width = self.shape.first().map_or(0, Vec::len);
        (0..width)
            .map(|c| self.shape.iter().rev().map(|row| row[c]).collect())
            .collect()
    }
}

pub type Board = [[Option<Tetromino>; COLS]; ROWS];

#[derive(Debug, Clone)]
pub struct Tetris {
    board: Board,
    piece: Option<Piece>,
    next: Option<Tetromino>,
    lines: u32,
    /// Milliseconds since the last gravity step
    drop_counter: f32,
}

impl Default for Tetris {
    fn default() -> Self {
        Self::new()
    }
}

impl Tetris {
    pub fn new() -> Self {
        Self {
            board: [[None; COLS]; ROWS],
            piece: None,
            next: None,
            lines: 0,
            drop_counter: 0.0,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn piece(&self) -> Option<&Piece> {
        self.piece.as_ref()
    }

    pub fn next(&self) -> Option<Tetromino> {
        self.next
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn drop_interval_ms(level: u32) -> f32 {
        (BASE_DROP_MS - level.saturating_sub(1) as f32 * DROP_MS_PER_LEVEL).max(MIN_DROP_MS)
    }

    pub fn level_for(lines: u32) -> u32 {
        lines / LINES_PER_LEVEL + 1
    }

    fn random_kind(rng: &mut SimRng) -> Tetromino {
        Tetromino::ALL[rng.index(Tetromino::ALL.len())]
    }

    fn collides(&self, shape: &[Vec<bool>], x: i32, y: i32) -> bool {
        shape.iter().enumerate().any(|(r, row)| {
            row.iter().enumerate().any(|(c, &filled)| {
                if !filled {
                    return false;
                }
                let (bx, by) = (x + c as i32, y + r as i32);
                if bx < 0 || bx >= COLS as i32 || by >= ROWS as i32 {
                    return true;
                }
                by >= 0 && self.board[by as usize][bx as usize].is_some()
            })
        })
    }

    /// Next piece becomes current; a blocked spawn ends the run
    fn spawn_piece(&mut self, ctx: &mut StepContext) {
        let kind = self.next.take().unwrap_or_else(|| Self::random_kind(ctx.rng));
        self.next = Some(Self::random_kind(ctx.rng));
        let piece = Piece::spawn(kind);
        let blocked = self.collides(&piece.shape, piece.x, piece.y);
        self.piece = Some(piece);
        if blocked {
            ctx.end(Verdict::Lost);
        }
    }

    fn shift(&mut self, dx: i32) -> bool {
        let Some(piece) = &self.piece else {
            return false;
        };
        if self.collides(&piece.shape, piece.x + dx, piece.y) {
            return false;
        }
        if let Some(piece) = &mut self.piece {
            piece.x += dx;
        }
        true
    }

    fn rotate(&mut self) -> bool {
        let Some(piece) = &self.piece else {
            return false;
        };
        let rotated = piece.rotated();
        if self.collides(&rotated, piece.x, piece.y) {
            return false;
        }
        if let Some(piece) = &mut self.piece {
            piece.shape = rotated;
        }
        true
    }

    /// One row down; on contact the piece locks, lines clear and the next spawns
    fn fall(&mut self, ctx: &mut StepContext) -> bool {
        let Some(piece) = &self.piece else {
            return false;
        };
        if !self.collides(&piece.shape, piece.x, piece.y + 1) {
            if let Some(piece) = &mut self.piece {
                piece.y += 1;
            }
            return true;
        }
        self.lock();
        self.clear_lines(ctx);
        self.spawn_piece(ctx);
        false
    }

    fn hard_drop(&mut self, ctx: &mut StepContext) {
        while self.fall(ctx) {
            ctx.add_score(HARD_DROP_POINTS);
        }
    }

    fn lock(&mut self) {
        let Some(piece) = self.piece.take() else {
            return;
        };
        for (x, y) in piece.cells() {
            if y >= 0 {
                self.board[y as usize][x as usize] = Some(piece.kind);
            }
        }
    }

    fn clear_lines(&mut self, ctx: &mut StepContext) {
        let before = self.board.len();
        let kept: Vec<[Option<Tetromino>; COLS]> = self
            .board
            .iter()
            .filter(|row| row.iter().any(Option::is_none))
            .copied()
            .collect();
        let cleared = before - kept.len();
        if cleared == 0 {
            return;
        }
        let mut board = [[None; COLS]; ROWS];
        board[cleared..].copy_from_slice(&kept);
        self.board = board;

        self.lines += cleared as u32;
        let points = LINE_POINTS[(cleared - 1).min(LINE_POINTS.len() - 1)];
        ctx.add_score(points * u64::from(ctx.stats.level));
    }

    /// Column where a straight drop of the current piece lands lowest
    fn best_column(&self) -> Option<i32> {
        let piece = self.piece.as_ref()?;
        let width = piece.shape.first().map_or(0, Vec::len) as i32;
        (0..=COLS as i32 - width)
            .filter_map(|x| {
                let mut y = piece.y;
                if self.collides(&piece.shape, x, y) {
                    return None;
                }
                while !self.collides(&piece.shape, x, y + 1) {
                    y += 1;
                }
                Some((x, y))
            })
            .max_by_key(|&(x, y)| (y, -x))
            .map(|(x, _)| x)
    }
}

impl Game for Tetris {
    type Kind = ();

    fn name(&self) -> &'static str {
        "tetris"
    }

    fn timing(&self) -> Timing {
        Timing::Variable
    }

    fn initial_lives(&self) -> u32 {
        0
    }

    fn setup(&mut self, _world: &mut World<()>, rng: &mut SimRng) {
        *self = Self::new();
        let first = Self::random_kind(rng);
        self.next = Some(Self::random_kind(rng));
        self.piece = Some(Piece::spawn(first));
    }

    fn apply_input(&mut self, _world: &mut World<()>, input: &InputState, ctx: &mut StepContext) {
        if input.was_pressed(Action::Left) {
            self.shift(-1);
        }
        if input.was_pressed(Action::Right) {
            self.shift(1);
        }
        if input.was_pressed(Action::Up) {
            self.rotate();
        }
        if input.was_pressed(Action::Down) {
            if self.fall(ctx) {
                ctx.add_score(SOFT_DROP_POINTS);
            }
            self.drop_counter = 0.0;
        }
        if input.was_pressed(Action::Primary) {
            self.hard_drop(ctx);
        }
    }

    /// Gravity from accumulated frame time
    fn apply_forces(&mut self, _world: &mut World<()>, ctx: &mut StepContext) {
        self.drop_counter += ctx.dt * 1000.0;
        if self.drop_counter > Self::drop_interval_ms(ctx.stats.level) {
            self.fall(ctx);
            self.drop_counter = 0.0;
        }
    }

    fn evaluate(&mut self, _world: &World<()>, ctx: &StepContext) -> Progress {
        if Self::level_for(self.lines) > ctx.stats.level {
            Progress::NextLevel
        } else {
            Progress::Continue
        }
    }

    fn hud(&self, _world: &World<()>, stats: &Stats) -> Vec<HudField> {
        vec![
            HudField::new("score", stats.score),
            HudField::new("level", stats.level),
            HudField::new("lines", self.lines),
        ]
    }

    fn draw(&self, _world: &World<()>, out: &mut DrawList) {
        out.clear(Color::hex(0x171726));
        let block = |out: &mut DrawList, x: i32, y: i32, color: Color| {
            out.rect(
                Vec2::new(x as f32 * BLOCK_SIZE, y as f32 * BLOCK_SIZE),
                Vec2::splat(BLOCK_SIZE),
                color,
            );
        };
        for (y, row) in self.board.iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                if let Some(kind) = cell {
                    block(out, x as i32, y as i32, kind.color());
                }
            }
        }
        if let Some(piece) = &self.piece {
            for (x, y) in piece.cells() {
                block(out, x, y, piece.kind.color());
            }
        }
    }

    /// Slide to the lowest landing column, then hard drop
    fn autopilot(&self, _world: &World<()>, stats: &Stats) -> InputState {
        let (Some(piece), Some(target)) = (&self.piece, self.best_column()) else {
            return InputState::default();
        };
        // One press every other frame so each lands as a separate key-down
        if stats.ticks % 2 == 1 {
            return InputState::default();
        }
        match piece.x.cmp(&target) {
            std::cmp::Ordering::Less => InputState::press(Action::Right),
            std::cmp::Ordering::Greater => InputState::press(Action::Left),
            std::cmp::Ordering::Equal => InputState::press(Action::Primary),
        }
    }
}
