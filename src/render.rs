//! Render surface boundary
//!
//! Games turn a read-only view of their state into a list of drawing
//! primitives. What paints them (canvas, GPU, terminal) lives outside the
//! engine.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// RGBA color, components 0-1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color(pub [f32; 4]);

impl Color {
    pub const WHITE: Color = Color([1.0, 1.0, 1.0, 1.0]);
    pub const BLACK: Color = Color([0.0, 0.0, 0.0, 1.0]);

    /// From a 0xRRGGBB literal
    pub const fn hex(rgb: u32) -> Self {
        Color([
            ((rgb >> 16) & 0xff) as f32 / 255.0,
            ((rgb >> 8) & 0xff) as f32 / 255.0,
            (rgb & 0xff) as f32 / 255.0,
            1.0,
        ])
    }

    pub fn with_alpha(self, alpha: f32) -> Self {
        let [r, g, b, _] = self.0;
        Color([r, g, b, alpha])
    }

    /// Shift brightness by `amount` (in 0-255 steps), clamped per channel
    pub fn adjust(self, amount: f32) -> Self {
        let [r, g, b, a] = self.0;
        let shift = amount / 255.0;
        Color([
            (r + shift).clamp(0.0, 1.0),
            (g + shift).clamp(0.0, 1.0),
            (b + shift).clamp(0.0, 1.0),
            a,
        ])
    }
}

/// One drawing primitive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    Clear(Color),
    /// Filled rectangle, top-left origin, rotated about its centre
    Rect {
        pos: Vec2,
        size: Vec2,
        color: Color,
        rotation: f32,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    Text {
        pos: Vec2,
        text: String,
        color: Color,
    },
}

/// Primitives for one frame, in paint order
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self, color: Color) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear(color));
    }

    pub fn rect(&mut self, pos: Vec2, size: Vec2, color: Color) {
        self.rotated_rect(pos, size, color, 0.0);
    }

    pub fn rotated_rect(&mut self, pos: Vec2, size: Vec2, color: Color, rotation: f32) {
        self.commands.push(DrawCommand::Rect {
            pos,
            size,
            color,
            rotation,
        });
    }

    pub fn circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::Circle { center, radius, color });
    }

    pub fn text(&mut self, pos: Vec2, text: impl Into<String>, color: Color) {
        self.commands.push(DrawCommand::Text {
            pos,
            text: text.into(),
            color,
        });
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Anything that can paint a `DrawList`
pub trait RenderSurface {
    fn present(&mut self, frame: &DrawList);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors() {
        let c = Color::hex(0xFF006E);
        assert_eq!(c.0[0], 1.0);
        assert_eq!(c.0[1], 0.0);
        assert!((c.0[2] - 110.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn adjust_clamps() {
        let c = Color::hex(0xFFFFFF).adjust(40.0);
        assert_eq!(c, Color::WHITE);
        let d = Color::hex(0x000000).adjust(-20.0);
        assert_eq!(d, Color::BLACK);
    }

    #[test]
    fn clear_starts_a_new_frame() {
        let mut list = DrawList::new();
        list.circle(Vec2::ZERO, 1.0, Color::WHITE);
        list.clear(Color::BLACK);
        assert_eq!(list.len(), 1);
    }
}
