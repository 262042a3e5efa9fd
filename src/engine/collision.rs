//! Collision detection and resolution effects
//!
//! Two shape kinds cover every game: axis-aligned rectangles and circles.
//! Circle-vs-rectangle is tested against the circle's bounding box. That is an
//! approximation, and the games' bounce behaviour depends on it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityId, EntityKind, Shape, World};
use super::session::Verdict;

/// Axis-aligned box: top-left corner plus size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Aabb {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Bounding box of an entity's shape
    pub fn of<K>(entity: &Entity<K>) -> Self {
        match entity.shape {
            Shape::Rect { w, h } => Self::new(entity.pos.x, entity.pos.y, w, h),
            Shape::Circle { r } => Self::new(entity.pos.x - r, entity.pos.y - r, r * 2.0, r * 2.0),
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Point inside, edges inclusive
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }
}

/// Rectangle overlap: intervals overlap on both axes (touching edges do not)
#[inline]
pub fn rects_overlap(a: &Aabb, b: &Aabb) -> bool {
    a.x < b.x + b.w && a.x + a.w > b.x && a.y < b.y + b.h && a.y + a.h > b.y
}

/// Circle overlap: centre distance strictly less than the radius sum
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance(b) < ra + rb
}

/// Shape overlap between two entities
pub fn shapes_overlap<K>(a: &Entity<K>, b: &Entity<K>) -> bool {
    match (a.shape, b.shape) {
        (Shape::Circle { r: ra }, Shape::Circle { r: rb }) => circles_overlap(a.pos, ra, b.pos, rb),
        _ => rects_overlap(&Aabb::of(a), &Aabb::of(b)),
    }
}

/// Axis of impact for a velocity reflection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

/// Flip the velocity component on the axis of impact
#[inline]
pub fn reflect_axis(vel: Vec2, axis: Axis) -> Vec2 {
    match axis {
        Axis::X => Vec2::new(-vel.x, vel.y),
        Axis::Y => Vec2::new(vel.x, -vel.y),
    }
}

/// One touching pair found by the contact pass. `a` precedes `b` in list order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact<K> {
    pub a: EntityId,
    pub a_kind: K,
    pub b: EntityId,
    pub b_kind: K,
}

impl<K: EntityKind> Contact<K> {
    /// Return the pair ordered so the first id has `kind`, if either side does
    pub fn oriented(&self, kind: K) -> Option<(EntityId, EntityId)> {
        if self.a_kind == kind {
            Some((self.a, self.b))
        } else if self.b_kind == kind {
            Some((self.b, self.a))
        } else {
            None
        }
    }

    /// True when the pair is exactly these two kinds, in either order
    pub fn is(&self, x: K, y: K) -> bool {
        (self.a_kind == x && self.b_kind == y) || (self.a_kind == y && self.b_kind == x)
    }
}

/// Resolution effect produced by a collision policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// Elastic bounce: sign flip on one velocity component
    Reflect { id: EntityId, axis: Axis },
    /// Overwrite an entity's velocity
    SetVelocity { id: EntityId, vel: Vec2 },
    /// Mark an entity not-live
    Kill(EntityId),
    /// Add to the session score
    AddScore(u64),
    /// Remove one life
    LoseLife,
    /// End the session with a verdict
    End(Verdict),
}

impl Effect {
    /// Motion effects apply during collision resolution; the rest are lifecycle
    pub fn is_motion(&self) -> bool {
        matches!(self, Effect::Reflect { .. } | Effect::SetVelocity { .. })
    }
}

/// Find every touching pair among live entities, in stable list order.
///
/// `interacts` filters kind pairs before any geometry runs; `touching` is the
/// shape test (normally [`shapes_overlap`]). There is no early exit, so one
/// entity may appear in several contacts in the same tick.
pub fn find_contacts<K, I, T>(world: &World<K>, interacts: I, touching: T) -> Vec<Contact<K>>
where
    K: EntityKind,
    I: Fn(K, K) -> bool,
    T: Fn(&Entity<K>, &Entity<K>) -> bool,
{
    let entities = world.all();
    let mut contacts = Vec::new();

    for (i, a) in entities.iter().enumerate() {
        if !a.live {
            continue;
        }
        for b in &entities[i + 1..] {
            if !b.live || !interacts(a.kind, b.kind) {
                continue;
            }
            if touching(a, b) {
                contacts.push(Contact {
                    a: a.id,
                    a_kind: a.kind,
                    b: b.id,
                    b_kind: b.kind,
                });
            }
        }
    }

    contacts
}
