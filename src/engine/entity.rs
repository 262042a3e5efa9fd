//! Entities and the per-session world that owns them
//!
//! Removal is two-phase: an entity is marked not-live during the tick and
//! purged at the end of the tick, so nothing is deleted from the list while a
//! pass is scanning it. Spawns requested mid-tick are queued and appended by
//! the same purge.

use std::fmt::Debug;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Marker for the per-game entity kind enum.
pub trait EntityKind: Copy + Eq + Debug {}

impl<T: Copy + Eq + Debug> EntityKind for T {}

/// Unique id of an entity within one session (never reused)
pub type EntityId = u32;

/// Collision/render shape of an entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Axis-aligned rectangle; the entity position is its top-left corner
    Rect { w: f32, h: f32 },
    /// Circle; the entity position is its centre
    Circle { r: f32 },
}

impl Shape {
    pub fn rect(w: f32, h: f32) -> Self {
        Shape::Rect { w, h }
    }

    pub fn circle(r: f32) -> Self {
        Shape::Circle { r }
    }
}

/// A simulated object: paddle, ball, brick, meteor, platform, enemy, ...
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity<K> {
    pub id: EntityId,
    pub kind: K,
    pub pos: Vec2,
    pub vel: Vec2,
    pub shape: Shape,
    /// Cleared to remove the entity at the end of the tick
    pub live: bool,
    /// Visual rotation (radians), never used by collision
    #[serde(default)]
    pub rotation: f32,
}

impl<K> Entity<K> {
    /// Width of the entity's bounding box
    pub fn width(&self) -> f32 {
        match self.shape {
            Shape::Rect { w, .. } => w,
            Shape::Circle { r } => r * 2.0,
        }
    }

    /// Height of the entity's bounding box
    pub fn height(&self) -> f32 {
        match self.shape {
            Shape::Rect { h, .. } => h,
            Shape::Circle { r } => r * 2.0,
        }
    }

    /// Centre point regardless of shape
    pub fn center(&self) -> Vec2 {
        match self.shape {
            Shape::Rect { w, h } => self.pos + Vec2::new(w, h) * 0.5,
            Shape::Circle { .. } => self.pos,
        }
    }

    /// Set the rectangle width, keeping height. No-op on circles.
    pub fn set_width(&mut self, width: f32) {
        if let Shape::Rect { w, .. } = &mut self.shape {
            *w = width;
        }
    }
}

/// Blueprint for a queued spawn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spawn<K> {
    pub kind: K,
    pub pos: Vec2,
    pub vel: Vec2,
    pub shape: Shape,
}

impl<K> Spawn<K> {
    pub fn new(kind: K, pos: Vec2, shape: Shape) -> Self {
        Self {
            kind,
            pos,
            vel: Vec2::ZERO,
            shape,
        }
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }
}

/// All entities for one playthrough, in stable insertion order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World<K> {
    entities: Vec<Entity<K>>,
    pending: Vec<Spawn<K>>,
    next_id: EntityId,
}

impl<K> Default for World<K> {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
            pending: Vec::new(),
            next_id: 1,
        }
    }
}

impl<K: EntityKind> World<K> {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Insert immediately. Never call this from inside the contact pass.
    pub fn spawn_now(&mut self, spawn: Spawn<K>) -> EntityId {
        let id = self.allocate_id();
        self.entities.push(Entity {
            id,
            kind: spawn.kind,
            pos: spawn.pos,
            vel: spawn.vel,
            shape: spawn.shape,
            live: true,
            rotation: 0.0,
        });
        id
    }

    /// Queue a spawn; it joins the world at the next purge
    pub fn spawn(&mut self, spawn: Spawn<K>) {
        self.pending.push(spawn);
    }

    /// Number of spawns waiting for the next purge
    pub fn pending_spawns(&self) -> usize {
        self.pending.len()
    }

    /// Mark an entity not-live. Returns false if it was already dead or unknown.
    pub fn kill(&mut self, id: EntityId) -> bool {
        match self.entities.iter_mut().find(|e| e.id == id) {
            Some(e) if e.live => {
                e.live = false;
                true
            }
            _ => false,
        }
    }

    /// Drop not-live entities and append queued spawns
    pub fn purge(&mut self) {
        self.entities.retain(|e| e.live);
        let pending = std::mem::take(&mut self.pending);
        for spawn in pending {
            self.spawn_now(spawn);
        }
    }

    /// Remove every entity of a kind immediately (level rebuilds)
    pub fn remove_kind(&mut self, kind: K) {
        self.entities.retain(|e| e.kind != kind);
        self.pending.retain(|s| s.kind != kind);
    }

    pub fn clear(&mut self) {
        self.entities.clear();
        self.pending.clear();
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity<K>> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity<K>> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    /// Every entity including ones marked for removal
    pub fn all(&self) -> &[Entity<K>] {
        &self.entities
    }

    pub fn all_mut(&mut self) -> &mut [Entity<K>] {
        &mut self.entities
    }

    /// Live entities in list order
    pub fn live(&self) -> impl Iterator<Item = &Entity<K>> {
        self.entities.iter().filter(|e| e.live)
    }

    /// Live entities of one kind in list order
    pub fn by_kind(&self, kind: K) -> impl Iterator<Item = &Entity<K>> {
        self.entities.iter().filter(move |e| e.live && e.kind == kind)
    }

    pub fn by_kind_mut(&mut self, kind: K) -> impl Iterator<Item = &mut Entity<K>> {
        self.entities
            .iter_mut()
            .filter(move |e| e.live && e.kind == kind)
    }

    /// First live entity of a kind (the player, the paddle, ...)
    pub fn first(&self, kind: K) -> Option<&Entity<K>> {
        self.by_kind(kind).next()
    }

    pub fn first_mut(&mut self, kind: K) -> Option<&mut Entity<K>> {
        self.by_kind_mut(kind).next()
    }

    pub fn count(&self, kind: K) -> usize {
        self.by_kind(kind).count()
    }
}
