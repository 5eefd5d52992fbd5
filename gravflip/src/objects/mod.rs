//! Game objects and the arena that owns them.
//!
//! Objects live in an [`ObjectArena`] in insertion order, which is also the
//! update and render order. Each one holds the handle of exactly one physics
//! body and deregisters it when removed from the arena.

mod game_object;
mod ground;
mod player;

use log::debug;
use thiserror::Error;

use crate::camera::Camera;
use crate::physics::{Physics, PhysicsResult};
use crate::render::{Renderer, SpriteKind};

pub use game_object::{Animation, GameObject};
pub use ground::GroundSegment;
pub use player::Player;

/// Unique identifier for an object in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u32);

impl ObjectId {
    /// Get the underlying integer ID (useful for debugging).
    pub fn to_u32(self) -> u32 {
        self.0
    }
}

/// Every kind of object the game simulates.
#[derive(Clone, Debug, PartialEq)]
pub enum Entity {
    Player(Player),
    Ground(GroundSegment),
}

impl Entity {
    pub fn object(&self) -> &GameObject {
        match self {
            Entity::Player(player) => &player.object,
            Entity::Ground(ground) => &ground.object,
        }
    }

    pub fn sprite_kind(&self) -> SpriteKind {
        match self {
            Entity::Player(_) => SpriteKind::Player,
            Entity::Ground(_) => SpriteKind::Ground,
        }
    }

    pub fn update<P: Physics + ?Sized>(&mut self, delta_time: f32, physics: &mut P) -> PhysicsResult<()> {
        match self {
            Entity::Player(player) => player.update(delta_time, physics),
            Entity::Ground(ground) => ground.object.update(delta_time, &*physics),
        }
    }

    pub fn render<R: Renderer + ?Sized>(&self, renderer: &mut R, camera: &Camera) -> bool {
        self.object().render(renderer, camera, self.sprite_kind())
    }

    pub fn as_player(&self) -> Option<&Player> {
        match self {
            Entity::Player(player) => Some(player),
            _ => None,
        }
    }

    pub fn as_player_mut(&mut self) -> Option<&mut Player> {
        match self {
            Entity::Player(player) => Some(player),
            _ => None,
        }
    }

    fn into_object(self) -> GameObject {
        match self {
            Entity::Player(player) => player.object,
            Entity::Ground(ground) => ground.object,
        }
    }
}

impl From<Player> for Entity {
    fn from(player: Player) -> Self {
        Entity::Player(player)
    }
}

impl From<GroundSegment> for Entity {
    fn from(ground: GroundSegment) -> Self {
        Entity::Ground(ground)
    }
}

/// Every id up to `u32::MAX` has been handed out.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("object ids exhausted")]
pub struct IdsExhausted;

/// Ordered object container with stable ids.
///
/// Ids strictly increase and are never reused, so `entries` stays sorted by id.
#[derive(Debug)]
pub struct ObjectArena {
    /// `None` once `u32::MAX` has been issued.
    next_id: Option<u32>,
    entries: Vec<(ObjectId, Entity)>,
}

impl Default for ObjectArena {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectArena {
    /// Create a new, empty arena.
    pub fn new() -> Self {
        Self {
            next_id: Some(1),
            entries: Vec::new(),
        }
    }

    /// Append an object and return its id.
    pub fn insert(&mut self, entity: impl Into<Entity>) -> Result<ObjectId, IdsExhausted> {
        let raw = self.next_id.ok_or(IdsExhausted)?;
        self.next_id = raw.checked_add(1);
        let id = ObjectId(raw);
        self.entries.push((id, entity.into()));
        Ok(id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&Entity> {
        self.index_of(id).map(|i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Entity> {
        self.index_of(id).map(move |i| &mut self.entries[i].1)
    }

    pub fn player(&self, id: ObjectId) -> Option<&Player> {
        self.get(id).and_then(Entity::as_player)
    }

    pub fn player_mut(&mut self, id: ObjectId) -> Option<&mut Player> {
        self.get_mut(id).and_then(Entity::as_player_mut)
    }

    /// Remove an object and deregister its body.
    ///
    /// Returns `Ok(false)` if the id is unknown.
    pub fn remove<P: Physics + ?Sized>(&mut self, id: ObjectId, physics: &mut P) -> PhysicsResult<bool> {
        let Some(index) = self.index_of(id) else {
            return Ok(false);
        };
        let (_, entity) = self.entries.remove(index);
        entity.into_object().despawn(physics)?;
        Ok(true)
    }

    /// Remove every object, deregistering all bodies.
    ///
    /// Every body is released even if one of them fails; the first error is returned.
    pub fn clear<P: Physics + ?Sized>(&mut self, physics: &mut P) -> PhysicsResult<()> {
        let count = self.entries.len();
        let mut first_error = None;
        for (_, entity) in self.entries.drain(..) {
            if let Err(err) = entity.into_object().despawn(physics) {
                first_error.get_or_insert(err);
            }
        }
        if count > 0 {
            debug!("cleared {count} objects");
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &Entity)> {
        self.entries.iter().map(|(id, entity)| (*id, entity))
    }

    /// Iterate mutably in insertion order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ObjectId, &mut Entity)> {
        self.entries.iter_mut().map(|(id, entity)| (*id, entity))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.entries.binary_search_by_key(&id, |(i, _)| *i).ok()
    }
}
