//! Gravflip - simulation core for a gravity-flipping 2D platformer.
//!
//! The core talks to the outside world only through four ports:
//! [`Physics`], [`InputSource`], [`Clock`] and [`Renderer`]. Backends are
//! picked by whoever builds the [`Game`].

pub mod camera;
pub mod config;
pub mod game;
pub mod input;
pub mod math;
pub mod menu;
pub mod objects;
pub mod physics;
pub mod render;
pub mod time;

pub use crate::camera::Camera;
pub use crate::config::{GameConfig, WorldBounds};
pub use crate::game::{Game, GameState, MenuAction};
pub use crate::input::{InputSource, KeyboardInput, LogicalKey, ScriptedInput};
pub use crate::math::Vec2;
pub use crate::menu::{Menu, SelectionMode};
pub use crate::objects::{Animation, Entity, GameObject, GroundSegment, IdsExhausted, ObjectArena, ObjectId, Player};
pub use crate::physics::{
    BodyDesc, BodyHandle, BodyState, Physics, PhysicsBackend, PhysicsEngine, PhysicsError, RapierPhysics,
};
pub use crate::render::{RecordingRenderer, Renderer};
pub use crate::time::{Clock, FixedClock, SystemClock};
