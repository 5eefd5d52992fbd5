use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::math::Vec2;
use crate::physics::{BodyDesc, BodyHandle, Physics, PhysicsResult};
use crate::render::{Renderer, SpriteDraw, SpriteKind};

/// Animation clip selected for an entity this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Animation {
    #[default]
    Idle,
    Run,
    Jump,
    Fall,
}

impl Animation {
    pub fn as_str(self) -> &'static str {
        match self {
            Animation::Idle => "idle",
            Animation::Run => "run",
            Animation::Jump => "jump",
            Animation::Fall => "fall",
        }
    }
}

impl std::fmt::Display for Animation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Simulated entity state shared by every object kind.
///
/// The physics backend owns the body; this holds its handle and a copy of
/// the body state read back after the last physics update.
#[derive(Clone, Debug, PartialEq)]
pub struct GameObject {
    handle: BodyHandle,
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: Vec2,
    pub mass: f32,
    pub is_grounded: bool,
    pub current_animation: Animation,
}

impl GameObject {
    /// Register a body and wrap its handle.
    pub fn spawn<P: Physics + ?Sized>(physics: &mut P, desc: BodyDesc) -> PhysicsResult<Self> {
        let handle = physics.register_body(desc)?;
        Ok(Self {
            handle,
            position: desc.position,
            velocity: Vec2::ZERO,
            size: desc.size,
            mass: desc.mass,
            is_grounded: false,
            current_animation: Animation::default(),
        })
    }

    pub fn handle(&self) -> BodyHandle {
        self.handle
    }

    /// Pull position, velocity and grounded state from the physics backend.
    pub fn update<P: Physics + ?Sized>(&mut self, _delta_time: f32, physics: &P) -> PhysicsResult<()> {
        let state = physics.get_state(self.handle)?;
        self.position = state.position;
        self.velocity = state.velocity;
        self.is_grounded = state.is_grounded;
        Ok(())
    }

    pub fn apply_force<P: Physics + ?Sized>(&self, physics: &mut P, force: Vec2) -> PhysicsResult<()> {
        physics.apply_force(self.handle, force)
    }

    /// Draw at the camera-relative position. Returns `false` when culled.
    pub fn render<R: Renderer + ?Sized>(&self, renderer: &mut R, camera: &Camera, kind: SpriteKind) -> bool {
        if !camera.is_in_view(self.position, self.size.x, self.size.y) {
            return false;
        }
        renderer.draw_sprite(&SpriteDraw {
            kind,
            animation: self.current_animation,
            screen_position: camera.world_to_screen(self.position),
            size: self.size,
        });
        true
    }

    /// Deregister the body. Consumes the object so the handle cannot be reused.
    pub fn despawn<P: Physics + ?Sized>(self, physics: &mut P) -> PhysicsResult<()> {
        physics.remove_body(self.handle)
    }
}
