//! Physics port and the backends that implement it.
//!
//! Game code only talks to [`Physics`]. Bodies are owned by the backend and
//! referenced through opaque [`BodyHandle`]s; nothing outside a backend
//! mutates a body directly.

mod engine;
mod rapier_backend;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::Vec2;

pub use engine::PhysicsEngine;
pub use rapier_backend::RapierPhysics;

/// Opaque handle to a body registered with a physics backend.
///
/// Handles are issued in increasing order and never reused, so ordering by
/// handle is ordering by registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub(crate) u32);

impl BodyHandle {
    /// Get the underlying integer ID (useful for debugging).
    pub fn to_u32(self) -> u32 {
        self.0
    }
}

/// Everything a backend needs to create a body.
///
/// `position` is the top-left corner of the box, `size` its width and height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyDesc {
    pub position: Vec2,
    pub size: Vec2,
    pub mass: f32,
    pub is_static: bool,
}

impl BodyDesc {
    /// A moving body.
    pub fn dynamic(position: Vec2, size: Vec2, mass: f32) -> Self {
        Self {
            position,
            size,
            mass,
            is_static: false,
        }
    }

    /// An immovable body with infinite mass.
    pub fn fixed(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            size,
            mass: f32::INFINITY,
            is_static: true,
        }
    }

    pub(crate) fn validate(&self) -> PhysicsResult<()> {
        if !self.position.is_finite() {
            return Err(PhysicsError::InvalidBody {
                reason: format!("non-finite position {:?}", self.position),
            });
        }
        if !(self.size.x > 0.0 && self.size.y > 0.0) || !self.size.is_finite() {
            return Err(PhysicsError::InvalidBody {
                reason: format!("size must be positive, got {:?}", self.size),
            });
        }
        if !self.is_static && !(self.mass > 0.0 && self.mass.is_finite()) {
            return Err(PhysicsError::InvalidBody {
                reason: format!("dynamic body mass must be positive and finite, got {}", self.mass),
            });
        }
        Ok(())
    }
}

/// Read-back snapshot of a body after the last `update`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BodyState {
    pub position: Vec2,
    pub velocity: Vec2,
    pub is_grounded: bool,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    #[error("no body registered for handle {0:?}")]
    InvalidHandle(BodyHandle),
    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },
}

pub type PhysicsResult<T> = Result<T, PhysicsError>;

/// Selects which backend the composition root builds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhysicsBackend {
    #[default]
    Aabb,
    Rapier,
}

/// The physics capability consumed by the game core.
pub trait Physics {
    /// Add a body to the world. Static bodies never move.
    fn register_body(&mut self, desc: BodyDesc) -> PhysicsResult<BodyHandle>;

    /// Remove a body. The handle is invalid afterwards.
    fn remove_body(&mut self, handle: BodyHandle) -> PhysicsResult<()>;

    /// Accumulate a force, integrated on the next `update` and then cleared.
    fn apply_force(&mut self, handle: BodyHandle, force: Vec2) -> PhysicsResult<()>;

    /// Overwrite a body's velocity.
    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> PhysicsResult<()>;

    /// Negate the world gravity vector.
    fn flip_gravity(&mut self);

    fn gravity(&self) -> Vec2;

    /// Advance the simulation by `delta_time` seconds.
    fn update(&mut self, delta_time: f32);

    fn get_state(&self, handle: BodyHandle) -> PhysicsResult<BodyState>;

    fn body_count(&self) -> usize;

    /// Release backend resources. Backends without any keep the default.
    fn cleanup(&mut self) {}
}

impl<P: Physics + ?Sized> Physics for Box<P> {
    fn register_body(&mut self, desc: BodyDesc) -> PhysicsResult<BodyHandle> {
        (**self).register_body(desc)
    }

    fn remove_body(&mut self, handle: BodyHandle) -> PhysicsResult<()> {
        (**self).remove_body(handle)
    }

    fn apply_force(&mut self, handle: BodyHandle, force: Vec2) -> PhysicsResult<()> {
        (**self).apply_force(handle, force)
    }

    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> PhysicsResult<()> {
        (**self).set_velocity(handle, velocity)
    }

    fn flip_gravity(&mut self) {
        (**self).flip_gravity()
    }

    fn gravity(&self) -> Vec2 {
        (**self).gravity()
    }

    fn update(&mut self, delta_time: f32) {
        (**self).update(delta_time)
    }

    fn get_state(&self, handle: BodyHandle) -> PhysicsResult<BodyState> {
        (**self).get_state(handle)
    }

    fn body_count(&self) -> usize {
        (**self).body_count()
    }

    fn cleanup(&mut self) {
        (**self).cleanup()
    }
}

/// Build the backend selected in config.
pub fn create_backend(
    backend: PhysicsBackend,
    config: &crate::config::PhysicsConfig,
) -> Box<dyn Physics> {
    match backend {
        PhysicsBackend::Aabb => Box::new(PhysicsEngine::from_config(config)),
        PhysicsBackend::Rapier => Box::new(RapierPhysics::with_gravity(config.gravity)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dynamic_body_requires_positive_mass() {
        let desc = BodyDesc::dynamic(Vec2::ZERO, Vec2::new(1.0, 1.0), 0.0);
        assert!(matches!(desc.validate(), Err(PhysicsError::InvalidBody { .. })));
    }

    #[test]
    fn fixed_body_has_infinite_mass() {
        let desc = BodyDesc::fixed(Vec2::ZERO, Vec2::new(10.0, 1.0));
        assert!(desc.mass.is_infinite());
        assert!(desc.validate().is_ok());
    }

    #[test]
    fn boxed_backend_forwards_calls() {
        let mut physics: Box<dyn Physics> = Box::new(PhysicsEngine::with_gravity(Vec2::new(0.0, 10.0)));
        let h = physics
            .register_body(BodyDesc::dynamic(Vec2::ZERO, Vec2::ONE, 1.0))
            .unwrap();
        physics.flip_gravity();
        assert_eq!(physics.gravity(), Vec2::new(0.0, -10.0));
        assert!(physics.get_state(h).is_ok());
        assert_eq!(physics.body_count(), 1);
    }
}
