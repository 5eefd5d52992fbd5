// gravflip/src/physics/rapier_backend.rs
use std::collections::{BTreeMap, HashMap};

use log::debug;

use super::{BodyDesc, BodyHandle, BodyState, Physics, PhysicsError, PhysicsResult};
use crate::math::Vec2;

// Rapier is private implementation detail: do NOT re-export it.
use rapier2d::prelude::*;

/// Contacts whose push-out normal is at least this aligned against gravity count as ground.
const GROUND_NORMAL_THRESHOLD: f32 = 0.5;

struct RapierBody {
    body: RigidBodyHandle,
    collider: ColliderHandle,
    half_size: Vec2,
    is_static: bool,
    is_grounded: bool,
}

/// [`Physics`] backend running on rapier2d.
///
/// Positions cross the boundary as top-left corners; rapier stores centers.
pub struct RapierPhysics {
    // --- rapier internals ---
    pipeline: PhysicsPipeline,
    integration_parameters: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    rigid_bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,

    // --- mappings (engine <-> rapier) ---
    bodies: BTreeMap<BodyHandle, RapierBody>,
    collider_to_body: HashMap<ColliderHandle, BodyHandle>,
    next_handle: u32,

    gravity: Vec2,
}

impl RapierPhysics {
    pub fn with_gravity(gravity: Vec2) -> Self {
        Self {
            pipeline: PhysicsPipeline::new(),
            integration_parameters: IntegrationParameters::default(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),

            bodies: BTreeMap::new(),
            collider_to_body: HashMap::new(),
            next_handle: 1,

            gravity,
        }
    }

    fn body(&self, handle: BodyHandle) -> PhysicsResult<&RapierBody> {
        self.bodies
            .get(&handle)
            .ok_or(PhysicsError::InvalidHandle(handle))
    }

    /// Recompute grounded flags from the narrow phase contact manifolds.
    fn refresh_grounded(&mut self) {
        for body in self.bodies.values_mut() {
            body.is_grounded = false;
        }

        let down = self.gravity.normalized();
        if down == Vec2::ZERO {
            return;
        }

        for pair in self.narrow_phase.contact_pairs() {
            if !pair.has_any_active_contact {
                continue;
            }
            let first = self.collider_to_body.get(&pair.collider1).copied();
            let second = self.collider_to_body.get(&pair.collider2).copied();

            for manifold in &pair.manifolds {
                if manifold.points.is_empty() {
                    continue;
                }
                // World-space normal pointing from collider1 to collider2.
                let n = Vec2::new(manifold.data.normal.x, manifold.data.normal.y);

                if let Some(handle) = first {
                    if (-n).dot(down) < -GROUND_NORMAL_THRESHOLD {
                        if let Some(body) = self.bodies.get_mut(&handle) {
                            body.is_grounded |= !body.is_static;
                        }
                    }
                }
                if let Some(handle) = second {
                    if n.dot(down) < -GROUND_NORMAL_THRESHOLD {
                        if let Some(body) = self.bodies.get_mut(&handle) {
                            body.is_grounded |= !body.is_static;
                        }
                    }
                }
            }
        }
    }
}

impl Default for RapierPhysics {
    fn default() -> Self {
        Self::with_gravity(Vec2::new(0.0, 980.0))
    }
}

impl Physics for RapierPhysics {
    fn register_body(&mut self, desc: BodyDesc) -> PhysicsResult<BodyHandle> {
        desc.validate()?;

        let half_size = desc.size * 0.5;
        let center = desc.position + half_size;
        let rb_type = if desc.is_static {
            RigidBodyType::Fixed
        } else {
            RigidBodyType::Dynamic
        };

        let mut builder = RigidBodyBuilder::new(rb_type)
            .translation(vector![center.x, center.y])
            .lock_rotations();

        // Enable CCD for dynamic bodies to prevent tunneling through thin colliders
        if !desc.is_static {
            builder = builder.ccd_enabled(true);
        }
        let body = self.rigid_bodies.insert(builder.build());

        let density = if desc.is_static {
            0.0
        } else {
            desc.mass / (desc.size.x * desc.size.y)
        };
        let collider = ColliderBuilder::cuboid(half_size.x, half_size.y)
            .density(density)
            .friction(0.0)
            .restitution(0.0)
            .build();
        let collider = self
            .colliders
            .insert_with_parent(collider, body, &mut self.rigid_bodies);

        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        self.bodies.insert(
            handle,
            RapierBody {
                body,
                collider,
                half_size,
                is_static: desc.is_static,
                is_grounded: false,
            },
        );
        self.collider_to_body.insert(collider, handle);
        debug!("registered rapier body {:?} at {:?}", handle, desc.position);
        Ok(handle)
    }

    fn remove_body(&mut self, handle: BodyHandle) -> PhysicsResult<()> {
        let entry = self
            .bodies
            .remove(&handle)
            .ok_or(PhysicsError::InvalidHandle(handle))?;
        self.collider_to_body.remove(&entry.collider);
        self.rigid_bodies.remove(
            entry.body,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        Ok(())
    }

    fn apply_force(&mut self, handle: BodyHandle, force: Vec2) -> PhysicsResult<()> {
        let rb = self.body(handle)?.body;
        if let Some(b) = self.rigid_bodies.get_mut(rb) {
            b.add_force(vector![force.x, force.y], true);
        }
        Ok(())
    }

    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> PhysicsResult<()> {
        let rb = self.body(handle)?.body;
        if let Some(b) = self.rigid_bodies.get_mut(rb) {
            b.set_linvel(vector![velocity.x, velocity.y], true);
        }
        Ok(())
    }

    fn flip_gravity(&mut self) {
        self.gravity = -self.gravity;
        for body in self.bodies.values() {
            if let Some(b) = self.rigid_bodies.get_mut(body.body) {
                b.wake_up(true);
            }
        }
        debug!("gravity flipped to {:?}", self.gravity);
    }

    fn gravity(&self) -> Vec2 {
        self.gravity
    }

    fn update(&mut self, delta_time: f32) {
        if delta_time > 0.0 && delta_time.is_finite() {
            self.integration_parameters.dt = delta_time;

            let gravity = vector![self.gravity.x, self.gravity.y];
            let hooks = &();
            let events = &();

            self.pipeline.step(
                &gravity,
                &self.integration_parameters,
                &mut self.island_manager,
                &mut self.broad_phase,
                &mut self.narrow_phase,
                &mut self.rigid_bodies,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                &mut self.ccd_solver,
                hooks,
                events,
            );
        }

        // Rapier keeps user forces until reset; ours last one update.
        for body in self.bodies.values() {
            if let Some(b) = self.rigid_bodies.get_mut(body.body) {
                b.reset_forces(false);
            }
        }
        self.refresh_grounded();
    }

    fn get_state(&self, handle: BodyHandle) -> PhysicsResult<BodyState> {
        let body = self.body(handle)?;
        let b = self
            .rigid_bodies
            .get(body.body)
            .ok_or(PhysicsError::InvalidHandle(handle))?;
        let t = b.translation();
        let v = b.linvel();
        Ok(BodyState {
            position: Vec2::new(t.x, t.y) - body.half_size,
            velocity: Vec2::new(v.x, v.y),
            is_grounded: body.is_grounded,
        })
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn cleanup(&mut self) {
        debug!("releasing rapier world with {} bodies", self.bodies.len());
        let next_handle = self.next_handle;
        *self = Self::with_gravity(self.gravity);
        // Handles stay unique across resets.
        self.next_handle = next_handle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_round_trip_as_top_left() {
        let mut physics = RapierPhysics::with_gravity(Vec2::ZERO);
        let h = physics
            .register_body(BodyDesc::dynamic(Vec2::new(20.0, 250.0), Vec2::new(32.0, 32.0), 50.0))
            .unwrap();
        let state = physics.get_state(h).unwrap();
        assert!((state.position.x - 20.0).abs() < 1e-4);
        assert!((state.position.y - 250.0).abs() < 1e-4);
    }

    #[test]
    fn body_falls_onto_ground() {
        let mut physics = RapierPhysics::with_gravity(Vec2::new(0.0, 980.0));
        let h = physics
            .register_body(BodyDesc::dynamic(Vec2::new(20.0, 250.0), Vec2::new(32.0, 32.0), 50.0))
            .unwrap();
        physics
            .register_body(BodyDesc::fixed(Vec2::new(0.0, 300.0), Vec2::new(800.0, 20.0)))
            .unwrap();

        for _ in 0..180 {
            physics.update(1.0 / 60.0);
        }

        let state = physics.get_state(h).unwrap();
        assert!((state.position.y - 268.0).abs() < 2.0, "y = {}", state.position.y);
        assert!(state.is_grounded);
    }

    #[test]
    fn invalid_handles_error() {
        let mut physics = RapierPhysics::default();
        let h = physics
            .register_body(BodyDesc::dynamic(Vec2::ZERO, Vec2::ONE, 1.0))
            .unwrap();
        physics.remove_body(h).unwrap();
        assert_eq!(physics.get_state(h), Err(PhysicsError::InvalidHandle(h)));
        assert_eq!(
            physics.set_velocity(h, Vec2::ONE),
            Err(PhysicsError::InvalidHandle(h))
        );
    }

    #[test]
    fn flip_twice_restores_gravity() {
        let mut physics = RapierPhysics::default();
        let before = physics.gravity();
        physics.flip_gravity();
        physics.flip_gravity();
        assert_eq!(physics.gravity(), before);
    }

    #[test]
    fn cleanup_empties_world_without_reusing_handles() {
        let mut physics = RapierPhysics::default();
        let before = physics
            .register_body(BodyDesc::dynamic(Vec2::ZERO, Vec2::ONE, 1.0))
            .unwrap();
        physics.cleanup();
        assert_eq!(physics.body_count(), 0);
        assert_eq!(physics.get_state(before), Err(PhysicsError::InvalidHandle(before)));

        let after = physics
            .register_body(BodyDesc::dynamic(Vec2::ZERO, Vec2::ONE, 1.0))
            .unwrap();
        assert!(after > before);
        assert_eq!(physics.get_state(before), Err(PhysicsError::InvalidHandle(before)));
    }
}
