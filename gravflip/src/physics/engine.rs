//! Axis-aligned box physics.
//!
//! Semi-implicit Euler integration with optional substepping, followed by
//! minimum-penetration box separation. Bodies are kept sorted by handle and
//! every pass walks them in that order, so a given sequence of calls always
//! produces the same world.

use log::{debug, trace};

use super::{BodyDesc, BodyHandle, BodyState, Physics, PhysicsError, PhysicsResult};
use crate::config::PhysicsConfig;
use crate::math::{Aabb, Vec2};

/// Upper bound on substeps per `update`, so a long hitch cannot stall the frame.
const MAX_SUBSTEPS: u32 = 64;

#[derive(Clone, Debug)]
struct Body {
    position: Vec2,
    velocity: Vec2,
    size: Vec2,
    inv_mass: f32,
    is_static: bool,
    force: Vec2,
    is_grounded: bool,
    contact_this_frame: bool,
    frames_since_contact: u32,
}

impl Body {
    fn from_desc(desc: &BodyDesc) -> Self {
        Self {
            position: desc.position,
            velocity: Vec2::ZERO,
            size: desc.size,
            inv_mass: if desc.is_static { 0.0 } else { 1.0 / desc.mass },
            is_static: desc.is_static,
            force: Vec2::ZERO,
            is_grounded: false,
            contact_this_frame: false,
            frames_since_contact: u32::MAX,
        }
    }

    fn aabb(&self) -> Aabb {
        Aabb::new(self.position, self.size)
    }
}

/// Result of separating two overlapping boxes.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Contact {
    /// Unit axis normal pointing from the other box towards the moving one.
    normal: Vec2,
    depth: f32,
}

/// Minimum-penetration contact for `a` against `b`, if they overlap.
fn contact(a: &Aabb, b: &Aabb) -> Option<Contact> {
    if !a.overlaps(b) {
        return None;
    }
    let a_max = a.max();
    let b_max = b.max();

    // Depth needed to push `a` out towards -axis / +axis.
    let push_neg_x = a_max.x - b.min.x;
    let push_pos_x = b_max.x - a.min.x;
    let push_neg_y = a_max.y - b.min.y;
    let push_pos_y = b_max.y - a.min.y;

    let (depth_x, normal_x) = if push_neg_x < push_pos_x {
        (push_neg_x, -1.0)
    } else {
        (push_pos_x, 1.0)
    };
    let (depth_y, normal_y) = if push_neg_y < push_pos_y {
        (push_neg_y, -1.0)
    } else {
        (push_pos_y, 1.0)
    };

    // Ties go to the vertical axis so landing on a corner lands.
    if depth_x < depth_y {
        Some(Contact {
            normal: Vec2::new(normal_x, 0.0),
            depth: depth_x,
        })
    } else {
        Some(Contact {
            normal: Vec2::new(0.0, normal_y),
            depth: depth_y,
        })
    }
}

/// Zero the part of `velocity` moving into a surface with the given normal.
fn remove_inbound(velocity: Vec2, normal: Vec2) -> Vec2 {
    if velocity.dot(normal) >= 0.0 {
        return velocity;
    }
    if normal.x != 0.0 {
        velocity.with_x(0.0)
    } else {
        velocity.with_y(0.0)
    }
}

/// Box physics world.
pub struct PhysicsEngine {
    bodies: Vec<(BodyHandle, Body)>,
    next_handle: u32,
    gravity: Vec2,
    max_substep: f32,
    grounded_grace_frames: u32,
}

impl Default for PhysicsEngine {
    fn default() -> Self {
        Self::from_config(&PhysicsConfig::default())
    }
}

impl PhysicsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-step integration under the given gravity.
    pub fn with_gravity(gravity: Vec2) -> Self {
        Self {
            bodies: Vec::new(),
            next_handle: 1,
            gravity,
            max_substep: 0.0,
            grounded_grace_frames: 0,
        }
    }

    pub fn from_config(config: &PhysicsConfig) -> Self {
        Self::with_gravity(config.gravity)
            .with_max_substep(config.max_substep)
            .with_grounded_grace_frames(config.grounded_grace_frames)
    }

    /// Largest substep in seconds. `0.0` integrates each update in one step.
    #[must_use]
    pub fn with_max_substep(mut self, max_substep: f32) -> Self {
        self.max_substep = max_substep.max(0.0);
        self
    }

    /// Frames a body stays grounded after losing contact. `0` means not sticky.
    #[must_use]
    pub fn with_grounded_grace_frames(mut self, frames: u32) -> Self {
        self.grounded_grace_frames = frames;
        self
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    fn index_of(&self, handle: BodyHandle) -> PhysicsResult<usize> {
        self.bodies
            .binary_search_by_key(&handle, |(h, _)| *h)
            .map_err(|_| PhysicsError::InvalidHandle(handle))
    }

    fn substeps(&self, delta_time: f32) -> u32 {
        if self.max_substep <= 0.0 {
            return 1;
        }
        let steps = (delta_time / self.max_substep).ceil();
        if steps.is_finite() {
            (steps as u32).clamp(1, MAX_SUBSTEPS)
        } else {
            MAX_SUBSTEPS
        }
    }

    fn integrate(&mut self, dt: f32) {
        let gravity = self.gravity;
        for (_, body) in self.bodies.iter_mut().filter(|(_, b)| !b.is_static) {
            let acceleration = body.force * body.inv_mass + gravity;
            body.velocity += acceleration * dt;
            body.position += body.velocity * dt;
        }
    }

    fn resolve_collisions(&mut self) {
        let gravity = self.gravity;
        let count = self.bodies.len();

        for i in 0..count {
            if self.bodies[i].1.is_static {
                continue;
            }
            for j in 0..count {
                if i == j {
                    continue;
                }
                let (a, b) = pair_mut(&mut self.bodies, i, j);
                let Some(hit) = contact(&a.aabb(), &b.aabb()) else {
                    continue;
                };

                if b.is_static {
                    a.position += hit.normal * hit.depth;
                } else {
                    let half = hit.normal * (hit.depth * 0.5);
                    a.position += half;
                    b.position = b.position - half;
                    b.velocity = remove_inbound(b.velocity, -hit.normal);
                    if (-hit.normal).dot(gravity) < 0.0 {
                        b.contact_this_frame = true;
                    }
                }
                a.velocity = remove_inbound(a.velocity, hit.normal);

                // Resting against a surface on the side gravity pulls towards.
                if hit.normal.dot(gravity) < 0.0 {
                    a.contact_this_frame = true;
                }
            }
        }
    }

    fn refresh_grounded(&mut self) {
        let grace = self.grounded_grace_frames;
        for (handle, body) in self.bodies.iter_mut().filter(|(_, b)| !b.is_static) {
            if body.contact_this_frame {
                body.frames_since_contact = 0;
            } else {
                body.frames_since_contact = body.frames_since_contact.saturating_add(1);
            }
            let grounded = body.frames_since_contact <= grace;
            if grounded != body.is_grounded {
                trace!("body {:?} grounded={}", handle, grounded);
            }
            body.is_grounded = grounded;
        }
    }
}

/// Two distinct mutable elements of the body list.
fn pair_mut(bodies: &mut [(BodyHandle, Body)], i: usize, j: usize) -> (&mut Body, &mut Body) {
    debug_assert_ne!(i, j);
    if i < j {
        let (left, right) = bodies.split_at_mut(j);
        (&mut left[i].1, &mut right[0].1)
    } else {
        let (left, right) = bodies.split_at_mut(i);
        (&mut right[0].1, &mut left[j].1)
    }
}

impl Physics for PhysicsEngine {
    fn register_body(&mut self, desc: BodyDesc) -> PhysicsResult<BodyHandle> {
        desc.validate()?;
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        self.bodies.push((handle, Body::from_desc(&desc)));
        debug!(
            "registered {} body {:?} at {:?} size {:?}",
            if desc.is_static { "static" } else { "dynamic" },
            handle,
            desc.position,
            desc.size
        );
        Ok(handle)
    }

    fn remove_body(&mut self, handle: BodyHandle) -> PhysicsResult<()> {
        let index = self.index_of(handle)?;
        self.bodies.remove(index);
        debug!("removed body {:?}", handle);
        Ok(())
    }

    fn apply_force(&mut self, handle: BodyHandle, force: Vec2) -> PhysicsResult<()> {
        let index = self.index_of(handle)?;
        let body = &mut self.bodies[index].1;
        if !body.is_static {
            body.force += force;
        }
        Ok(())
    }

    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> PhysicsResult<()> {
        let index = self.index_of(handle)?;
        let body = &mut self.bodies[index].1;
        if !body.is_static {
            body.velocity = velocity;
        }
        Ok(())
    }

    fn flip_gravity(&mut self) {
        self.gravity = -self.gravity;
        // Contacts counted under the old gravity no longer mean "down".
        for (_, body) in self.bodies.iter_mut() {
            body.frames_since_contact = u32::MAX;
        }
        debug!("gravity flipped to {:?}", self.gravity);
    }

    fn gravity(&self) -> Vec2 {
        self.gravity
    }

    fn update(&mut self, delta_time: f32) {
        if !(delta_time > 0.0) || !delta_time.is_finite() {
            for (_, body) in self.bodies.iter_mut() {
                body.force = Vec2::ZERO;
            }
            return;
        }

        for (_, body) in self.bodies.iter_mut() {
            body.contact_this_frame = false;
        }

        let steps = self.substeps(delta_time);
        let dt = delta_time / steps as f32;
        for _ in 0..steps {
            self.integrate(dt);
            self.resolve_collisions();
        }

        for (_, body) in self.bodies.iter_mut() {
            body.force = Vec2::ZERO;
        }
        self.refresh_grounded();
    }

    fn get_state(&self, handle: BodyHandle) -> PhysicsResult<BodyState> {
        let index = self.index_of(handle)?;
        let body = &self.bodies[index].1;
        Ok(BodyState {
            position: body.position,
            velocity: body.velocity,
            is_grounded: body.is_grounded,
        })
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn cleanup(&mut self) {
        debug!("releasing {} bodies", self.bodies.len());
        self.bodies.clear();
    }
}
