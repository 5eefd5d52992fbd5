use log::{debug, trace};

use super::game_object::{Animation, GameObject};
use crate::config::PlayerConfig;
use crate::input::{InputSource, LogicalKey};
use crate::math::Vec2;
use crate::physics::{BodyDesc, Physics, PhysicsResult};

/// The controlled character. Moves by force and "jumps" by flipping gravity.
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub object: GameObject,
    pub move_force: f32,
    pub jump_force: f32,
    /// True only while grounded; cleared by a flip until the next landing.
    pub can_toggle_gravity: bool,
    pub friction: f32,
    pub run_threshold: f32,
}

impl Player {
    pub fn spawn<P: Physics + ?Sized>(physics: &mut P, config: &PlayerConfig) -> PhysicsResult<Self> {
        let object = GameObject::spawn(
            physics,
            BodyDesc::dynamic(config.spawn, config.size, config.mass),
        )?;
        Ok(Self {
            can_toggle_gravity: object.is_grounded,
            object,
            move_force: config.move_force,
            jump_force: config.jump_force,
            friction: config.friction,
            run_threshold: config.run_threshold,
        })
    }

    pub fn update<P: Physics + ?Sized>(&mut self, delta_time: f32, physics: &mut P) -> PhysicsResult<()> {
        self.object.update(delta_time, &*physics)?;

        if self.object.is_grounded {
            self.can_toggle_gravity = true;

            let velocity = self.object.velocity;
            let slowed = velocity.with_x(velocity.x * self.friction);
            if slowed != velocity {
                physics.set_velocity(self.object.handle(), slowed)?;
            }
            self.object.velocity = slowed;

            self.object.current_animation = if slowed.x.abs() > self.run_threshold {
                Animation::Run
            } else {
                Animation::Idle
            };
        } else {
            self.can_toggle_gravity = false;
            // Negative y is up on screen regardless of gravity direction.
            self.object.current_animation = if self.object.velocity.y < 0.0 {
                Animation::Jump
            } else {
                Animation::Fall
            };
        }

        trace!(
            "player pos={:?} vel={:?} grounded={} anim={}",
            self.object.position,
            self.object.velocity,
            self.object.is_grounded,
            self.object.current_animation
        );
        Ok(())
    }

    pub fn move_left<P: Physics + ?Sized>(&self, physics: &mut P) -> PhysicsResult<()> {
        self.object
            .apply_force(physics, Vec2::new(-self.move_force, 0.0))
    }

    pub fn move_right<P: Physics + ?Sized>(&self, physics: &mut P) -> PhysicsResult<()> {
        self.object
            .apply_force(physics, Vec2::new(self.move_force, 0.0))
    }

    /// Flip world gravity if allowed. Returns whether a flip happened.
    pub fn jump<P: Physics + ?Sized>(&mut self, physics: &mut P) -> bool {
        if !self.can_toggle_gravity {
            return false;
        }
        physics.flip_gravity();
        self.can_toggle_gravity = false;
        debug!("player flipped gravity to {:?}", physics.gravity());
        true
    }

    /// Left wins over right; jump is independent of horizontal movement.
    pub fn handle_input<I, P>(&mut self, input: &I, physics: &mut P) -> PhysicsResult<()>
    where
        I: InputSource + ?Sized,
        P: Physics + ?Sized,
    {
        if input.is_key_pressed(LogicalKey::Left) {
            self.move_left(physics)?;
        } else if input.is_key_pressed(LogicalKey::Right) {
            self.move_right(physics)?;
        }
        if input.is_key_pressed(LogicalKey::Jump) {
            self.jump(physics);
        }
        Ok(())
    }
}
