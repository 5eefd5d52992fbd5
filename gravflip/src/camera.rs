//! Viewport camera that follows a target and stays inside the world.

use glam::{Mat4, Vec3};
use log::debug;

use crate::config::WorldBounds;
use crate::math::{Aabb, Vec2};

/// Camera representing a clamped 2D view.
///
/// `world_x`/`world_y` is the top-left corner of the viewport in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub world_x: f32,
    pub world_y: f32,
    pub world_bounds: WorldBounds,
}

/// Clamp `value` into `[min, max - extent]`, pinning to `min` when the world
/// is narrower than the viewport.
fn clamp_axis(value: f32, min: f32, max: f32, extent: f32) -> f32 {
    let hi = max - extent;
    if hi < min {
        debug!("world ({min}..{max}) narrower than viewport extent {extent}, pinning camera");
        return min;
    }
    value.clamp(min, hi)
}

impl Camera {
    pub fn new(viewport_width: f32, viewport_height: f32, world_bounds: WorldBounds) -> Self {
        Self {
            viewport_width,
            viewport_height,
            world_x: world_bounds.min_x,
            world_y: world_bounds.min_y,
            world_bounds,
        }
    }

    /// Center the viewport on `target`, then clamp it to the world bounds.
    pub fn follow(&mut self, target: Vec2) {
        let x = target.x - self.viewport_width / 2.0;
        let y = target.y - self.viewport_height / 2.0;
        let b = self.world_bounds;
        self.world_x = clamp_axis(x, b.min_x, b.max_x, self.viewport_width);
        self.world_y = clamp_axis(y, b.min_y, b.max_y, self.viewport_height);
    }

    /// Converts world coordinates to screen coordinates using this camera.
    pub fn world_to_screen(&self, world_pos: Vec2) -> Vec2 {
        Vec2::new(world_pos.x - self.world_x, world_pos.y - self.world_y)
    }

    /// Converts screen coordinates to world coordinates using this camera.
    pub fn screen_to_world(&self, screen_pos: Vec2) -> Vec2 {
        Vec2::new(screen_pos.x + self.world_x, screen_pos.y + self.world_y)
    }

    /// Whether a box with top-left `position` overlaps the viewport.
    /// Edges touching count as visible.
    pub fn is_in_view(&self, position: Vec2, width: f32, height: f32) -> bool {
        Aabb::new(position, Vec2::new(width, height)).touches(&self.view_rect())
    }

    pub fn view_rect(&self) -> Aabb {
        Aabb::new(
            Vec2::new(self.world_x, self.world_y),
            Vec2::new(self.viewport_width, self.viewport_height),
        )
    }

    /// Orthographic view-projection for GPU backends, y pointing down.
    pub fn view_projection(&self) -> Mat4 {
        let projection = Mat4::orthographic_rh_gl(
            0.0,
            self.viewport_width,
            self.viewport_height,
            0.0,
            -1.0,
            1.0,
        );
        let translation = Mat4::from_translation(Vec3::new(-self.world_x, -self.world_y, 0.0));
        projection * translation
    }
}
