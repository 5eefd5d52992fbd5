use super::game_object::GameObject;
use crate::config::SegmentConfig;
use crate::math::Vec2;
use crate::physics::{BodyDesc, Physics, PhysicsResult};

/// Static collision surface.
#[derive(Clone, Debug, PartialEq)]
pub struct GroundSegment {
    pub object: GameObject,
}

impl GroundSegment {
    pub fn spawn<P: Physics + ?Sized>(
        physics: &mut P,
        position: Vec2,
        width: f32,
        height: f32,
    ) -> PhysicsResult<Self> {
        let object = GameObject::spawn(physics, BodyDesc::fixed(position, Vec2::new(width, height)))?;
        Ok(Self { object })
    }

    pub fn from_config<P: Physics + ?Sized>(physics: &mut P, segment: &SegmentConfig) -> PhysicsResult<Self> {
        Self::spawn(
            physics,
            Vec2::new(segment.x, segment.y),
            segment.width,
            segment.height,
        )
    }

    pub fn width(&self) -> f32 {
        self.object.size.x
    }
}
