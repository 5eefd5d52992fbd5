use crate::math::Vec2;
use crate::objects::Animation;

/// Which sprite sheet an entity draws from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKind {
    Player,
    Ground,
}

/// One entity draw, already in screen space.
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteDraw {
    pub kind: SpriteKind,
    pub animation: Animation,
    /// Top-left corner in screen coordinates.
    pub screen_position: Vec2,
    pub size: Vec2,
}
