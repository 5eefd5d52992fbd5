//! Renderer port and headless backends.
//!
//! Pixel drawing lives outside this crate. A backend receives a `clear`, a
//! sequence of draws and a `present` per frame.

mod recording;
mod sprite;

pub use recording::{DrawCommand, NullRenderer, RecordingRenderer};
pub use sprite::{SpriteDraw, SpriteKind};

/// Menu contents handed to the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct MenuView<'a> {
    pub labels: Vec<&'a str>,
    pub selected: usize,
}

/// The rendering capability consumed by the game core.
pub trait Renderer {
    /// Start a new frame.
    fn clear(&mut self);

    /// Draw one entity sprite.
    fn draw_sprite(&mut self, sprite: &SpriteDraw);

    /// Draw the menu widget.
    fn draw_menu(&mut self, menu: &MenuView<'_>);

    /// Finish the frame.
    fn present(&mut self);
}
