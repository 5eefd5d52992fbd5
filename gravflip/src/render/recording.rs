use log::trace;

use super::{MenuView, Renderer, SpriteDraw};

/// A draw call captured by [`RecordingRenderer`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Sprite(SpriteDraw),
    Menu { labels: Vec<String>, selected: usize },
}

/// Keeps the draw commands of the last presented frame.
///
/// Used by tests and the headless demo to see what a real backend would draw.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pending: Vec<DrawCommand>,
    last_frame: Vec<DrawCommand>,
    frames_presented: u64,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands of the most recently presented frame.
    pub fn last_frame(&self) -> &[DrawCommand] {
        &self.last_frame
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Sprites of the last frame, skipping menu draws.
    pub fn sprites(&self) -> impl Iterator<Item = &SpriteDraw> {
        self.last_frame.iter().filter_map(|cmd| match cmd {
            DrawCommand::Sprite(sprite) => Some(sprite),
            DrawCommand::Menu { .. } => None,
        })
    }
}

impl Renderer for RecordingRenderer {
    fn clear(&mut self) {
        self.pending.clear();
    }

    fn draw_sprite(&mut self, sprite: &SpriteDraw) {
        self.pending.push(DrawCommand::Sprite(sprite.clone()));
    }

    fn draw_menu(&mut self, menu: &MenuView<'_>) {
        self.pending.push(DrawCommand::Menu {
            labels: menu.labels.iter().map(|l| l.to_string()).collect(),
            selected: menu.selected,
        });
    }

    fn present(&mut self) {
        self.last_frame = std::mem::take(&mut self.pending);
        self.frames_presented += 1;
        trace!(
            "frame {} presented with {} commands",
            self.frames_presented,
            self.last_frame.len()
        );
    }
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn clear(&mut self) {}

    fn draw_sprite(&mut self, _sprite: &SpriteDraw) {}

    fn draw_menu(&mut self, _menu: &MenuView<'_>) {}

    fn present(&mut self) {}
}
