//! Game configuration, loadable from JSON.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::Vec2;
use crate::menu::SelectionMode;
use crate::physics::PhysicsBackend;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Size of the visible area in world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Rectangle the camera is confined to.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldBounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl WorldBounds {
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1600.0, 600.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub backend: PhysicsBackend,
    /// Positive y points down the screen.
    pub gravity: Vec2,
    /// Longest integration substep in seconds; `0` disables substepping.
    pub max_substep: f32,
    /// Frames a body stays grounded after contact ends.
    pub grounded_grace_frames: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            backend: PhysicsBackend::Aabb,
            gravity: Vec2::new(0.0, 980.0),
            max_substep: 1.0 / 120.0,
            grounded_grace_frames: 0,
        }
    }
}

/// Player tuning.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub spawn: Vec2,
    pub size: Vec2,
    pub mass: f32,
    pub move_force: f32,
    /// Carried for tuning files; jumping is a gravity flip and applies no impulse.
    pub jump_force: f32,
    /// Horizontal velocity multiplier applied each grounded frame.
    pub friction: f32,
    /// Horizontal speed above which the run animation plays.
    pub run_threshold: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            spawn: Vec2::new(20.0, 250.0),
            size: Vec2::new(32.0, 32.0),
            mass: 50.0,
            move_force: 3000.0,
            jump_force: 2000.0,
            friction: 0.8,
            run_threshold: 10.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentConfig {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    #[serde(default = "SegmentConfig::default_height")]
    pub height: f32,
}

impl SegmentConfig {
    pub const DEFAULT_HEIGHT: f32 = 20.0;

    fn default_height() -> f32 {
        Self::DEFAULT_HEIGHT
    }

    pub fn new(x: f32, y: f32, width: f32) -> Self {
        Self {
            x,
            y,
            width,
            height: Self::DEFAULT_HEIGHT,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub segments: Vec<SegmentConfig>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            segments: vec![SegmentConfig::new(0.0, 300.0, 800.0)],
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    pub selection: SelectionMode,
}

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub viewport: ViewportConfig,
    pub world_bounds: WorldBounds,
    pub physics: PhysicsConfig,
    pub player: PlayerConfig,
    pub level: LevelConfig,
    pub menu: MenuConfig,
}

impl GameConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.viewport.width > 0.0 && self.viewport.height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "viewport must be positive, got {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }
        let b = &self.world_bounds;
        if b.min_x > b.max_x || b.min_y > b.max_y {
            return Err(ConfigError::Invalid(format!("inverted world bounds {b:?}")));
        }
        if !(self.player.mass > 0.0) || !(self.player.size.x > 0.0 && self.player.size.y > 0.0) {
            return Err(ConfigError::Invalid(
                "player mass and size must be positive".into(),
            ));
        }
        if self.physics.max_substep < 0.0 {
            return Err(ConfigError::Invalid("max_substep must not be negative".into()));
        }
        if let Some(s) = self
            .level
            .segments
            .iter()
            .find(|s| !(s.width > 0.0 && s.height > 0.0))
        {
            return Err(ConfigError::Invalid(format!("segment needs a positive size: {s:?}")));
        }
        Ok(())
    }

    #[must_use]
    pub fn with_viewport(mut self, width: f32, height: f32) -> Self {
        self.viewport = ViewportConfig { width, height };
        self
    }

    #[must_use]
    pub fn with_world_bounds(mut self, bounds: WorldBounds) -> Self {
        self.world_bounds = bounds;
        self
    }

    #[must_use]
    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.physics.gravity = gravity;
        self
    }

    #[must_use]
    pub fn with_selection_mode(mut self, selection: SelectionMode) -> Self {
        self.menu.selection = selection;
        self
    }

    #[must_use]
    pub fn with_segments(mut self, segments: Vec<SegmentConfig>) -> Self {
        self.level.segments = segments;
        self
    }
}
