//! Startup configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! changes. The map override uses the same character codes as the built-in
//! map.

use std::{fs, io, path::Path};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    camera::{Camera, Motion},
    collision::can_occupy,
    world::{GridMap, MapError, MapSource, WallPalette, World},
};

/// Largest |direction · plane| still treated as perpendicular.
const PERPENDICULAR_EPSILON: f32 = 1.0e-3;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] io::Error),

    #[error("cannot parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("map is invalid: {0}")]
    Map(#[from] MapError),

    #[error("screen size {width}x{height} must be non-zero")]
    InvalidScreen { width: u32, height: u32 },

    #[error("player footprint at ({x}, {y}) overlaps a wall or the map edge")]
    BlockedStart { x: f32, y: f32 },

    #[error("camera plane must be perpendicular to a non-zero direction")]
    SkewedCamera,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Start position in map cells.
    pub position: Vec2,
    pub direction: Vec2,
    /// Camera plane; its length against `direction` sets the field of view.
    pub plane: Vec2,
    pub footprint: Vec2,
    /// Tiles per second.
    pub move_speed: f32,
    /// Radians per second.
    pub rotate_speed: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            position: Vec2::new(2.5, 2.0),
            direction: Vec2::new(0.0, 1.0),
            plane: Vec2::new(-0.66, 0.0),
            footprint: Vec2::splat(0.375),
            move_speed: 5.0,
            rotate_speed: 3.0,
        }
    }
}

impl PlayerConfig {
    pub fn camera(&self) -> Camera {
        Camera::new(self.position, self.direction, self.plane, self.footprint)
    }

    pub fn motion(&self) -> Motion {
        Motion {
            move_speed: self.move_speed,
            rotate_speed: self.rotate_speed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub title: String,
    pub screen_width: u32,
    pub screen_height: u32,
    /// Frames per second, 0 for uncapped.
    pub frame_rate_limit: u32,
    /// Longest frame step fed to movement, in milliseconds.
    pub max_frame_step_ms: u32,
    pub player: PlayerConfig,
    /// Replaces the built-in map when present.
    pub map: Option<MapSource>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "Adventure 3D".to_string(),
            screen_width: 1280,
            screen_height: 720,
            frame_rate_limit: 30,
            max_frame_step_ms: 100,
            player: PlayerConfig::default(),
            map: None,
        }
    }
}

impl Config {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn max_frame_step(&self) -> f32 {
        self.max_frame_step_ms as f32 / 1000.0
    }

    /// Validates the map and the player start, producing the immutable world.
    pub fn build_world(&self) -> Result<World, ConfigError> {
        if self.screen_width == 0 || self.screen_height == 0 {
            return Err(ConfigError::InvalidScreen {
                width: self.screen_width,
                height: self.screen_height,
            });
        }

        let map = match &self.map {
            Some(source) => GridMap::load(source)?,
            None => GridMap::load(&MapSource::default())?,
        };

        let player = &self.player;
        if player.direction.length_squared() == 0.0
            || player.direction.dot(player.plane).abs() > PERPENDICULAR_EPSILON
        {
            return Err(ConfigError::SkewedCamera);
        }
        if !can_occupy(player.position, player.footprint, &map) {
            return Err(ConfigError::BlockedStart {
                x: player.position.x,
                y: player.position.y,
            });
        }

        Ok(World::new(map, WallPalette::default()))
    }
}
