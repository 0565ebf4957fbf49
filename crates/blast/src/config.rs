use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::components::{
    DEFAULT_BOMB_CHANCE, DEFAULT_BOOSTER_RADIUS, DEFAULT_COLORS, DEFAULT_MIN_GROUP_SIZE,
    DEFAULT_MIN_SUPER_GROUP_SIZE, DEFAULT_SHUFFLES, DEFAULT_SWAPS, DEFAULT_TILE_POINTS,
};

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_yaml_ng::Error),
    Invalid { field: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config: {}", e),
            ConfigError::Invalid { field, reason } => {
                write!(f, "Invalid config field '{}': {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_yaml_ng::Error> for ConfigError {
    fn from(e: serde_yaml_ng::Error) -> Self {
        ConfigError::Parse(e)
    }
}

fn default_colors() -> u8 {
    DEFAULT_COLORS
}
fn default_min_group_size() -> usize {
    DEFAULT_MIN_GROUP_SIZE
}
fn default_min_super_group_size() -> usize {
    DEFAULT_MIN_SUPER_GROUP_SIZE
}
fn default_shuffles() -> u32 {
    DEFAULT_SHUFFLES
}
fn default_swaps() -> u32 {
    DEFAULT_SWAPS
}
fn default_booster_radius() -> u32 {
    DEFAULT_BOOSTER_RADIUS
}
fn default_bomb_chance() -> f64 {
    DEFAULT_BOMB_CHANCE
}
fn default_tile_points() -> u32 {
    DEFAULT_TILE_POINTS
}

/// Game settings. Keys are camelCase so level files written for the
/// original scene settings load unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlastConfig {
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_colors")]
    pub colors: u8,
    #[serde(default = "default_min_group_size")]
    pub min_tiles_group_size: usize,
    /// Reshuffle attempts per deadlock.
    #[serde(default = "default_shuffles")]
    pub shuffles: u32,
    pub win_score: u32,
    pub turns_number: u32,
    /// Starting swap charges.
    #[serde(default = "default_swaps")]
    pub swaps: u32,
    /// Bomb blast radius in cells.
    #[serde(default = "default_booster_radius")]
    pub booster_radius: u32,
    #[serde(default = "default_min_super_group_size")]
    pub min_super_tile_group_size: usize,
    /// Probability that a freshly generated tile is a bomb.
    #[serde(default = "default_bomb_chance")]
    pub bomb_chance: f64,
    #[serde(default = "default_tile_points")]
    pub tile_points: u32,
}

impl BlastConfig {
    /// Config with the required fields set and everything else at defaults.
    pub fn new(width: u32, height: u32, win_score: u32, turns_number: u32) -> Self {
        BlastConfig {
            width,
            height,
            colors: DEFAULT_COLORS,
            min_tiles_group_size: DEFAULT_MIN_GROUP_SIZE,
            shuffles: DEFAULT_SHUFFLES,
            win_score,
            turns_number,
            swaps: DEFAULT_SWAPS,
            booster_radius: DEFAULT_BOOSTER_RADIUS,
            min_super_tile_group_size: DEFAULT_MIN_SUPER_GROUP_SIZE,
            bomb_chance: DEFAULT_BOMB_CHANCE,
            tile_points: DEFAULT_TILE_POINTS,
        }
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let config: BlastConfig = serde_yaml_ng::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: String) -> Result<(), ConfigError> {
            Err(ConfigError::Invalid { field, reason })
        }

        if self.width == 0 {
            return invalid("width", "must be positive".to_string());
        }
        if self.height == 0 {
            return invalid("height", "must be positive".to_string());
        }
        if self.colors == 0 {
            return invalid("colors", "palette must contain at least one color".to_string());
        }
        if self.min_tiles_group_size == 0 {
            return invalid("minTilesGroupSize", "must be at least 1".to_string());
        }
        if self.min_super_tile_group_size == 0 {
            return invalid("minSuperTileGroupSize", "must be at least 1".to_string());
        }
        if self.win_score == 0 {
            return invalid("winScore", "must be at least 1".to_string());
        }
        if self.turns_number == 0 {
            return invalid("turnsNumber", "must be at least 1".to_string());
        }
        if !self.bomb_chance.is_finite() || !(0.0..=1.0).contains(&self.bomb_chance) {
            return invalid(
                "bombChance",
                format!("must be within [0, 1], got {}", self.bomb_chance),
            );
        }
        if self.width < 3 || self.height < 3 {
            log::warn!(
                "blast-sim: {}x{} board is smaller than the recommended 3x3",
                self.width,
                self.height
            );
        }
        Ok(())
    }
}
