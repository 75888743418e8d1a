//! Configuration system
//!
//! Tunables are plain serde structs loaded from TOML or RON files.

pub use serde::{Deserialize, Serialize};

use crate::spatial::OctreeConfig;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Tunable constants of the collision pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Added to every corrective push so resolved shapes rest just apart
    pub rest_gap: f32,

    /// Distance kept short of a surface found by tunneling protection
    pub robust_backoff: f32,

    /// Enlargement of the collider box when gathering candidate triangles
    pub candidate_box_scale: f32,

    /// Fraction of the collider's X radius ahead of it where ledge checks start
    pub ledge_lookahead_fraction: f32,

    /// Extra drop below the collider bottom for the ledge floor check
    pub ledge_drop_margin: f32,

    /// Level octree construction
    pub octree: OctreeConfig,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            rest_gap: 0.001,
            robust_backoff: 0.1,
            candidate_box_scale: 1.5,
            ledge_lookahead_fraction: 2.0 / 3.0,
            ledge_drop_margin: 0.05,
            octree: OctreeConfig::default(),
        }
    }
}

impl Config for CollisionConfig {}
