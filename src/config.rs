//! Gallery configuration, stored as JSON next to the binary.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::display::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::effects;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// What to play and how
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    /// How long each effect stays on screen
    pub effect_seconds: f32,
    /// Length of the wipe between two effects
    pub transition_seconds: f32,
    /// Start over after the last effect instead of exiting
    pub repeat: bool,
    pub playlist: Vec<String>,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            vsync: true,
            effect_seconds: 10.0,
            transition_seconds: 1.5,
            repeat: true,
            playlist: effects::names().iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl GalleryConfig {
    /// Load configuration from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Load `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "screen size {}x{} must be non-zero",
                self.width, self.height
            )));
        }
        if self.effect_seconds.is_nan() || self.effect_seconds <= 0.0 {
            return Err(ConfigError::Invalid(
                "effect_seconds must be positive".into(),
            ));
        }
        if self.transition_seconds.is_nan() || self.transition_seconds <= 0.0 {
            return Err(ConfigError::Invalid(
                "transition_seconds must be positive".into(),
            ));
        }
        if self.playlist.is_empty() {
            return Err(ConfigError::Invalid("playlist is empty".into()));
        }
        if let Some(name) = self.playlist.iter().find(|n| !effects::exists(n)) {
            return Err(ConfigError::Invalid(format!(
                "unknown effect '{}' (available: {})",
                name,
                effects::names().join(", ")
            )));
        }
        Ok(())
    }
}
