//! Canvas configuration.

use crate::color::Color;
use crate::history::DEFAULT_MAX_HISTORY;
use crate::store::LayerId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Canvas size must be at least 1, got {0}")]
    InvalidSize(u32),
    #[error("History size must be at least 1")]
    InvalidHistorySize,
    #[error("Brush size must be between 1 and 4, got {0}")]
    InvalidBrushSize(u8),
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Startup settings for a [`crate::Canvas`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasConfig {
    /// Side length of the square canvas, in cells.
    pub size: u32,
    pub max_history: usize,
    pub brush_size: u8,
    pub primary_color: Color,
    /// Layer new pixels are drawn on; `None` disables drawing.
    pub active_layer: Option<LayerId>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            size: 32,
            max_history: DEFAULT_MAX_HISTORY,
            brush_size: 1,
            primary_color: Color::BLACK,
            active_layer: Some(LayerId(0)),
        }
    }
}

impl CanvasConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: CanvasConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size == 0 || self.size > i32::MAX as u32 {
            return Err(ConfigError::InvalidSize(self.size));
        }
        if self.max_history == 0 {
            return Err(ConfigError::InvalidHistorySize);
        }
        if !(1..=4).contains(&self.brush_size) {
            return Err(ConfigError::InvalidBrushSize(self.brush_size));
        }
        Ok(())
    }
}
