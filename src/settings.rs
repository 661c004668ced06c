//! World settings
//!
//! Loaded from a JSON file by the host, falling back to defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::Arena;

/// What a shape's acceleration returns to after each integration step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccelerationReset {
    /// Acceleration is consumed by the step and drops to zero
    #[default]
    Zero,
    /// Acceleration re-arms to the shape's baseline
    Baseline,
}

impl AccelerationReset {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccelerationReset::Zero => "zero",
            AccelerationReset::Baseline => "baseline",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "zero" | "reset" => Some(AccelerationReset::Zero),
            "baseline" | "rearm" => Some(AccelerationReset::Baseline),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid settings: {0}")]
    Invalid(&'static str),
}

/// Simulation world configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    /// Arena used by the boundary constraint and as the render viewport
    pub arena: Arena,
    /// Broad-phase cell edge length
    pub cell_size: f32,
    /// Scheduled tick interval (seconds)
    pub tick_interval: f64,
    /// Per-tick downward bias is `mass / bias_divisor`
    pub bias_divisor: f32,
    /// Acceleration policy after integration, shared by every shape
    pub acceleration_reset: AccelerationReset,
    /// Draw labels, point markers and the grid overlay
    pub debug: bool,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            arena: Arena::new(ARENA_WIDTH, ARENA_HEIGHT),
            cell_size: CELL_SIZE,
            tick_interval: TICK_INTERVAL,
            bias_divisor: BIAS_DIVISOR,
            acceleration_reset: AccelerationReset::Zero,
            debug: false,
        }
    }
}

impl WorldSettings {
    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.arena.width.is_finite() && self.arena.width > 0.0)
            || !(self.arena.height.is_finite() && self.arena.height > 0.0)
        {
            return Err(SettingsError::Invalid("arena dimensions must be positive"));
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(SettingsError::Invalid("cell_size must be positive"));
        }
        if !(self.tick_interval.is_finite() && self.tick_interval > 0.0) {
            return Err(SettingsError::Invalid("tick_interval must be positive"));
        }
        if !self.bias_divisor.is_finite() || self.bias_divisor == 0.0 {
            return Err(SettingsError::Invalid("bias_divisor must be finite and non-zero"));
        }
        Ok(())
    }

    /// Parse and validate settings from JSON; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a file, or defaults if there is none
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            log::info!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        std::fs::write(path, self.to_json()?)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
