//! Explorer configuration and the iteration-budget formula.
//!
//! Everything here is plain data shared by the control thread and the
//! workers. Missing JSON fields fall back to the defaults below.

use crate::{ConfigError, Viewport};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest accepted `supersample_grid`; a grid of `n` costs `n * n` samples.
pub const MAX_SUPERSAMPLE_GRID: u32 = 16;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Edge length of a square tile in pixels.
    pub tile_size: u32,
    /// Iteration budget at the initial zoom level.
    pub base_iterations: u32,
    /// Extra iterations for every halving of the viewport width.
    pub iterations_per_octave: u32,
    /// Viewport shown before any interaction.
    pub initial_viewport: Viewport,
    /// Width multiplier for one wheel notch towards the user (zoom in).
    pub zoom_step: f64,
    /// Sub-pixel samples per axis when a pixel is supersampled.
    pub supersample_grid: u32,
    /// A pixel is supersampled once its iteration count exceeds
    /// `budget / supersample_divisor`.
    pub supersample_divisor: u32,
    /// Number of worker threads. `None` uses the available parallelism.
    pub worker_count: Option<usize>,
    /// Drop completed tiles whose generation is no longer current.
    pub discard_stale_tiles: bool,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            tile_size: 64,
            base_iterations: 256,
            iterations_per_octave: 128,
            initial_viewport: Viewport::default(),
            zoom_step: 0.9,
            supersample_grid: 4,
            supersample_divisor: 8,
            worker_count: None,
            discard_stale_tiles: false,
        }
    }
}

impl ExplorerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("tile_size", self.tile_size),
            ("supersample_grid", self.supersample_grid),
            ("supersample_divisor", self.supersample_divisor),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }

        if self.supersample_grid > MAX_SUPERSAMPLE_GRID {
            return Err(ConfigError::Invalid {
                field: "supersample_grid",
                reason: format!(
                    "{} exceeds the maximum of {}",
                    self.supersample_grid, MAX_SUPERSAMPLE_GRID
                ),
            });
        }

        if !(self.zoom_step > 0.0 && self.zoom_step < 1.0) {
            return Err(ConfigError::Invalid {
                field: "zoom_step",
                reason: format!("{} is outside (0, 1)", self.zoom_step),
            });
        }

        if !self.initial_viewport.is_valid() {
            return Err(ConfigError::Invalid {
                field: "initial_viewport",
                reason: "width and height must be positive and finite".to_string(),
            });
        }

        Ok(())
    }
}

/// Iteration budget for a viewport of width `width`.
///
/// `floor(base + per_octave * log2(initial_width / width))`, never below
/// `base_iterations`.
pub fn calculate_iteration_budget(initial_width: f64, width: f64, config: &ExplorerConfig) -> u32 {
    let octaves = (initial_width / width).log2();
    let octaves = if octaves.is_finite() {
        octaves.max(0.0)
    } else {
        0.0
    };

    let budget =
        (config.base_iterations as f64 + config.iterations_per_octave as f64 * octaves).floor();
    budget.min(u32::MAX as f64) as u32
}
