// ============================================================================
// Noise Synthesis: Perlin displacement and flattening of a height grid
//
// Mathf-style Perlin: the noise crate returns roughly [-1, 1], remapped here
// to [0, 1] before being added to the existing height.
// ============================================================================

use ::noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TerrainError};
use crate::heightmap::HeightGrid;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum NoiseMode {
    /// Every cell set to 0.
    Flatten,
    /// Add Perlin noise sampled at (w * width_scale, h * height_scale).
    PerlinAdd {
        width_scale: f64,
        height_scale: f64,
        #[serde(default)]
        seed: u32,
    },
}

impl NoiseMode {
    pub fn perlin(width_scale: f64, height_scale: f64, seed: u32) -> Self {
        NoiseMode::PerlinAdd { width_scale, height_scale, seed }
    }

    /// Build a mode from the two independent toggles a host UI exposes.
    /// Both on at once is rejected rather than guessing an order.
    pub fn from_flags(
        flatten: bool,
        perlin: bool,
        width_scale: f64,
        height_scale: f64,
        seed: u32,
    ) -> Result<Option<Self>> {
        match (flatten, perlin) {
            (true, true) => Err(TerrainError::invalid(
                "flatten and perlin noise are mutually exclusive",
            )),
            (true, false) => Ok(Some(NoiseMode::Flatten)),
            (false, true) => Ok(Some(NoiseMode::perlin(width_scale, height_scale, seed))),
            (false, false) => Ok(None),
        }
    }
}

/// Value in [0, 1] of the 2D Perlin field at (x, y).
pub fn perlin01(perlin: &Perlin, x: f64, y: f64) -> f32 {
    ((perlin.get([x, y]) + 1.0) * 0.5).clamp(0.0, 1.0) as f32
}

/// Run one noise pass over `grid` and return it.
pub fn synthesize(mut grid: HeightGrid, mode: &NoiseMode) -> HeightGrid {
    match *mode {
        NoiseMode::Flatten => {
            grid.fill(0.0);
            debug!(cells = grid.len(), "flattened terrain");
        }
        NoiseMode::PerlinAdd { width_scale, height_scale, seed } => {
            let perlin = Perlin::new(seed);
            grid.par_map_rows(|w, h, v| {
                v + perlin01(&perlin, w as f64 * width_scale, h as f64 * height_scale)
            });
            debug!(seed, width_scale, height_scale, "perlin displacement: {}", grid.stats());
        }
    }
    grid
}
