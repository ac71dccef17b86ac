//! Texture splatting over height bands.
//!
//! Each alphamap cell gets a weight of 1 for every band whose blended
//! interval `[min - blend, max + blend]` contains the cell height, and the
//! weight vector is normalized to sum to 1. Cells no band covers go through
//! a [`SplatFallback`].

use glam::Vec2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, TerrainError};
use crate::heightmap::HeightGrid;

/// One splat layer and the height band it covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureBand {
    /// Asset handle (path or name) of the diffuse texture.
    pub texture: String,
    pub min_height: f32,
    pub max_height: f32,
    #[serde(default = "default_tile_size")]
    pub tile_size: Vec2,
}

fn default_tile_size() -> Vec2 {
    Vec2::splat(15.0)
}

impl TextureBand {
    pub fn new(texture: impl Into<String>, min_height: f32, max_height: f32) -> Self {
        Self {
            texture: texture.into(),
            min_height,
            max_height,
            tile_size: default_tile_size(),
        }
    }

    fn covers(&self, height: f32, blend: f32) -> bool {
        height >= self.min_height - blend && height <= self.max_height + blend
    }

    /// Distance from `height` to the band interval, 0 when inside.
    fn distance(&self, height: f32) -> f32 {
        if height < self.min_height {
            self.min_height - height
        } else if height > self.max_height {
            height - self.max_height
        } else {
            0.0
        }
    }
}

/// Layer definition handed to the terrain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainLayer {
    /// `None` once textures have been removed.
    pub texture: Option<String>,
    pub tile_size: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureMode {
    Add,
    Remove,
}

/// Build the terrain layer list, one layer per band in declaration order.
pub fn build_layers(bands: &[TextureBand], mode: TextureMode) -> Vec<TerrainLayer> {
    bands
        .iter()
        .map(|band| match mode {
            TextureMode::Add => TerrainLayer {
                texture: Some(band.texture.clone()),
                tile_size: band.tile_size,
            },
            TextureMode::Remove => TerrainLayer {
                texture: None,
                tile_size: band.tile_size,
            },
        })
        .collect()
}

/// Handling for cells that no band covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplatFallback {
    /// Give full weight to the band whose interval is closest to the height.
    #[default]
    NearestBand,
    /// Fail with `DegenerateSplat`.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplatParams {
    pub blend_offset: f32,
    pub fallback: SplatFallback,
    /// Alphamap resolution; `None` uses the height grid's.
    pub resolution: Option<usize>,
}

impl Default for SplatParams {
    fn default() -> Self {
        Self {
            blend_offset: 0.01,
            fallback: SplatFallback::NearestBand,
            resolution: None,
        }
    }
}

/// Per-cell layer weights, stored `[(y * width + x) * layers + i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Splatmap {
    pub width: usize,
    pub height: usize,
    pub layers: usize,
    pub weights: Vec<f32>,
}

impl Splatmap {
    pub fn new(width: usize, height: usize, layers: usize) -> Self {
        Self {
            width,
            height,
            layers,
            weights: vec![0.0; width * height * layers],
        }
    }

    #[inline]
    pub fn cell(&self, x: usize, y: usize) -> &[f32] {
        let start = (y * self.width + x) * self.layers;
        &self.weights[start..start + self.layers]
    }

    /// Index of the heaviest layer at (x, y).
    pub fn dominant_layer(&self, x: usize, y: usize) -> usize {
        self.cell(x, y)
            .iter()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |best, (i, &w)| if w > best.1 { (i, w) } else { best })
            .0
    }
}

/// Divide every entry by the total. Returns `false`, leaving the slice
/// untouched, when the total is zero.
pub fn normalize_weights(weights: &mut [f32]) -> bool {
    let total: f32 = weights.iter().sum();
    if total <= 0.0 {
        return false;
    }
    for w in weights.iter_mut() {
        *w /= total;
    }
    true
}

/// Compute the splatmap for `heights`.
pub fn build_splatmap(heights: &HeightGrid, bands: &[TextureBand], params: &SplatParams) -> Result<Splatmap> {
    if bands.is_empty() {
        return Err(TerrainError::invalid("splatmap needs at least one texture band"));
    }
    if heights.is_empty() {
        return Err(TerrainError::invalid("splatmap needs a non-empty height grid"));
    }

    let (width, height) = match params.resolution {
        Some(res) => (res, res),
        None => (heights.width, heights.height),
    };
    let layers = bands.len();
    let mut splat = Splatmap::new(width, height, layers);

    let row_len = width * layers;
    let degenerate: Vec<(usize, usize, f32)> = splat
        .weights
        .par_chunks_mut(row_len.max(1))
        .enumerate()
        .flat_map_iter(|(y, row)| {
            let mut misses = Vec::new();
            for x in 0..width {
                // Nearest height cell; identity when resolutions match.
                let hx = x * heights.width / width;
                let hy = y * heights.height / height;
                let h = heights.get(hx, hy);

                let cell = &mut row[x * layers..(x + 1) * layers];
                for (i, band) in bands.iter().enumerate() {
                    if band.covers(h, params.blend_offset) {
                        cell[i] = 1.0;
                    }
                }

                if !normalize_weights(cell) {
                    match params.fallback {
                        SplatFallback::NearestBand => {
                            cell[nearest_band(bands, h)] = 1.0;
                        }
                        SplatFallback::Reject => {}
                    }
                    misses.push((x, y, h));
                }
            }
            misses
        })
        .collect();

    if let Some(&(x, y, h)) = degenerate.first() {
        match params.fallback {
            SplatFallback::Reject => {
                return Err(TerrainError::DegenerateSplat { x, y, height: h });
            }
            SplatFallback::NearestBand => {
                warn!(
                    cells = degenerate.len(),
                    "no band covers some heights; assigned nearest band"
                );
            }
        }
    }

    debug!(width, height, layers, "built splatmap");
    Ok(splat)
}

fn nearest_band(bands: &[TextureBand], height: f32) -> usize {
    bands
        .iter()
        .enumerate()
        .fold((0, f32::INFINITY), |best, (i, band)| {
            let d = band.distance(height);
            if d < best.1 { (i, d) } else { best }
        })
        .0
}
