//! Heightmap sampling from a grayscale image.
//!
//! cell (w, h) = grayscale(source(floor(w * sx), floor(h * sz))) * sy
//!
//! Nearest sample only, no interpolation.

use glam::Vec3;
use image::{GrayImage, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::HeightGrid;
use crate::error::{Result, TerrainError};

/// Anything that can be read as a 2D grid of grayscale values in [0, 1].
pub trait GrayscaleSource {
    fn dimensions(&self) -> (u32, u32);

    /// Grayscale at an in-bounds pixel.
    fn grayscale(&self, x: u32, y: u32) -> f32;
}

/// Luminance weights used for colour sources.
fn luminance(r: u8, g: u8, b: u8) -> f32 {
    (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32) / 255.0
}

impl GrayscaleSource for GrayImage {
    fn dimensions(&self) -> (u32, u32) {
        GrayImage::dimensions(self)
    }

    fn grayscale(&self, x: u32, y: u32) -> f32 {
        self.get_pixel(x, y).0[0] as f32 / 255.0
    }
}

impl GrayscaleSource for RgbImage {
    fn dimensions(&self) -> (u32, u32) {
        RgbImage::dimensions(self)
    }

    fn grayscale(&self, x: u32, y: u32) -> f32 {
        let [r, g, b] = self.get_pixel(x, y).0;
        luminance(r, g, b)
    }
}

impl GrayscaleSource for RgbaImage {
    fn dimensions(&self) -> (u32, u32) {
        RgbaImage::dimensions(self)
    }

    fn grayscale(&self, x: u32, y: u32) -> f32 {
        let [r, g, b, _] = self.get_pixel(x, y).0;
        luminance(r, g, b)
    }
}

/// A height grid can itself be resampled.
impl GrayscaleSource for HeightGrid {
    fn dimensions(&self) -> (u32, u32) {
        (self.width as u32, self.height as u32)
    }

    fn grayscale(&self, x: u32, y: u32) -> f32 {
        self.get(x as usize, y as usize)
    }
}

/// What to do with sample coordinates outside the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgePolicy {
    /// Fail with `OutOfRange`.
    #[default]
    Strict,
    /// Use the nearest edge pixel.
    Clamp,
    /// Toroidal addressing.
    Wrap,
}

impl EdgePolicy {
    /// Resolve a raw coordinate against a dimension of length `len`.
    fn resolve(self, coord: i64, len: u32) -> Option<u32> {
        let len = len as i64;
        if len == 0 {
            return None;
        }
        match self {
            EdgePolicy::Strict => (0..len).contains(&coord).then_some(coord as u32),
            EdgePolicy::Clamp => Some(coord.clamp(0, len - 1) as u32),
            EdgePolicy::Wrap => Some(((coord % len + len) % len) as u32),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerParams {
    /// x and z scale the sample coordinates; y scales the height.
    pub scale: Vec3,
    pub edge_policy: EdgePolicy,
}

impl Default for SamplerParams {
    fn default() -> Self {
        Self {
            scale: Vec3::ONE,
            edge_policy: EdgePolicy::Strict,
        }
    }
}

/// Produce a `resolution x resolution` grid from `source`.
pub fn sample_heightmap<S>(source: &S, resolution: usize, params: &SamplerParams) -> Result<HeightGrid>
where
    S: GrayscaleSource + ?Sized,
{
    let (src_w, src_h) = source.dimensions();
    let mut grid = HeightGrid::square(resolution);

    for h in 0..resolution {
        for w in 0..resolution {
            let sx = (w as f32 * params.scale.x).floor() as i64;
            let sz = (h as f32 * params.scale.z).floor() as i64;

            let (px, py) = match (
                params.edge_policy.resolve(sx, src_w),
                params.edge_policy.resolve(sz, src_h),
            ) {
                (Some(px), Some(py)) => (px, py),
                _ => {
                    return Err(TerrainError::OutOfRange {
                        x: sx,
                        y: sz,
                        width: src_w,
                        height: src_h,
                    })
                }
            };

            grid.set(w, h, source.grayscale(px, py) * params.scale.y);
        }
    }

    debug!(resolution, src_w, src_h, "sampled heightmap: {}", grid.stats());
    Ok(grid)
}
