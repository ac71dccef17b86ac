//! Normalized height grid
//!
//! A flat row-major `Vec<f32>` of elevations in [0, 1]. Every pass reads the
//! grid, mutates it in place and hands it back; nothing keeps a shared
//! reference to it between passes.

pub mod sampler;

use rayon::prelude::*;

pub use sampler::{sample_heightmap, EdgePolicy, GrayscaleSource, SamplerParams};

#[derive(Debug, Clone, PartialEq)]
pub struct HeightGrid {
    pub data: Vec<f32>,
    pub width: usize,
    pub height: usize,
}

impl HeightGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            data: vec![0.0; width * height],
            width,
            height,
        }
    }

    /// Square grid, the shape terrains use (`resolution x resolution`).
    pub fn square(resolution: usize) -> Self {
        Self::new(resolution, resolution)
    }

    /// Build from existing values. Out-of-range values are clamped.
    pub fn from_values(width: usize, height: usize, values: Vec<f32>) -> Self {
        assert_eq!(
            values.len(),
            width * height,
            "height data size mismatch: expected {}, got {}",
            width * height,
            values.len()
        );
        let mut grid = Self {
            data: values,
            width,
            height,
        };
        grid.clamp_unit();
        grid
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    /// Writes are clamped to [0, 1].
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: f32) {
        self.data[y * self.width + x] = v.clamp(0.0, 1.0);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn fill(&mut self, v: f32) {
        self.data.fill(v.clamp(0.0, 1.0));
    }

    pub fn clamp_unit(&mut self) {
        for v in self.data.iter_mut() {
            *v = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        }
    }

    /// Apply `f(x, y, current) -> new` to every cell, one rayon task per row.
    /// Results are clamped to [0, 1].
    pub fn par_map_rows<F>(&mut self, f: F)
    where
        F: Fn(usize, usize, f32) -> f32 + Sync + Send,
    {
        let width = self.width;
        if width == 0 {
            return;
        }
        self.data
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, v) in row.iter_mut().enumerate() {
                    *v = f(x, y, *v).clamp(0.0, 1.0);
                }
            });
    }

    /// Nearest cell for fractional coordinates in [0, 1]^2.
    pub fn sample_normalized(&self, u: f32, v: f32) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let x = (u.clamp(0.0, 1.0) * (self.width.saturating_sub(1)) as f32).round() as usize;
        let y = (v.clamp(0.0, 1.0) * (self.height.saturating_sub(1)) as f32).round() as usize;
        self.get(x, y)
    }

    /// Bilinear height for fractional coordinates in [0, 1]^2.
    pub fn interpolate_normalized(&self, u: f32, v: f32) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let fx = u.clamp(0.0, 1.0) * (self.width.saturating_sub(1)) as f32;
        let fy = v.clamp(0.0, 1.0) * (self.height.saturating_sub(1)) as f32;
        let x0 = fx.floor() as usize;
        let y0 = fy.floor() as usize;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let tx = fx - x0 as f32;
        let ty = fy - y0 as f32;

        let top = lerp(self.get(x0, y0), self.get(x1, y0), tx);
        let bottom = lerp(self.get(x0, y1), self.get(x1, y1), tx);
        lerp(top, bottom, ty)
    }

    pub fn stats(&self) -> HeightStats {
        let min = self.data.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = self.data.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let mean = self.data.iter().sum::<f32>() / self.data.len().max(1) as f32;
        let variance = self.data.iter().map(|v| (v - mean).powi(2)).sum::<f32>()
            / self.data.len().max(1) as f32;
        HeightStats { min, max, mean, std_dev: variance.sqrt() }
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

pub struct HeightStats {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
    pub std_dev: f32,
}

impl std::fmt::Display for HeightStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "min={:.3}  max={:.3}  mean={:.3}  σ={:.3}",
            self.min, self.max, self.mean, self.std_dev
        )
    }
}
