// ============================================================================
// Terrain: the value every generation pass reads from and writes back into
//
// Replaces the engine-owned terrain data object: size and origin in world
// units, the normalized height grid, the alphamap and layer list, and the
// tree prototype/instance lists. Passes take what they need by reference or
// by value and the generator moves the whole thing through the pipeline.
// ============================================================================

pub mod ground;

use glam::Vec3;

use crate::error::{Result, TerrainError};
use crate::heightmap::HeightGrid;
use crate::placement::{TreePlacementRecord, TreePrototype};
use crate::splat::{Splatmap, TerrainLayer};

pub use ground::{GroundQuery, HeightfieldGround};

#[derive(Debug, Clone)]
pub struct Terrain {
    /// World extents: x and z footprint, y = height of a 1.0 sample.
    pub size: Vec3,
    /// World position of the (0, 0) corner.
    pub origin: Vec3,
    heights: HeightGrid,
    pub alphamap: Option<Splatmap>,
    pub layers: Vec<TerrainLayer>,
    pub tree_prototypes: Vec<TreePrototype>,
    pub tree_instances: Vec<TreePlacementRecord>,
}

impl Terrain {
    pub fn new(resolution: usize, size: Vec3, origin: Vec3) -> Self {
        Self {
            size,
            origin,
            heights: HeightGrid::square(resolution),
            alphamap: None,
            layers: Vec::new(),
            tree_prototypes: Vec::new(),
            tree_instances: Vec::new(),
        }
    }

    /// Heightmap resolution (samples per side).
    pub fn resolution(&self) -> usize {
        self.heights.width
    }

    pub fn heights(&self) -> &HeightGrid {
        &self.heights
    }

    /// Move the height grid out, leaving a zeroed grid of the same size.
    pub fn take_heights(&mut self) -> HeightGrid {
        let res = self.resolution();
        std::mem::replace(&mut self.heights, HeightGrid::square(res))
    }

    /// Write a whole grid back. Its resolution must match.
    pub fn set_heights(&mut self, grid: HeightGrid) -> Result<()> {
        if grid.width != self.heights.width || grid.height != self.heights.height {
            return Err(TerrainError::invalid(format!(
                "height grid is {}x{}, terrain expects {}x{}",
                grid.width,
                grid.height,
                self.heights.width,
                self.heights.height
            )));
        }
        self.heights = grid;
        Ok(())
    }

    pub fn set_alphamaps(&mut self, splat: Splatmap) {
        self.alphamap = Some(splat);
    }

    /// Normalized height at a terrain-local world position (x, z), taken
    /// from the nearest heightmap sample.
    pub fn normalized_height_at(&self, x: f32, z: f32) -> f32 {
        let u = if self.size.x > 0.0 { x / self.size.x } else { 0.0 };
        let v = if self.size.z > 0.0 { z / self.size.z } else { 0.0 };
        self.heights.sample_normalized(u, v)
    }

    /// Interpolated surface height in world units at a world (x, z).
    /// `None` outside the footprint.
    pub fn surface_height_world(&self, x: f32, z: f32) -> Option<f32> {
        let u = (x - self.origin.x) / self.size.x;
        let v = (z - self.origin.z) / self.size.z;
        if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
            return None;
        }
        Some(self.origin.y + self.heights.interpolate_normalized(u, v) * self.size.y)
    }

    /// World-space distance between neighbouring samples along the shorter axis.
    pub fn sample_spacing(&self) -> f32 {
        let cells = self.resolution().saturating_sub(1).max(1) as f32;
        (self.size.x / cells).min(self.size.z / cells)
    }
}
