use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TerrainError};
use crate::terrain::Terrain;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterDef {
    /// Prefab handle of the water object.
    pub object: String,
    pub min_height: f32,
    pub max_height: f32,
    pub scale: Vec3,
    pub max_attempts: u32,
}

impl Default for WaterDef {
    fn default() -> Self {
        Self {
            object: "water".to_string(),
            min_height: 0.0,
            max_height: 0.1,
            scale: Vec3::ONE,
            max_attempts: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterPlacementRecord {
    pub object: String,
    pub world_position: Vec3,
    pub scale: Vec3,
}

/// Rejection-sample a footprint location whose normalized height lies in
/// `[min_height, max_height]` and place the water object there.
pub fn place_water<R>(terrain: &Terrain, def: &WaterDef, rng: &mut R) -> Result<WaterPlacementRecord>
where
    R: Rng + ?Sized,
{
    if terrain.heights().is_empty() {
        return Err(TerrainError::invalid("cannot place water on a terrain without heights"));
    }
    let size = terrain.size;

    for attempt in 1..=def.max_attempts {
        let x = rng.gen_range(0.0..=size.x.max(0.0));
        let z = rng.gen_range(0.0..=size.z.max(0.0));
        let h = terrain.normalized_height_at(x, z);

        if h < def.min_height || h > def.max_height {
            continue;
        }

        let world_position = terrain.origin + Vec3::new(x, h * size.y, z);
        debug!(attempt, ?world_position, "placed water");
        return Ok(WaterPlacementRecord {
            object: def.object.clone(),
            world_position,
            scale: def.scale,
        });
    }

    Err(TerrainError::ExhaustedAttempts {
        min: def.min_height,
        max: def.max_height,
        attempts: def.max_attempts,
    })
}
