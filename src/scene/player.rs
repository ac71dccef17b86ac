use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{PieceKind, ScenePiece};
use crate::terrain::Terrain;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSpawn {
    pub name: String,
    /// World height the player is dropped from.
    pub drop_height: f32,
}

impl Default for PlayerSpawn {
    fn default() -> Self {
        Self {
            name: "Player".to_string(),
            drop_height: 1000.0,
        }
    }
}

/// Drop the player cube at a uniformly random point over the footprint.
pub fn spawn_player<R>(terrain: &Terrain, spawn: &PlayerSpawn, rng: &mut R) -> ScenePiece
where
    R: Rng + ?Sized,
{
    let x = rng.gen_range(0.0..=terrain.size.x.max(0.0));
    let z = rng.gen_range(0.0..=terrain.size.z.max(0.0));
    let position = Vec3::new(terrain.origin.x + x, spawn.drop_height, terrain.origin.z + z);
    ScenePiece::new(PieceKind::Cube, spawn.name.clone(), position)
}
