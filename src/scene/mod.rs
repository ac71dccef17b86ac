//! Scene layout: fixed maze geometry and player spawn points, emitted as
//! placement records for the host to instantiate.

pub mod maze;
pub mod player;

use glam::Vec3;
use serde::{Deserialize, Serialize};

pub use maze::{build_maze, MazeParams, Obstacle};
pub use player::{spawn_player, PlayerSpawn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceKind {
    Cube,
    Pyramid,
    Plane,
}

/// One object to instantiate, already in world space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenePiece {
    pub kind: PieceKind,
    pub name: String,
    pub position: Vec3,
    /// Euler angles in degrees.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl ScenePiece {
    pub fn new(kind: PieceKind, name: impl Into<String>, position: Vec3) -> Self {
        Self {
            kind,
            name: name.into(),
            position,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}
