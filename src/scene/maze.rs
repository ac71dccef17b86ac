//! Maze layout
//!
//! Wall cubes are laid out on a unit lattice under a maze root, then the
//! root's scale stretches every child: world position = local * root_scale,
//! world scale = local scale * root_scale. Markers and the floor are not
//! children of the root and keep their own coordinates.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{PieceKind, ScenePiece};
use crate::error::{Result, TerrainError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub position: Vec3,
    pub scale: Vec3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeParams {
    /// Boundary walls run over [0, extent) in steps of `spacing`.
    pub extent: f32,
    pub spacing: f32,
    pub root_scale: Vec3,
    pub start_marker: Vec3,
    pub end_marker: Vec3,
    pub floor_position: Vec3,
    pub floor_scale: Vec3,
    pub obstacles: Vec<Obstacle>,
}

impl Default for MazeParams {
    fn default() -> Self {
        Self {
            extent:         10.0,
            spacing:        2.0,
            root_scale:     Vec3::new(7.5, 1.0, 15.0),
            start_marker:   Vec3::new(17.0, -0.5, 25.0),
            end_marker:     Vec3::new(45.0, -0.5, 90.0),
            floor_position: Vec3::new(7.7, -0.5, 15.0),
            floor_scale:    Vec3::new(2.5, 5.0, 1.0),
            obstacles: vec![
                Obstacle { position: Vec3::new(3.0, 0.0, 2.5), scale: Vec3::new(2.0, 1.0, 0.1) },
                Obstacle { position: Vec3::new(5.0, 0.0, 5.0), scale: Vec3::new(2.0, 1.0, 0.1) },
            ],
        }
    }
}

/// Lattice coordinates `start, start + spacing, ...` below `extent`.
fn steps(start: f32, extent: f32, spacing: f32) -> impl Iterator<Item = f32> {
    let count = ((extent - start) / spacing).ceil().max(0.0) as usize;
    (0..count).map(move |i| start + i as f32 * spacing)
}

pub fn build_maze(params: &MazeParams) -> Result<Vec<ScenePiece>> {
    if !(params.spacing > 0.0) {
        return Err(TerrainError::invalid("maze wall spacing must be positive"));
    }

    let last = params.extent - params.spacing;
    let mut walls: Vec<(Vec3, Vec3)> = Vec::new();

    // Left edge includes the corner at the origin; the others start one step in.
    walls.extend(steps(0.0, params.extent, params.spacing).map(|x| (Vec3::new(x, 0.0, 0.0), Vec3::ONE)));
    walls.extend(steps(params.spacing, params.extent, params.spacing).map(|z| (Vec3::new(0.0, 0.0, z), Vec3::ONE)));
    walls.extend(steps(params.spacing, params.extent, params.spacing).map(|x| (Vec3::new(x, 0.0, last), Vec3::ONE)));
    walls.extend(steps(params.spacing, params.extent, params.spacing).map(|z| (Vec3::new(last, 0.0, z), Vec3::ONE)));
    walls.extend(params.obstacles.iter().map(|o| (o.position, o.scale)));

    let mut pieces: Vec<ScenePiece> = walls
        .into_iter()
        .enumerate()
        .map(|(i, (local, scale))| ScenePiece {
            scale: scale * params.root_scale,
            ..ScenePiece::new(PieceKind::Cube, format!("Wall {}", i), local * params.root_scale)
        })
        .collect();

    pieces.push(ScenePiece::new(PieceKind::Pyramid, "Start Marker", params.start_marker));
    pieces.push(ScenePiece {
        rotation: Vec3::new(90.0, 0.0, 0.0),
        scale: params.floor_scale,
        ..ScenePiece::new(PieceKind::Plane, "Plane", params.floor_position)
    });
    pieces.push(ScenePiece::new(PieceKind::Pyramid, "End Marker", params.end_marker));

    debug!(pieces = pieces.len(), "built maze layout");
    Ok(pieces)
}
