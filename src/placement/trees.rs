//! Tree placement
//!
//! Walks a lattice with spacing `spacing` over the terrain footprint (z rows
//! outer, x inner) and tries every species at every lattice point, in list
//! order. A candidate survives if the lattice height lies in the species
//! band and the jittered position finds ground, first downward then upward.
//! Once `max_trees` records exist the scan stops, so species earlier in the
//! list take the remaining slots.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Result, TerrainError};
use crate::terrain::{GroundQuery, Terrain};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSpeciesDef {
    pub mesh: String,
    pub min_height: f32,
    pub max_height: f32,
}

impl TreeSpeciesDef {
    pub fn new(mesh: impl Into<String>, min_height: f32, max_height: f32) -> Self {
        Self {
            mesh: mesh.into(),
            min_height,
            max_height,
        }
    }

    pub fn accepts(&self, height: f32) -> bool {
        height >= self.min_height && height <= self.max_height
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreePrototype {
    pub mesh: String,
}

pub fn build_prototypes(species: &[TreeSpeciesDef]) -> Vec<TreePrototype> {
    species
        .iter()
        .map(|s| TreePrototype { mesh: s.mesh.clone() })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreePlacementRecord {
    /// Normalized terrain position, each component in [0, 1].
    pub position: Vec3,
    pub rotation_degrees: f32,
    pub species_index: usize,
    pub width_scale: f32,
    pub height_scale: f32,
    pub color: [f32; 4],
    pub lightmap_color: [f32; 4],
}

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeParams {
    pub max_trees: usize,
    pub spacing: f32,
    pub random_x_range: f32,
    pub random_z_range: f32,
    /// Collision layer index the ground lives on.
    pub layer_index: u32,
    pub search_distance: f32,
    pub width_scale: f32,
    pub height_scale: f32,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_trees:      1000,
            spacing:        10.0,
            random_x_range: 5.0,
            random_z_range: 5.0,
            layer_index:    8,
            search_distance: 100.0,
            width_scale:    0.95,
            height_scale:   0.95,
        }
    }
}

impl TreeParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.spacing > 0.0) {
            return Err(TerrainError::invalid("tree spacing must be positive"));
        }
        if !(self.random_x_range >= 0.0) || !(self.random_z_range >= 0.0) {
            return Err(TerrainError::invalid("tree jitter ranges must be non-negative"));
        }
        if self.layer_index >= 32 {
            return Err(TerrainError::invalid("tree layer index must be below 32"));
        }
        Ok(())
    }

    pub fn layer_mask(&self) -> u32 {
        1 << self.layer_index
    }
}

/// Produce a fresh list of tree instances for `terrain`.
pub fn place_trees<R>(
    terrain: &Terrain,
    species: &[TreeSpeciesDef],
    params: &TreeParams,
    ground: &dyn GroundQuery,
    rng: &mut R,
) -> Result<Vec<TreePlacementRecord>>
where
    R: Rng + ?Sized,
{
    params.validate()?;
    if terrain.heights().is_empty() {
        return Err(TerrainError::invalid("cannot place trees on a terrain without heights"));
    }

    let size = terrain.size;
    let steps_x = (size.x / params.spacing).ceil().max(0.0) as usize;
    let steps_z = (size.z / params.spacing).ceil().max(0.0) as usize;
    let mask = params.layer_mask();
    let mut trees = Vec::new();
    let mut misses = 0usize;

    'scan: for iz in 0..steps_z {
        let z = iz as f32 * params.spacing;
        for ix in 0..steps_x {
            let x = ix as f32 * params.spacing;

            for (species_index, def) in species.iter().enumerate() {
                if trees.len() >= params.max_trees {
                    break 'scan;
                }

                let current = terrain.normalized_height_at(x, z);
                if !def.accepts(current) {
                    continue;
                }

                let jx = rng.gen_range(-params.random_x_range..=params.random_x_range);
                let jz = rng.gen_range(-params.random_z_range..=params.random_z_range);
                let nx = ((x + jx) / size.x).clamp(0.0, 1.0);
                let nz = ((z + jz) / size.z).clamp(0.0, 1.0);

                let probe = terrain.origin + Vec3::new(nx * size.x, current * size.y, nz * size.z);
                let hit = ground
                    .raycast(probe, Vec3::NEG_Y, params.search_distance, mask)
                    .or_else(|| ground.raycast(probe, Vec3::Y, params.search_distance, mask));

                let Some(hit) = hit else {
                    trace!(?probe, species_index, "no ground under tree candidate");
                    misses += 1;
                    continue;
                };

                let ny = ((hit.y - terrain.origin.y) / size.y).clamp(0.0, 1.0);
                trees.push(TreePlacementRecord {
                    position: Vec3::new(nx, ny, nz),
                    rotation_degrees: rng.gen_range(0.0..360.0),
                    species_index,
                    width_scale: params.width_scale,
                    height_scale: params.height_scale,
                    color: WHITE,
                    lightmap_color: WHITE,
                });
            }
        }
    }

    debug!(placed = trees.len(), misses, species = species.len(), "placed trees");
    Ok(trees)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::HeightfieldGround;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Heights rise linearly along x from 0 to 1.
    fn ramp_terrain() -> Terrain {
        let mut t = Terrain::new(33, Vec3::new(320.0, 100.0, 320.0), Vec3::new(-50.0, 0.0, 20.0));
        let mut g = t.take_heights();
        g.par_map_rows(|x, _, _| x as f32 / 32.0);
        t.set_heights(g).unwrap();
        t
    }

    fn flat_terrain(h: f32) -> Terrain {
        let mut t = Terrain::new(17, Vec3::new(160.0, 100.0, 160.0), Vec3::ZERO);
        let mut g = t.take_heights();
        g.fill(h);
        t.set_heights(g).unwrap();
        t
    }

    struct NeverHits;
    impl GroundQuery for NeverHits {
        fn raycast(&self, _: Vec3, _: Vec3, _: f32, _: u32) -> Option<Vec3> {
            None
        }
    }

    struct UpOnly(f32);
    impl GroundQuery for UpOnly {
        fn raycast(&self, o: Vec3, d: Vec3, _: f32, _: u32) -> Option<Vec3> {
            (d.y > 0.0).then(|| Vec3::new(o.x, self.0, o.z))
        }
    }

    #[test]
    fn test_never_exceeds_cap() {
        let t = flat_terrain(0.4);
        let ground = HeightfieldGround::new(&t, 8);
        let species = vec![TreeSpeciesDef::new("oak", 0.0, 1.0), TreeSpeciesDef::new("pine", 0.0, 1.0)];
        let params = TreeParams { max_trees: 7, ..Default::default() };
        let mut rng = StdRng::seed_from_u64(1);
        let trees = place_trees(&t, &species, &params, &ground, &mut rng).unwrap();
        assert_eq!(trees.len(), 7);
    }

    #[test]
    fn test_species_order_wins_at_cap() {
        let t = flat_terrain(0.4);
        let ground = HeightfieldGround::new(&t, 8);
        let species = vec![TreeSpeciesDef::new("oak", 0.0, 1.0), TreeSpeciesDef::new("pine", 0.0, 1.0)];
        let params = TreeParams { max_trees: 5, ..Default::default() };
        let mut rng = StdRng::seed_from_u64(2);
        let trees = place_trees(&t, &species, &params, &ground, &mut rng).unwrap();
        let kinds: Vec<usize> = trees.iter().map(|r| r.species_index).collect();
        assert_eq!(kinds, vec![0, 1, 0, 1, 0]);
    }

    #[test]
    fn test_records_respect_species_band() {
        let t = ramp_terrain();
        let ground = HeightfieldGround::new(&t, 8);
        let species = vec![
            TreeSpeciesDef::new("palm", 0.0, 0.3),
            TreeSpeciesDef::new("fir", 0.6, 0.9),
        ];
        let params = TreeParams {
            random_x_range: 0.0,
            random_z_range: 0.0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let trees = place_trees(&t, &species, &params, &ground, &mut rng).unwrap();
        assert!(!trees.is_empty());
        for rec in &trees {
            // Without jitter the snapped height is the lattice height.
            let def = &species[rec.species_index];
            assert!(def.accepts(rec.position.y), "{:?} outside {:?}", rec, def);
            assert!((0.0..360.0).contains(&rec.rotation_degrees));
            assert_eq!(rec.width_scale, 0.95);
        }
        assert!(trees.iter().any(|r| r.species_index == 0));
        assert!(trees.iter().any(|r| r.species_index == 1));
    }

    #[test]
    fn test_positions_normalized() {
        let t = ramp_terrain();
        let ground = HeightfieldGround::new(&t, 8);
        let species = vec![TreeSpeciesDef::new("any", 0.0, 1.0)];
        let params = TreeParams { random_x_range: 30.0, random_z_range: 30.0, ..Default::default() };
        let mut rng = StdRng::seed_from_u64(4);
        let trees = place_trees(&t, &species, &params, &ground, &mut rng).unwrap();
        for rec in &trees {
            for c in rec.position.to_array() {
                assert!((0.0..=1.0).contains(&c));
            }
        }
    }

    #[test]
    fn test_miss_skips_candidate() {
        let t = flat_terrain(0.5);
        let species = vec![TreeSpeciesDef::new("oak", 0.0, 1.0)];
        let mut rng = StdRng::seed_from_u64(5);
        let trees = place_trees(&t, &species, &TreeParams::default(), &NeverHits, &mut rng).unwrap();
        assert!(trees.is_empty());
    }

    #[test]
    fn test_upward_fallback() {
        let t = flat_terrain(0.5);
        let species = vec![TreeSpeciesDef::new("oak", 0.0, 1.0)];
        let params = TreeParams { max_trees: 3, ..Default::default() };
        let mut rng = StdRng::seed_from_u64(6);
        let trees = place_trees(&t, &species, &params, &UpOnly(70.0), &mut rng).unwrap();
        assert_eq!(trees.len(), 3);
        assert!(trees.iter().all(|r| (r.position.y - 0.7).abs() < 1e-6));
    }

    #[test]
    fn test_same_seed_same_forest() {
        let t = ramp_terrain();
        let ground = HeightfieldGround::new(&t, 8);
        let species = vec![TreeSpeciesDef::new("any", 0.2, 0.8)];
        let a = place_trees(&t, &species, &TreeParams::default(), &ground, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = place_trees(&t, &species, &TreeParams::default(), &ground, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_spacing_rejected() {
        let t = flat_terrain(0.5);
        let params = TreeParams { spacing: 0.0, ..Default::default() };
        let err = place_trees(&t, &[], &params, &NeverHits, &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(err, TerrainError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_prototypes_follow_species_order() {
        let protos = build_prototypes(&[TreeSpeciesDef::new("a", 0.0, 1.0), TreeSpeciesDef::new("b", 0.0, 1.0)]);
        assert_eq!(protos.iter().map(|p| p.mesh.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_terrain_rejected() {
        let t = Terrain::new(0, Vec3::new(100.0, 50.0, 100.0), Vec3::ZERO);
        let species = vec![TreeSpeciesDef::new("oak", 0.0, 1.0)];
        let err = place_trees(&t, &species, &TreeParams::default(), &NeverHits, &mut StdRng::seed_from_u64(0))
            .unwrap_err();
        assert!(matches!(err, TerrainError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_nan_jitter_rejected() {
        let params = TreeParams { random_x_range: f32::NAN, ..Default::default() };
        assert!(matches!(params.validate(), Err(TerrainError::InvalidConfiguration(_))));
        let params = TreeParams { random_z_range: f32::NAN, ..Default::default() };
        assert!(params.validate().is_err());
        let params = TreeParams { random_x_range: -1.0, ..Default::default() };
        assert!(params.validate().is_err());
    }
}
