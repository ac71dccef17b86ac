// ============================================================================
// Terrain Generator: sequences the passes over one Terrain value
//
// Pass order per regenerate:
//   1. Heightmap load from a grayscale source (skipped when flattening)
//   2. Perlin displacement or flatten
//   3. Texture layers + splatmap (add or remove)
//   4. Tree prototypes + instances
//   5. Water placement
// ============================================================================

use rand::Rng;
use tracing::{info, info_span, warn};

use crate::config::GeneratorConfig;
use crate::error::{Result, TerrainError};
use crate::heightmap::{sample_heightmap, GrayscaleSource};
use crate::placement::{build_prototypes, place_trees, place_water, WaterPlacementRecord};
use crate::splat::{build_layers, build_splatmap};
use crate::synth::synthesize;
use crate::terrain::{GroundQuery, HeightfieldGround, Terrain};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    LoadHeightmap,
    Noise,
    Textures,
    Trees,
    Water,
}

/// Result of one `regenerate` call.
#[derive(Debug, Clone)]
pub struct Generation {
    pub terrain: Terrain,
    pub water: Option<WaterPlacementRecord>,
    /// Passes that ran, in order.
    pub passes: Vec<Pass>,
}

pub struct TerrainGenerator {
    pub config: GeneratorConfig,
}

impl TerrainGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Empty terrain with the configured resolution, size and origin.
    pub fn new_terrain(&self) -> Terrain {
        let t = &self.config.terrain;
        Terrain::new(t.resolution, t.size, t.origin)
    }

    /// Run every enabled pass over `terrain` and hand it back.
    ///
    /// `ground` stands in for the host physics scene; without one, trees
    /// snap to the terrain's own height field.
    pub fn regenerate<R>(
        &self,
        mut terrain: Terrain,
        source: Option<&dyn GrayscaleSource>,
        ground: Option<&dyn GroundQuery>,
        rng: &mut R,
    ) -> Result<Generation>
    where
        R: Rng + ?Sized,
    {
        let config = &self.config;
        config.validate()?;
        if terrain.heights().is_empty() {
            return Err(TerrainError::invalid("terrain has no height samples"));
        }
        if terrain.resolution() != config.terrain.resolution {
            return Err(TerrainError::invalid(format!(
                "terrain resolution is {}, config expects {}",
                terrain.resolution(),
                config.terrain.resolution
            )));
        }
        let _span = info_span!("regenerate", resolution = terrain.resolution()).entered();
        let mut passes = Vec::new();

        if config.loads_heightmap() {
            let source = source.ok_or_else(|| {
                TerrainError::invalid("heightmap loading is enabled but no source was given")
            })?;
            let grid = sample_heightmap(source, terrain.resolution(), &config.heightmap.sampler)?;
            terrain.set_heights(grid)?;
            passes.push(Pass::LoadHeightmap);
        }

        if let Some(mode) = config.noise_mode()? {
            let grid = synthesize(terrain.take_heights(), &mode);
            terrain.set_heights(grid)?;
            passes.push(Pass::Noise);
        }

        if let Some(mode) = config.texture_mode() {
            if config.passes.add_texture && config.passes.remove_texture {
                warn!("both add_texture and remove_texture are set; adding");
            }
            terrain.layers = build_layers(&config.textures.bands, mode);
            let splat = build_splatmap(terrain.heights(), &config.textures.bands, &config.textures.splat)?;
            terrain.set_alphamaps(splat);
            passes.push(Pass::Textures);
        }

        if config.passes.add_trees {
            terrain.tree_prototypes = build_prototypes(&config.trees.species);
            let instances = {
                let fallback = HeightfieldGround::new(&terrain, config.trees.params.layer_index);
                let ground: &dyn GroundQuery = match ground {
                    Some(g) => g,
                    None => &fallback,
                };
                place_trees(&terrain, &config.trees.species, &config.trees.params, ground, rng)?
            };
            terrain.tree_instances = instances;
            passes.push(Pass::Trees);
        }

        let water = if config.passes.add_water {
            passes.push(Pass::Water);
            Some(place_water(&terrain, &config.water, rng)?)
        } else {
            None
        };

        info!(
            passes = passes.len(),
            trees = terrain.tree_instances.len(),
            water = water.is_some(),
            "terrain regenerated: {}",
            terrain.heights().stats()
        );
        Ok(Generation { terrain, water, passes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PassToggles;
    use crate::heightmap::HeightGrid;
    use crate::placement::TreeSpeciesDef;
    use crate::splat::TextureBand;
    use approx::assert_relative_eq;
    use glam::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_config() -> GeneratorConfig {
        let mut config = GeneratorConfig::default();
        config.terrain.resolution = 33;
        config.terrain.size = Vec3::new(320.0, 100.0, 320.0);
        config.noise.width_scale = 0.07;
        config.noise.height_scale = 0.05;
        config.noise.seed = 5;
        config.textures.bands = vec![
            TextureBand::new("low", 0.0, 0.5),
            TextureBand::new("high", 0.5, 1.0),
        ];
        config.trees.species = vec![TreeSpeciesDef::new("any", 0.0, 1.0)];
        config.water.min_height = 0.0;
        config.water.max_height = 1.0;
        config
    }

    #[test]
    fn test_all_passes_in_order() {
        let config = small_config();
        let gen = TerrainGenerator::new(config).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let out = gen.regenerate(gen.new_terrain(), None, None, &mut rng).unwrap();

        assert_eq!(out.passes, vec![Pass::Noise, Pass::Textures, Pass::Trees, Pass::Water]);
        assert_eq!(out.terrain.layers.len(), 2);
        assert!(out.terrain.alphamap.is_some());
        assert_eq!(out.terrain.tree_prototypes.len(), 1);
        assert!(!out.terrain.tree_instances.is_empty());
        assert!(out.terrain.tree_instances.len() <= 1000);
        assert!(out.water.is_some());
    }

    #[test]
    fn test_heightmap_then_flatten_skips_loading() {
        let mut config = small_config();
        config.passes = PassToggles {
            load_heightmap: true,
            perlin_noise: false,
            flatten: true,
            add_texture: false,
            remove_texture: false,
            add_trees: false,
            add_water: false,
        };
        let gen = TerrainGenerator::new(config).unwrap();
        let out = gen
            .regenerate(gen.new_terrain(), None, None, &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert_eq!(out.passes, vec![Pass::Noise]);
        assert!(out.terrain.heights().data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_heightmap_source_used() {
        let mut config = small_config();
        config.heightmap.image = Some("unused.png".into());
        config.passes = PassToggles {
            load_heightmap: true,
            perlin_noise: false,
            flatten: false,
            add_texture: true,
            remove_texture: false,
            add_trees: false,
            add_water: false,
        };
        let gen = TerrainGenerator::new(config).unwrap();
        let mut source = HeightGrid::square(33);
        source.fill(0.75);

        let out = gen
            .regenerate(gen.new_terrain(), Some(&source), None, &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert_eq!(out.passes, vec![Pass::LoadHeightmap, Pass::Textures]);
        assert_relative_eq!(out.terrain.heights().get(10, 20), 0.75);
        let splat = out.terrain.alphamap.as_ref().unwrap();
        assert_eq!(splat.cell(4, 4), &[0.0, 1.0]);
    }

    #[test]
    fn test_missing_source_is_invalid() {
        let mut config = small_config();
        config.heightmap.image = Some("unused.png".into());
        config.passes.load_heightmap = true;
        let gen = TerrainGenerator::new(config).unwrap();
        let err = gen
            .regenerate(gen.new_terrain(), None, None, &mut StdRng::seed_from_u64(0))
            .unwrap_err();
        assert!(matches!(err, TerrainError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_remove_texture_clears_handles() {
        let mut config = small_config();
        config.passes.add_texture = false;
        config.passes.remove_texture = true;
        let gen = TerrainGenerator::new(config).unwrap();
        let out = gen
            .regenerate(gen.new_terrain(), None, None, &mut StdRng::seed_from_u64(3))
            .unwrap();
        assert!(out.terrain.layers.iter().all(|l| l.texture.is_none()));
    }

    #[test]
    fn test_trees_replace_previous_instances() {
        let mut config = small_config();
        config.passes.add_water = false;
        config.trees.params.max_trees = 10;
        let gen = TerrainGenerator::new(config).unwrap();
        let first = gen
            .regenerate(gen.new_terrain(), None, None, &mut StdRng::seed_from_u64(4))
            .unwrap();
        let second = gen
            .regenerate(first.terrain, None, None, &mut StdRng::seed_from_u64(4))
            .unwrap();
        assert_eq!(second.terrain.tree_instances.len(), 10);
    }

    #[test]
    fn test_same_seed_same_result() {
        let gen = TerrainGenerator::new(small_config()).unwrap();
        let a = gen.regenerate(gen.new_terrain(), None, None, &mut StdRng::seed_from_u64(77)).unwrap();
        let b = gen.regenerate(gen.new_terrain(), None, None, &mut StdRng::seed_from_u64(77)).unwrap();
        assert_eq!(a.terrain.heights(), b.terrain.heights());
        assert_eq!(a.terrain.tree_instances, b.terrain.tree_instances);
        assert_eq!(a.water, b.water);
    }

    #[test]
    fn test_empty_terrain_rejected() {
        let gen = TerrainGenerator::new(small_config()).unwrap();
        let empty = Terrain::new(0, Vec3::new(100.0, 50.0, 100.0), Vec3::ZERO);
        let err = gen
            .regenerate(empty, None, None, &mut StdRng::seed_from_u64(0))
            .unwrap_err();
        assert!(matches!(err, TerrainError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_resolution_mismatch_rejected() {
        let gen = TerrainGenerator::new(small_config()).unwrap();
        let other = Terrain::new(17, Vec3::new(320.0, 100.0, 320.0), Vec3::ZERO);
        let err = gen
            .regenerate(other, None, None, &mut StdRng::seed_from_u64(0))
            .unwrap_err();
        assert!(matches!(err, TerrainError::InvalidConfiguration(_)));
    }
}
