use glam::Vec3;
use image::{GrayImage, Luma};
use rand::rngs::StdRng;
use rand::SeedableRng;

use proc_terrain::config::GeneratorConfig;
use proc_terrain::mesh::{tessellate, PointGrid, WhiteSpecular};
use proc_terrain::placement::TreeSpeciesDef;
use proc_terrain::scene::{build_maze, spawn_player};
use proc_terrain::{GroundQuery, Pass, TerrainError, TerrainGenerator};

const CONFIG: &str = r#"
[terrain]
resolution = 33
size = [320.0, 100.0, 320.0]
origin = [-160.0, 0.0, -160.0]

[passes]
load_heightmap = true
perlin_noise = true
flatten = false
add_texture = true
add_trees = true
add_water = true

[heightmap]
image = "ridge.png"

[noise]
width_scale = 0.05
height_scale = 0.05
seed = 11

[[textures.bands]]
texture = "sand.png"
min_height = 0.0
max_height = 0.6

[[textures.bands]]
texture = "rock.png"
min_height = 0.6
max_height = 1.0

[[trees.species]]
mesh = "low"
min_height = 0.0
max_height = 0.7

[[trees.species]]
mesh = "high"
min_height = 0.7
max_height = 1.0

[trees.params]
max_trees = 200

[water]
min_height = 0.0
max_height = 1.0
"#;

/// Dark on the left, bright on the right.
fn ridge() -> GrayImage {
    GrayImage::from_fn(33, 33, |x, _| Luma([(x * 4) as u8]))
}

#[test]
fn full_pipeline_from_toml() {
    let config = GeneratorConfig::from_toml_str(CONFIG).unwrap();
    let generator = TerrainGenerator::new(config).unwrap();
    let source = ridge();
    let mut rng = StdRng::seed_from_u64(2024);

    let out = generator
        .regenerate(generator.new_terrain(), Some(&source), None, &mut rng)
        .unwrap();

    assert_eq!(
        out.passes,
        vec![Pass::LoadHeightmap, Pass::Noise, Pass::Textures, Pass::Trees, Pass::Water]
    );

    let terrain = &out.terrain;
    assert!(terrain.heights().data.iter().all(|v| (0.0..=1.0).contains(v)));

    let splat = terrain.alphamap.as_ref().unwrap();
    assert_eq!((splat.width, splat.height, splat.layers), (33, 33, 2));
    for y in 0..33 {
        for x in 0..33 {
            let sum: f32 = splat.cell(x, y).iter().sum();
            assert!((sum - 1.0).abs() < 1e-5);
        }
    }

    assert!(!terrain.tree_instances.is_empty());
    assert!(terrain.tree_instances.len() <= 200);
    for tree in &terrain.tree_instances {
        assert!(tree.species_index < 2);
        for c in tree.position.to_array() {
            assert!((0.0..=1.0).contains(&c));
        }
    }

    let water = out.water.as_ref().unwrap();
    assert!((-160.0..=160.0).contains(&water.world_position.x));
    assert!((-160.0..=160.0).contains(&water.world_position.z));
}

#[test]
fn surface_mesh_and_scene() {
    let config = GeneratorConfig::from_toml_str(CONFIG).unwrap();
    let generator = TerrainGenerator::new(config).unwrap();
    let mut rng = StdRng::seed_from_u64(5);
    let out = generator
        .regenerate(generator.new_terrain(), Some(&ridge()), None, &mut rng)
        .unwrap();
    let terrain = &out.terrain;

    let surface = PointGrid::from_heights(terrain.heights(), terrain.sample_spacing(), terrain.size.y);
    let (mesh, renderer) = tessellate(&surface, 4, &WhiteSpecular).unwrap();
    assert_eq!(mesh.triangle_count(), 32 * 32 * 2);
    assert_eq!(mesh.submesh_count(), 4);
    assert!(renderer.material_for_submesh(3).is_some());

    let maze = build_maze(&generator.config.maze).unwrap();
    assert_eq!(maze.len(), 22);

    let player = spawn_player(terrain, &generator.config.player, &mut rng);
    assert!((-160.0..=160.0).contains(&player.position.x));
    assert_eq!(player.position.y, 1000.0);
}

/// A host ground that sits at a fixed world height everywhere.
struct Floor(f32);

impl GroundQuery for Floor {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32, _mask: u32) -> Option<Vec3> {
        let t = (self.0 - origin.y) / direction.y;
        (t >= 0.0 && t <= max_distance).then(|| Vec3::new(origin.x, self.0, origin.z))
    }
}

#[test]
fn custom_ground_sets_tree_heights() {
    let mut config = GeneratorConfig::from_toml_str(CONFIG).unwrap();
    config.passes.load_heightmap = false;
    config.passes.add_water = false;
    config.trees.species = vec![TreeSpeciesDef::new("any", 0.0, 1.0)];
    config.trees.params.search_distance = 500.0;
    let generator = TerrainGenerator::new(config).unwrap();

    let out = generator
        .regenerate(generator.new_terrain(), None, Some(&Floor(25.0)), &mut StdRng::seed_from_u64(1))
        .unwrap();
    assert_eq!(out.terrain.tree_instances.len(), 200);
    for tree in &out.terrain.tree_instances {
        assert!((tree.position.y - 0.25).abs() < 1e-6);
    }
}

#[test]
fn unreachable_water_band_fails_the_run() {
    let mut config = GeneratorConfig::from_toml_str(CONFIG).unwrap();
    config.passes.load_heightmap = false;
    config.passes.perlin_noise = false;
    config.passes.flatten = true;
    config.water.min_height = 0.5;
    config.water.max_height = 0.9;
    config.water.max_attempts = 100;
    let generator = TerrainGenerator::new(config).unwrap();

    let err = generator
        .regenerate(generator.new_terrain(), None, None, &mut StdRng::seed_from_u64(3))
        .unwrap_err();
    assert!(matches!(err, TerrainError::ExhaustedAttempts { attempts: 100, .. }));
}
