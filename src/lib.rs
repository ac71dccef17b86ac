//! proc-terrain: procedural terrain generation for game scenes.
//!
//! Architecture:
//! - Flat row-major height grid in [0, 1] (heightmap module), sampled from grayscale images
//! - Perlin displacement and flattening (synth module)
//! - Height-band texture splatting with normalized per-cell weights (splat module)
//! - Tree and water placement against a pluggable ground query (placement module)
//! - Grid tessellation into submesh-partitioned meshes (mesh module)
//! - Maze and player scene layout (scene module)
//!
//! `TerrainGenerator::regenerate` runs the enabled passes in order:
//! heightmap load → noise → textures → trees → water

pub mod config;
pub mod error;
pub mod generator;
pub mod heightmap;
pub mod logging;
pub mod mesh;
pub mod placement;
pub mod scene;
pub mod splat;
pub mod synth;
pub mod terrain;
pub mod viz;

pub use config::GeneratorConfig;
pub use error::{Result, TerrainError};
pub use generator::{Generation, Pass, TerrainGenerator};
pub use heightmap::{sample_heightmap, EdgePolicy, GrayscaleSource, HeightGrid, SamplerParams};
pub use mesh::{tessellate, Mesh, MeshRenderer, PointGrid};
pub use placement::{place_trees, place_water, TreePlacementRecord, WaterPlacementRecord};
pub use splat::{build_splatmap, Splatmap, TextureBand};
pub use synth::{synthesize, NoiseMode};
pub use terrain::{GroundQuery, HeightfieldGround, Terrain};
