// ============================================================================
// proc-terrain: generate a terrain scene from a TOML config
//
//   proc-terrain --config scene.toml --seed 42 --out out/
//
// Writes heightmap.png, elevation.png, splatmap.png and, with --dump-config,
// the effective configuration as config.toml.
// ============================================================================

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};

use proc_terrain::config::GeneratorConfig;
use proc_terrain::heightmap::GrayscaleSource;
use proc_terrain::logging::init_logging;
use proc_terrain::mesh::{tessellate, PointGrid};
use proc_terrain::scene::{build_maze, spawn_player, PieceKind};
use proc_terrain::{viz, Result, TerrainGenerator};

#[derive(Parser, Debug)]
#[command(name = "proc-terrain", about = "Procedural terrain, splatmap and placement generator")]
struct Args {
    /// TOML configuration; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for every random draw (jitter, rotations, water, spawn)
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Output directory for the PNG renders
    #[arg(short, long, default_value = "out")]
    out: PathBuf,

    /// Also write the effective configuration
    #[arg(long)]
    dump_config: bool,
}

fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    println!("═══════════════════════════════════════════════════════════════");
    println!("  PROC-TERRAIN: heightmap, splatmap, trees, water, scene");
    println!("═══════════════════════════════════════════════════════════════\n");

    let config = match &args.config {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            GeneratorConfig::load(path)?
        }
        None => GeneratorConfig::default(),
    };

    let source = match (&config.heightmap.image, config.loads_heightmap()) {
        (Some(path), true) => Some(viz::load_heightmap_image(path)?),
        _ => None,
    };

    let generator = TerrainGenerator::new(config)?;
    let config = &generator.config;
    let mut rng = StdRng::seed_from_u64(args.seed);

    println!("[TERRAIN] {} samples per side, size {:?}, seed {}",
        config.terrain.resolution, config.terrain.size, args.seed);

    let generation = generator.regenerate(
        generator.new_terrain(),
        source.as_ref().map(|img| img as &dyn GrayscaleSource),
        None,
        &mut rng,
    )?;
    let terrain = &generation.terrain;

    println!("\n[PASSES] {:?}", generation.passes);
    println!("  Heights:  {}", terrain.heights().stats());
    println!("  Layers:   {}", terrain.layers.len());
    println!("  Trees:    {} instances over {} prototypes",
        terrain.tree_instances.len(), terrain.tree_prototypes.len());
    for (i, proto) in terrain.tree_prototypes.iter().enumerate() {
        let count = terrain.tree_instances.iter().filter(|t| t.species_index == i).count();
        println!("    {:<20} {:>6}", proto.mesh, count);
    }
    match &generation.water {
        Some(water) => println!("  Water:    '{}' at {:?}", water.object, water.world_position),
        None => println!("  Water:    skipped"),
    }

    let plane = &config.plane;
    let points = PointGrid::plane(plane.width, plane.height, plane.cell_size);
    let (mesh, renderer) = tessellate(&points, plane.submeshes, plane.materials.assigner().as_ref())?;
    println!("\n[MESH] {}x{} plane", plane.width, plane.height);
    println!("  {:<10} {:<12} {:<10}", "Submesh", "Triangles", "Color");
    println!("  {}", "-".repeat(34));
    for (i, indices) in mesh.submeshes.iter().enumerate() {
        let color = renderer
            .material_for_submesh(i)
            .map(|m| format!("{:?}", m.color))
            .unwrap_or_else(|| "-".to_string());
        println!("  {:<10} {:<12} {:<10}", i, indices.len() / 3, color);
    }

    let maze = build_maze(&config.maze)?;
    let player = spawn_player(terrain, &config.player, &mut rng);
    println!("\n[SCENE] maze: {} walls, {} markers",
        maze.iter().filter(|p| p.kind == PieceKind::Cube).count(),
        maze.iter().filter(|p| p.kind == PieceKind::Pyramid).count());
    println!("  {} dropped at {:?}", player.name, player.position);

    std::fs::create_dir_all(&args.out)?;
    viz::write_heightmap_png(terrain.heights(), &args.out.join("heightmap.png"))?;
    viz::write_elevation_png(terrain.heights(), &args.out.join("elevation.png"))?;
    if let Some(splat) = &terrain.alphamap {
        viz::write_splatmap_png(splat, &args.out.join("splatmap.png"))?;
    }
    if args.dump_config {
        std::fs::write(args.out.join("config.toml"), config.to_toml_string()?)?;
    }

    println!("\n[DONE] renders in {}", args.out.display());
    Ok(())
}
