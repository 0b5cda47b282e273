//! Command-line demo: build a classification pipeline and print an ASCII
//! biome map.
//!
//! With no arguments a built-in two-group configuration is used; pass
//! `--config <file.ron>` to load a [`LayerConfig`] from disk instead.

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use strata_layers::debug_viz;
use strata_layers::{
    BiomeDescriptor, BiomeId, GroupConfig, GroupId, LayerConfig, build_pipeline,
};

#[derive(Parser, Debug)]
#[command(about = "Render an ASCII biome map for a seed")]
struct Args {
    /// World seed.
    #[arg(long, default_value_t = 12345)]
    seed: i64,

    /// Window width in cells.
    #[arg(long, default_value_t = 72)]
    width: u32,

    /// Window height in cells.
    #[arg(long, default_value_t = 36)]
    height: u32,

    /// World x of the window's north-west corner.
    #[arg(long, default_value_t = 0)]
    x: i32,

    /// World y of the window's north-west corner.
    #[arg(long, default_value_t = 0)]
    y: i32,

    /// Optional RON file holding a LayerConfig.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// A small two-group world: a warm group with three biomes and a cold group
/// whose land picks up ice.
fn demo_config() -> LayerConfig {
    let biome = |id: u32, rarity: u32, size: u32, temperature: f32| BiomeDescriptor {
        id: BiomeId(id),
        rarity,
        size,
        temperature,
        isle_in: Vec::new(),
        border_in: Vec::new(),
        not_border_near: Vec::new(),
    };

    let mut config = LayerConfig {
        generation_depth: 5,
        land_size: 1,
        land_rarity: 3,
        land_fuzz: 2,
        biome_depths: vec![3],
        ocean_biome: BiomeId(1),
        group_rarity_total: 0,
        ..LayerConfig::default()
    };
    config.groups.insert(
        2,
        vec![
            GroupConfig {
                id: GroupId(1),
                rarity: 3,
                biomes: vec![
                    biome(2, 3, 3, 0.7),
                    biome(3, 2, 3, 0.6),
                    biome(4, 1, 3, 0.8),
                ],
            },
            GroupConfig {
                id: GroupId(2),
                rarity: 1,
                biomes: vec![biome(5, 1, 3, 0.1)],
            },
        ],
    );
    let mut isle = biome(6, 96, 4, 0.5);
    isle.isle_in = vec![BiomeId(2), BiomeId(1)];
    config.isles.insert(4, vec![isle]);
    config
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logging();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ron::from_str(&fs::read_to_string(path)?)?,
        None => demo_config(),
    };

    let mut sampler = build_pipeline(args.seed, &config)?;
    info!(seed = args.seed, stages = sampler.stage_count(), "pipeline built");

    print!(
        "{}",
        debug_viz::render_ascii(&mut sampler, args.x, args.y, args.width, args.height)
    );
    let fraction = debug_viz::land_fraction(&mut sampler, args.x, args.y, args.width, args.height);
    info!(land_fraction = format!("{fraction:.3}"), "window sampled");
    Ok(())
}
