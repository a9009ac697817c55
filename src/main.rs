use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use tectonic_mapgen::adapter::MockAdapter;
use tectonic_mapgen::ascii::{self, AsciiMode};
use tectonic_mapgen::catalog::Catalog;
use tectonic_mapgen::config::{MapGenConfig, SeedMode};
use tectonic_mapgen::pipeline::MapOrchestrator;

#[derive(Parser, Debug)]
#[command(name = "tectonic_mapgen")]
#[command(about = "Generate strategy-game maps from a tectonic plate simulation")]
struct Args {
    /// Width of the map in tiles
    #[arg(short = 'W', long, default_value = "84")]
    width: usize,

    /// Height of the map in tiles
    #[arg(short = 'H', long, default_value = "54")]
    height: usize,

    /// Fixed plate seed (random if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of major plates (derived from map area if not specified)
    #[arg(short = 'p', long)]
    plates: Option<usize>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Base water percentage
    #[arg(long)]
    water_percent: Option<f64>,

    /// Print ASCII views of the finished map
    #[arg(long)]
    ascii: bool,

    /// Print the stage report as JSON
    #[arg(long)]
    json: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(true).init();
}

fn main() {
    let args = Args::parse();
    init_logging();

    let mut config = match &args.config {
        Some(path) => match MapGenConfig::from_json_file(path) {
            Ok(config) => config,
            Err(e) => {
                error!("{e}");
                std::process::exit(2);
            }
        },
        None => MapGenConfig::default(),
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    config.plates.seed_mode = SeedMode::Fixed;
    config.plates.fixed_seed = Some(seed);
    if let Some(count) = args.plates {
        config.plates.count = count;
        config.plates.auto_count = false;
    }
    if let Some(water) = args.water_percent {
        config.landmass.base_water_percent = water;
    }

    info!("Generating {}x{} map with seed {}", args.width, args.height, seed);
    let mut adapter = MockAdapter::new(args.width, args.height, seed);
    let mut orchestrator = MapOrchestrator::new(config);
    let report = orchestrator.generate(&mut adapter);

    for result in &report.stage_results {
        match &result.error {
            None => info!("{:<18} ok     {:>8.1}ms", result.stage.name(), result.duration_ms),
            Some(e) => error!("{:<18} FAILED {:>8.1}ms  {}", result.stage.name(), result.duration_ms, e),
        }
    }
    info!(
        "Land tiles: {} of {}, start positions: {:?}",
        adapter.land_count(),
        args.width * args.height,
        report.start_positions
    );

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{text}"),
            Err(e) => error!("Could not serialize report: {e}"),
        }
    }

    if args.ascii {
        match Catalog::from_adapter(&adapter) {
            Ok(catalog) => {
                let fields = orchestrator.world().map(|w| w.fields());
                for mode in AsciiMode::all() {
                    println!("=== {} ===", mode.name());
                    print!("{}", ascii::render_ascii_map(&adapter, &catalog, fields, *mode));
                    if *mode == AsciiMode::Terrain {
                        println!("{}", ascii::terrain_legend());
                    }
                }
            }
            Err(e) => error!("{e}"),
        }
    }

    if !report.success {
        std::process::exit(1);
    }
}
