use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use directional_traffic::simulation::{
    GridLayout, ScenarioConfig, ScenarioMode, ScenarioSetup, SimWorld, DEFAULT_BASELINE_INTERVAL,
    DEFAULT_MARGIN_FRACTION, DEFAULT_TRAFFIC_LEVEL, TIME_STEP,
};

#[derive(Parser)]
#[command(name = "directional_traffic")]
#[command(about = "South-only traffic scenario on a grid of intersections")]
struct Cli {
    /// Number of intersection columns
    #[arg(long, default_value_t = 1)]
    columns: usize,

    /// Number of intersection rows
    #[arg(long, default_value_t = 1)]
    rows: usize,

    /// Lanes in each direction of every road
    #[arg(long, default_value_t = 3)]
    lanes_per_road: usize,

    /// Lane width in meters
    #[arg(long, default_value_t = 4.0)]
    lane_width: f32,

    /// Speed limit in meters per second
    #[arg(long, default_value_t = 25.0)]
    speed_limit: f32,

    /// Gap between opposing directions in meters
    #[arg(long, default_value_t = 1.0)]
    median_size: f32,

    /// Distance between intersections in meters
    #[arg(long, default_value_t = 150.0)]
    distance_between: f32,

    /// Vehicles per second per lane on active spawn points
    #[arg(long, default_value_t = DEFAULT_TRAFFIC_LEVEL)]
    traffic_level: f32,

    /// Share of the spawn point Y-range counted as the south edge
    #[arg(long, default_value_t = DEFAULT_MARGIN_FRACTION)]
    margin_fraction: f32,

    /// Activate every spawn point with a fixed-interval generator instead
    #[arg(long)]
    baseline: bool,

    /// Seconds between vehicles in baseline mode
    #[arg(long, default_value_t = DEFAULT_BASELINE_INTERVAL)]
    baseline_interval: f32,

    /// Number of simulation ticks to run
    #[arg(long, default_value = "3000")]
    ticks: u32,

    /// Time delta per tick in seconds
    #[arg(long, default_value_t = TIME_STEP)]
    delta: f32,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let layout = GridLayout {
        columns: cli.columns,
        rows: cli.rows,
        lane_width: cli.lane_width,
        speed_limit: cli.speed_limit,
        lanes_per_road: cli.lanes_per_road,
        median_size: cli.median_size,
        distance_between: cli.distance_between,
    };
    let mut network = layout.build().context("Failed to build grid network")?;
    info!(
        "Grid {}x{}: {} roads, {} lanes, {} spawn points",
        layout.columns,
        layout.rows,
        network.road_count(),
        network.lane_count(),
        network.spawn_point_count()
    );

    let mode = if cli.baseline {
        ScenarioMode::Baseline {
            interval: cli.baseline_interval,
        }
    } else {
        ScenarioMode::Directional
    };
    let setup = ScenarioSetup::new(ScenarioConfig {
        traffic_level: cli.traffic_level,
        margin_fraction: cli.margin_fraction,
        mode,
    });
    let report = setup
        .apply(&mut network)
        .context("Failed to set up scenario")?;
    info!(
        "Scenario ready: {} active, {} inactive spawn points",
        report.activated, report.deactivated
    );

    let mut world = match cli.seed {
        Some(seed) => SimWorld::new_with_seed(network, seed),
        None => SimWorld::new(network),
    };

    run_headless(&mut world, cli.ticks, cli.delta)?;
    world.log_summary();
    Ok(())
}

/// Run the spawn loop without a simulation engine attached
fn run_headless(world: &mut SimWorld, ticks: u32, delta: f32) -> Result<()> {
    info!("Running {} ticks of {}s", ticks, delta);

    // Report progress once per simulated second
    let ticks_per_second = (1.0 / delta).ceil().max(1.0) as u32;

    for tick in 1..=ticks {
        world
            .tick(delta)
            .with_context(|| format!("Spawning failed at tick {}", tick))?;

        if tick % ticks_per_second == 0 {
            info!(
                "--- After tick {} ({:.1}s simulated time): {} vehicles spawned ---",
                tick, world.time, world.stats.total_spawned
            );
        }
    }

    Ok(())
}
