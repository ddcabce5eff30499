//! # Delve Headless Runner
//!
//! Drives the simulation at a fixed delta, either from an input script or
//! with the built-in autopilot, and reports how the run went.

use clap::Parser;
use delve::{
    parse_script, Autopilot, Command, DelveResult, GameEvent, GamePhase, Simulation,
    SimulationConfig, TickOutcome,
};
use std::path::PathBuf;

#[cfg(feature = "dev-tools")]
use tracing::{info, warn, Level};

#[cfg(not(feature = "dev-tools"))]
use log::{info, warn};

/// Command line arguments for the Delve runner.
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(about = "Headless runner for the Delve dungeon crawler simulation")]
#[command(version)]
struct Args {
    /// Random seed for the run
    #[arg(short, long, default_value_t = 12345)]
    seed: u64,

    /// Ticks to simulate when no script is given
    #[arg(short, long, default_value_t = 3600)]
    ticks: u32,

    /// Fixed frame delta in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// JSON file overriding the default tuning
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input script to replay instead of the autopilot
    #[arg(long)]
    script: Option<PathBuf>,

    /// Print the final frame snapshot as JSON
    #[arg(long)]
    json: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> DelveResult<()> {
    let args = Args::parse();
    initialize_logging(&args.log_level);

    info!("Starting Delve v{} with seed {}", delve::VERSION, args.seed);

    let config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    let mut sim = Simulation::new(config, args.seed)?;

    match &args.script {
        Some(path) => {
            let commands = parse_script(&std::fs::read_to_string(path)?)?;
            info!("Replaying {} script commands from {}", commands.len(), path.display());
            run_script(&mut sim, &commands, args.dt)?;
        }
        None => {
            info!("Running autopilot for {} ticks", args.ticks);
            run_autopilot(&mut sim, args.ticks, args.dt)?;
        }
    }

    report(&sim);
    if args.json {
        println!("{}", sim.snapshot().to_json()?);
    }
    Ok(())
}

/// Initializes logging: `env_logger` normally, `tracing-subscriber` with dev-tools.
fn initialize_logging(log_level: &str) {
    #[cfg(feature = "dev-tools")]
    {
        let level = match log_level.to_lowercase().as_str() {
            "error" => Level::ERROR,
            "warn" => Level::WARN,
            "info" => Level::INFO,
            "debug" => Level::DEBUG,
            "trace" => Level::TRACE,
            _ => Level::INFO,
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .init();
    }

    #[cfg(not(feature = "dev-tools"))]
    {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
            .format_timestamp(None)
            .init();
    }
}

fn run_script(sim: &mut Simulation, commands: &[Command], dt: f32) -> DelveResult<()> {
    for command in commands {
        match *command {
            Command::Move(axes) => sim.set_movement(axes.x, axes.z),
            Command::Press(intent) => sim.press(intent),
            Command::Wait(ticks) => {
                for _ in 0..ticks {
                    step(sim, dt)?;
                }
            }
        }
    }
    Ok(())
}

fn run_autopilot(sim: &mut Simulation, ticks: u32, dt: f32) -> DelveResult<()> {
    let mut autopilot = Autopilot::new();
    for _ in 0..ticks {
        autopilot.drive(sim);
        step(sim, dt)?;
    }
    Ok(())
}

/// Advances one tick and logs the notable events it produced.
fn step(sim: &mut Simulation, dt: f32) -> DelveResult<TickOutcome> {
    let outcome = sim.tick(dt)?;
    if outcome == TickOutcome::Skipped {
        warn!("Frame delta {dt} exceeds the configured maximum; tick skipped");
    }
    for event in sim.take_events() {
        match event {
            GameEvent::FloorEntered { floor } => info!("Entered floor {floor}"),
            GameEvent::UpgradeApplied { upgrade } => info!("Took upgrade {upgrade}"),
            GameEvent::KeyAcquired => info!("Picked up the key"),
            GameEvent::PlayerDied { floor, score, kills } => {
                info!("Died on floor {floor} (score {score}, kills {kills})")
            }
            _ => {}
        }
    }
    Ok(outcome)
}

fn report(sim: &Simulation) {
    let state = sim.state();
    let stats = &state.statistics;
    let status = match state.phase {
        GamePhase::Dead => "dead",
        GamePhase::Menu => "in menu",
        GamePhase::Playing => "alive",
        GamePhase::ChoosingUpgrade => "choosing an upgrade",
    };
    info!(
        "Run ended {status}: floor {}, score {}, kills {}, hp {}/{}",
        state.floor, state.score, state.kills, state.player.hp, state.player.max_hp
    );
    info!(
        "{} ticks, {} damage dealt, {} damage taken, {} items, {} projectiles, deepest floor {}",
        stats.ticks_simulated,
        stats.damage_dealt,
        stats.damage_taken,
        stats.items_collected,
        stats.projectiles_fired,
        stats.deepest_floor
    );
}
