use std::fs;
use std::time::Duration;

use clap::{Parser, Subcommand};
use genesis::{
    Event, SimConfig, Simulation, TickReport, WorldSnapshot, WorldState, config,
    load_world_snapshot, save_world_snapshot, save_world_snapshot_tick, snapshots_dir,
    state::{self, Status},
};

mod agent;
mod world;

use agent::{AgentCommand, run_agent};
use world::{WorldCommand, run_world};

#[derive(Parser)]
#[command(
    name = "genesis",
    version,
    about = "Genesis sandbox CLI (Adam, Eve and their descendants)",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a fresh world and local state under .genesis/
    Init {
        /// RNG seed (defaults to the configured seed)
        #[arg(long)]
        seed: Option<u64>,
        /// Cells per side of the resource grid
        #[arg(long)]
        grid_size: Option<usize>,
        /// Simulated time per unit of dt
        #[arg(long)]
        time_scale: Option<f64>,
    },
    /// Run ticks against the saved world
    Start {
        /// Number of ticks to run (omit for continuous)
        #[arg(short = 't', long)]
        ticks: Option<u64>,
        /// Step size per tick (defaults to the configured default_dt)
        #[arg(long)]
        dt: Option<f64>,
        /// Desired tick rate (ticks per second). If set, overrides delay-ms.
        #[arg(long)]
        tick_rate: Option<f64>,
        /// Delay between ticks in milliseconds
        #[arg(
            short = 'd',
            long,
            default_value_t = 0,
            help = "Delay between ticks in ms (used when --tick-rate is not set; continuous runs fall back to 1 tick/sec)"
        )]
        delay_ms: u64,
    },
    /// Show runtime status
    Status,
    /// Ask a running simulation to stop after its current tick
    Stop,
    /// Inspect agents in the saved world
    Agent {
        #[command(subcommand)]
        command: AgentCommand,
    },
    /// Inspect or change the environment
    World {
        #[command(subcommand)]
        command: WorldCommand,
    },
}

pub fn run() {
    let cli = Cli::parse();
    if let Err(err) = dispatch(cli.command) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn dispatch(command: Command) -> Result<(), String> {
    match command {
        Command::Init {
            seed,
            grid_size,
            time_scale,
        } => run_init(seed, grid_size, time_scale),
        Command::Start {
            ticks,
            dt,
            tick_rate,
            delay_ms,
        } => run_start(ticks, dt, tick_rate, delay_ms),
        Command::Status => run_status(),
        Command::Stop => run_stop(),
        Command::Agent { command } => run_agent(command),
        Command::World { command } => run_world(command),
    }
}

/// Committed world from disk, or an error pointing at `genesis init`.
pub(super) fn load_world() -> Result<WorldState, String> {
    load_world_snapshot()
        .map_err(|e| e.to_string())?
        .map(|snapshot| snapshot.world)
        .ok_or_else(|| "no world found; run `genesis init` first".to_string())
}

/// Write the world as the current snapshot and as a history entry.
pub(super) fn persist_world(world: &WorldState) -> Result<(), String> {
    let snapshot = WorldSnapshot::capture(world);
    save_world_snapshot(&snapshot).map_err(|e| format!("failed to write world snapshot: {}", e))?;
    save_world_snapshot_tick(&snapshot)
        .map_err(|e| format!("failed to write tick snapshot: {}", e))?;
    Ok(())
}

fn run_init(
    seed: Option<u64>,
    grid_size: Option<usize>,
    time_scale: Option<f64>,
) -> Result<(), String> {
    let mut config: SimConfig = config::load_config().map_err(|e| e.to_string())?;
    if let Some(seed) = seed {
        config.seed = seed;
    }
    if let Some(size) = grid_size {
        config.grid_size = size;
    }
    if let Some(scale) = time_scale {
        config.time_scale = scale;
    }

    let sim = Simulation::new(&config).map_err(|e| e.to_string())?;
    config::save_config(&config).map_err(|e| e.to_string())?;

    let history = snapshots_dir();
    if history.exists() {
        fs::remove_dir_all(&history)
            .map_err(|e| format!("failed to clear {}: {}", history.display(), e))?;
    }
    persist_world(sim.world())?;
    state::init_state(sim.world()).map_err(|e| e.to_string())?;

    let world = sim.world();
    println!(
        "Initialized world (seed={}, grid={}x{}) with {} resources and {} agents",
        world.seed,
        world.grid.size,
        world.grid.size,
        world.resources.len(),
        world.agents.len()
    );
    for agent in &world.agents {
        println!(
            " - {} ({}) at ({:.1}, {:.1}, {:.1}) consciousness={:.2}",
            agent.name,
            agent.id,
            agent.position.x,
            agent.position.y,
            agent.position.z,
            agent.consciousness
        );
    }
    println!("State written to {}", state::state_file_path().display());
    Ok(())
}

fn run_status() -> Result<(), String> {
    match state::load_state().map_err(|e| e.to_string())? {
        None => {
            println!("Status: not initialized. Run `genesis init`.");
        }
        Some(state) => {
            println!(
                "Status: {:?} | last_tick={} | time={:.2} | population={} | message={}",
                state.status,
                state.last_tick,
                state.sim_time,
                state.population,
                state.message.unwrap_or_else(|| "-".into())
            );
        }
    }
    Ok(())
}

fn run_stop() -> Result<(), String> {
    let current = state::load_state().map_err(|e| e.to_string())?;
    if current.is_none() {
        return Err("Not initialized. Run `genesis init` first.".into());
    }
    let updated = state::mark(Status::Stopped, Some("stopped by user".into()))
        .map_err(|e| e.to_string())?;
    println!("Stopped. last_tick={}", updated.last_tick);
    Ok(())
}

fn tick_delay(ticks: Option<u64>, tick_rate: Option<f64>, delay_ms: u64) -> Result<Duration, String> {
    const DEFAULT_TICK_RATE: f64 = 1.0;

    match tick_rate {
        Some(rate) => {
            if !(rate.is_finite() && rate > 0.0) {
                return Err("tick_rate must be greater than 0".into());
            }
            Ok(Duration::from_secs_f64(1.0 / rate))
        }
        None if delay_ms > 0 => Ok(Duration::from_millis(delay_ms)),
        None if ticks.is_none() => Ok(Duration::from_secs_f64(1.0 / DEFAULT_TICK_RATE)),
        None => Ok(Duration::ZERO),
    }
}

fn stop_requested() -> Result<bool, String> {
    Ok(state::load_state()
        .map_err(|e| e.to_string())?
        .is_some_and(|s| s.status == Status::Stopped))
}

fn pause_run(world: &WorldState, message: String) -> Result<(), String> {
    state::set_status(Status::Paused, world, Some(message))
        .map(|_| ())
        .map_err(|e| e.to_string())
}

/// Persist a committed tick. A failed write pauses the run so the recorded
/// progress never runs ahead of what is on disk.
fn persist_or_pause(
    world: &WorldState,
    persist: impl FnOnce(&WorldState) -> Result<(), String>,
    pause: impl FnOnce(&WorldState, String) -> Result<(), String>,
) -> Result<(), String> {
    if let Err(err) = persist(world) {
        pause(world, err.clone())?;
        return Err(err);
    }
    Ok(())
}

fn run_start(
    ticks: Option<u64>,
    dt: Option<f64>,
    tick_rate: Option<f64>,
    delay_ms: u64,
) -> Result<(), String> {
    let config = config::load_config().map_err(|e| e.to_string())?;
    let dt = dt.unwrap_or(config.default_dt);
    let delay = tick_delay(ticks, tick_rate, delay_ms)?;

    let world = load_world()?;
    if world.agents.is_empty() {
        return Err("the population is extinct; run `genesis init` to start over".into());
    }
    if world.tick > 0 {
        println!("Resuming from tick {}", world.tick);
    }
    let mut sim = Simulation::from_world(world);

    state::set_status(
        Status::Running,
        sim.world(),
        Some("simulation running".into()),
    )
    .map_err(|e| e.to_string())?;

    let mut remaining = ticks;
    loop {
        let report = match sim.step(dt) {
            Ok(report) => report,
            Err(err) => {
                pause_run(sim.world(), err.to_string())?;
                return Err(err.to_string());
            }
        };
        print_tick(&report, sim.world());
        persist_or_pause(sim.world(), persist_world, pause_run)?;
        state::record_progress(sim.world()).map_err(|e| e.to_string())?;

        if sim.world().agents.is_empty() {
            println!("The population is extinct.");
            break;
        }

        match remaining {
            Some(0) => break,
            Some(ref mut n) => {
                *n = n.saturating_sub(1);
                if *n == 0 {
                    break;
                }
            }
            None => {}
        }

        if stop_requested()? {
            println!("Stop requested; halting after tick {}", report.tick);
            return Ok(());
        }

        if delay > Duration::ZERO {
            std::thread::sleep(delay);
        }
    }

    state::set_status(
        Status::Stopped,
        sim.world(),
        Some(format!("completed through tick {}", sim.world().tick)),
    )
    .map_err(|e| e.to_string())?;

    Ok(())
}

fn print_tick(report: &TickReport, world: &WorldState) {
    let stats = &world.statistics;
    println!(
        "Tick {} | t={:.2} | population={} | consciousness avg={:.2} max={:.2} | species={} | generation={}",
        report.tick,
        report.time,
        stats.population,
        stats.average_consciousness,
        stats.max_consciousness,
        stats.species_count,
        stats.max_generation
    );

    for event in &report.events {
        println!(" - {}", describe_event(event));
    }
    for entry in &report.timeline {
        println!(
            " * [{}] {}: {} (significance {:.1})",
            entry.category, entry.title, entry.description, entry.significance
        );
    }
}

pub(super) fn describe_event(event: &Event) -> String {
    match event {
        Event::AgentBorn {
            agent_id,
            parents,
            generation,
            time,
        } => format!(
            "t={:.2} {} born to {} and {} (generation {})",
            time, agent_id, parents[0], parents[1], generation
        ),
        Event::AgentDied {
            agent_id,
            reason,
            age,
            time,
        } => format!("t={:.2} {} died of {} at age {:.2}", time, agent_id, reason, age),
        Event::SpeciesEmerged { agent_id, time } => {
            format!("t={:.2} {} founded a new species", time, agent_id)
        }
        Event::ParameterChanged { key, value, time } => {
            format!("t={:.2} {} set to {}", time, key, value)
        }
        Event::WeatherChanged { from, to, time } => {
            format!("t={:.2} weather changed from {} to {}", time, from, to)
        }
        Event::CatastropheTriggered {
            kind,
            intensity,
            time,
        } => format!("t={:.2} {} struck at intensity {:.2}", time, kind, intensity),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    fn world() -> WorldState {
        Simulation::new(&SimConfig::default()).unwrap().into_world()
    }

    #[test]
    fn failed_write_pauses_with_the_error() {
        let world = world();
        let paused = RefCell::new(None);
        let result = persist_or_pause(
            &world,
            |_| Err("disk full".to_string()),
            |w, message| {
                *paused.borrow_mut() = Some((w.tick, message));
                Ok(())
            },
        );
        assert_eq!(result, Err("disk full".to_string()));
        assert_eq!(paused.into_inner(), Some((0, "disk full".to_string())));
    }

    #[test]
    fn successful_write_keeps_running() {
        let world = world();
        let result = persist_or_pause(&world, |_| Ok(()), |_, _| panic!("should not pause"));
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn bounded_runs_have_no_default_delay() {
        assert_eq!(tick_delay(Some(5), None, 0), Ok(Duration::ZERO));
        assert_eq!(tick_delay(None, None, 0), Ok(Duration::from_secs(1)));
        assert_eq!(tick_delay(None, Some(4.0), 10), Ok(Duration::from_millis(250)));
        assert!(tick_delay(None, Some(0.0), 0).is_err());
    }
}
