use clap::Subcommand;
use genesis::{CatastropheKind, ParameterKey, ResourceKind, Simulation, WeatherCondition};

use super::{describe_event, load_world, persist_world};

#[derive(Subcommand)]
pub enum WorldCommand {
    /// Set an environmental parameter (values are clamped into range)
    Env {
        /// temperature | light_level | resource_abundance | resource_distribution |
        /// food_growth_rate | water_availability | catastrophe_probability
        key: String,
        #[arg(allow_negative_numbers = true)]
        value: f64,
    },
    /// Change the weather and redistribute cell resources
    Weather {
        #[arg(value_enum)]
        condition: WeatherCondition,
    },
    /// Destroy part of every resource (intensity in [0, 1])
    Catastrophe {
        #[arg(value_enum)]
        kind: CatastropheKind,
        #[arg(long, default_value_t = 1.0)]
        intensity: f64,
    },
    /// Summarize the saved world
    View {
        /// Print the full world JSON to stdout
        #[arg(long)]
        json: bool,
    },
    /// List resources
    Resources {
        #[arg(long, value_enum)]
        kind: Option<ResourceKind>,
    },
    /// Print the timeline of milestones
    Timeline {
        /// Only show the most recent N entries
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print the raw event log
    Events {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

pub(super) fn run_world(cmd: WorldCommand) -> Result<(), String> {
    match cmd {
        WorldCommand::Env { key, value } => {
            let mut sim = Simulation::from_world(load_world()?);
            let stored = sim
                .set_environmental_parameter(&key, value)
                .map_err(|e| e.to_string())?;
            persist_world(sim.world())?;
            if stored != value {
                println!("{} clamped to {} (requested {})", key, stored, value);
            } else {
                println!("{} set to {}", key, stored);
            }
        }
        WorldCommand::Weather { condition } => {
            let mut sim = Simulation::from_world(load_world()?);
            sim.set_weather_condition(condition);
            persist_world(sim.world())?;
            println!("Weather is now {}", condition);
        }
        WorldCommand::Catastrophe { kind, intensity } => {
            let mut sim = Simulation::from_world(load_world()?);
            let entry = sim
                .trigger_catastrophe(kind, intensity)
                .map_err(|e| e.to_string())?;
            persist_world(sim.world())?;
            println!("{}: {}", entry.title, entry.description);
        }
        WorldCommand::View { json } => {
            let world = load_world()?;
            if json {
                let json_str = serde_json::to_string_pretty(&world).map_err(|e| e.to_string())?;
                println!("{}", json_str);
                return Ok(());
            }

            let env = &world.environment;
            let stats = &world.statistics;
            println!(
                "World: tick={} | t={:.2} | day/night={:.2} | agents={} | resources={} | timeline={}",
                world.tick,
                world.time,
                world.day_night_cycle,
                world.agents.len(),
                world.resources.len(),
                world.timeline.len()
            );
            println!("Weather: {}", env.weather_condition);
            for key in ParameterKey::ALL {
                println!(" - {} = {}", key, env.get(key));
            }
            println!(
                "Stats: consciousness avg={:.2} max={:.2} | lifespan avg={:.1} | generation={} | species={} | language={:.2} | social={:.2}",
                stats.average_consciousness,
                stats.max_consciousness,
                stats.average_lifespan,
                stats.max_generation,
                stats.species_count,
                stats.language_complexity,
                stats.social_complexity
            );
            let cells = world.grid.cells.len().max(1) as f64;
            let (food, water, light) = world.grid.cells.iter().fold((0.0, 0.0, 0.0), |acc, c| {
                (
                    acc.0 + c.resources.food,
                    acc.1 + c.resources.water,
                    acc.2 + c.resources.light,
                )
            });
            println!(
                "Cells: {}x{} | mean food={:.2} water={:.2} light={:.2} | occupied={}",
                world.grid.size,
                world.grid.size,
                food / cells,
                water / cells,
                light / cells,
                world.grid.cells.iter().filter(|c| c.occupied).count()
            );
        }
        WorldCommand::Resources { kind } => {
            let world = load_world()?;
            let listed: Vec<_> = world
                .resources
                .iter()
                .filter(|r| kind.is_none_or(|k| r.kind == k))
                .collect();
            if listed.is_empty() {
                println!("No resources found.");
            } else {
                println!("{} resource(s):", listed.len());
                for r in listed {
                    println!(
                        " - {}: {} at ({:.1}, {:.1}) amount={:.1} regen={:.2}",
                        r.id, r.kind, r.position.x, r.position.z, r.amount, r.regeneration_rate
                    );
                }
            }
        }
        WorldCommand::Timeline { limit } => {
            let world = load_world()?;
            let skip = limit.map_or(0, |n| world.timeline.len().saturating_sub(n));
            if world.timeline.is_empty() {
                println!("No timeline entries yet.");
            }
            for entry in world.timeline.iter().skip(skip) {
                println!(
                    "{} t={:.2} [{}] {}: {} (significance {:.1})",
                    entry.id,
                    entry.timestamp,
                    entry.category,
                    entry.title,
                    entry.description,
                    entry.significance
                );
            }
        }
        WorldCommand::Events { limit } => {
            let world = load_world()?;
            if world.events.is_empty() {
                println!("No events recorded yet.");
            }
            let skip = world.events.len().saturating_sub(limit);
            for event in world.events.iter().skip(skip) {
                println!(" - {}", describe_event(event));
            }
        }
    }

    Ok(())
}
