use clap::Subcommand;
use genesis::{Agent, MemoryPayload, SimError, Simulation};

use super::load_world;

#[derive(Subcommand)]
pub enum AgentCommand {
    /// List living agents
    List,
    /// Show one agent's state
    Show {
        id: String,
        /// Also print the agent's memory log
        #[arg(long)]
        memories: bool,
    },
}

fn describe_memory(payload: &MemoryPayload) -> String {
    match payload {
        MemoryPayload::Encounter { agent_id, distance } => {
            format!("encounter with {} at {:.2}", agent_id, distance)
        }
        MemoryPayload::Action { action, target } => match target {
            Some(target) => format!("{} -> {}", action, target),
            None => action.to_string(),
        },
        MemoryPayload::Feedback { energy_delta, note } => {
            format!("feedback {:+.1} energy ({})", energy_delta, note)
        }
        MemoryPayload::Observation { note } => format!("observed: {}", note),
    }
}

fn print_agent(agent: &Agent) {
    let t = &agent.traits;
    println!(
        "{} ({}) | generation={} | energy={:.1} | age={:.2}/{:.1} | consciousness={:.2}",
        agent.name,
        agent.id,
        agent.generation,
        agent.energy,
        agent.age,
        agent.lifespan,
        agent.consciousness
    );
    println!(
        "position=({:.2}, {:.2}, {:.2}) | color={} | perception={:.1} | speed={:.2} | mutation_rate={:.3}",
        agent.position.x,
        agent.position.y,
        agent.position.z,
        agent.color,
        agent.perception_radius,
        agent.movement_speed,
        agent.mutation_rate
    );
    println!(
        "traits: curiosity={:.2} social={:.2} resource={:.2} exploration={:.2} adaptability={:.2}",
        t.curiosity, t.social_affinity, t.resource_affinity, t.exploration, t.adaptability
    );
    println!(
        "last_action={} | sensed={} ({} agents) | memories={}",
        agent.last_action.kind(),
        agent.sensors.nearby.len(),
        agent.sensors.nearby_agent_count(),
        agent.memory.len()
    );
}

pub(super) fn run_agent(cmd: AgentCommand) -> Result<(), String> {
    let sim = Simulation::from_world(load_world()?);

    match cmd {
        AgentCommand::List => {
            let agents = &sim.world().agents;
            if agents.is_empty() {
                println!("No living agents");
            } else {
                for agent in agents {
                    println!(
                        "{} | {} | gen={} | energy={:.1} | consciousness={:.2} | action={}",
                        agent.id,
                        agent.name,
                        agent.generation,
                        agent.energy,
                        agent.consciousness,
                        agent.last_action.kind()
                    );
                }
            }
        }
        AgentCommand::Show { id, memories } => {
            let Some(agent) = sim.agent(&id) else {
                println!("agent {} not found", id);
                return Ok(());
            };
            print_agent(agent);
            if memories {
                match sim.agent_memories(&id) {
                    Ok(entries) => {
                        for entry in entries {
                            println!(
                                " - t={:.2} ({:.1}) {}",
                                entry.timestamp,
                                entry.intensity,
                                describe_memory(&entry.payload)
                            );
                        }
                    }
                    Err(SimError::AgentNotFound(_)) => println!("agent {} not found", id),
                    Err(err) => return Err(err.to_string()),
                }
            }
        }
    }

    Ok(())
}
