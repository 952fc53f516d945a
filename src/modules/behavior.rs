//! Per-agent tick: metabolism, then sense → decide → act → reconcile.

use std::f64::consts::TAU;

use rand::Rng;

use crate::modules::agent::{
    Action, Agent, DeathReason, MemoryPayload, ProximityEntry, Sensed,
};
use crate::modules::consciousness;
use crate::modules::environment::CellGrid;
use crate::modules::resource::{Resource, ResourceKind};
use crate::modules::vector::Vec3;

/// Energy burned per unit of simulated time regardless of action.
pub const METABOLIC_RATE: f64 = 0.1;
/// Below this energy an agent looks for food before anything else.
pub const LOW_ENERGY: f64 = 30.0;
/// Energy gained per unit of resource consumed.
pub const ENERGY_PER_UNIT: f64 = 5.0;
/// How close a resource must be to consume it instead of approaching.
pub const CONSUME_RANGE: f64 = 1.5;
/// How close another agent must be to communicate instead of approaching.
pub const COMMUNICATE_RANGE: f64 = 2.0;
/// Trait-weighted rules fire with probability `trait * TRAIT_GATE`.
const TRAIT_GATE: f64 = 0.3;
const DEFAULT_EXPLORE_CHANCE: f64 = 0.7;
const CROWD_SIZE: usize = 5;
const AVOIDANCE_AFFINITY: f64 = 0.3;

const ENCOUNTER_INTENSITY: f64 = 0.4;
const ACTION_INTENSITY: f64 = 0.5;
const COMMUNICATE_INTENSITY: f64 = 0.6;
const CONSUME_INTENSITY: f64 = 0.7;

/// Rebuild the proximity list and local cell levels. Agents that were not
/// sensed on the previous tick are remembered as encounters.
pub fn sense(agent: &mut Agent, agents: &[Agent], resources: &[Resource], grid: &CellGrid, now: f64) {
    let radius = agent.perception_radius;
    let origin = agent.position;
    let mut nearby: Vec<ProximityEntry> = Vec::new();

    for other in agents.iter().filter(|o| o.id != agent.id) {
        let distance = origin.distance(other.position);
        if distance <= radius {
            nearby.push(ProximityEntry {
                sensed: Sensed::Agent {
                    id: other.id.clone(),
                },
                position: other.position,
                distance,
            });
        }
    }
    for resource in resources {
        let distance = origin.distance(resource.position);
        if distance <= radius {
            nearby.push(ProximityEntry {
                sensed: Sensed::Resource {
                    id: resource.id.clone(),
                    kind: resource.kind,
                    amount: resource.amount,
                },
                position: resource.position,
                distance,
            });
        }
    }
    nearby.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.id().cmp(b.id()))
    });

    let newcomers: Vec<(String, f64)> = nearby
        .iter()
        .filter(|e| matches!(e.sensed, Sensed::Agent { .. }))
        .filter(|e| agent.sensors.entry(e.id()).is_none())
        .map(|e| (e.id().to_string(), e.distance))
        .collect();

    agent.sensors.nearby = nearby;
    if let Some(cell) = grid.cell_at(origin.rounded()) {
        agent.sensors.local = cell.resources;
    }
    for (agent_id, distance) in newcomers {
        agent.remember(
            now,
            ENCOUNTER_INTENSITY,
            MemoryPayload::Encounter { agent_id, distance },
        );
    }
}

fn reach_resource(entry: &ProximityEntry) -> Action {
    let id = entry.id().to_string();
    if entry.distance <= CONSUME_RANGE {
        Action::Consume { resource: id }
    } else {
        Action::Approach { target: id }
    }
}

fn gate<R: Rng>(rng: &mut R, weight: f64) -> bool {
    rng.r#gen::<f64>() < weight * TRAIT_GATE
}

/// Priority-ordered heuristic; the first matching rule wins.
pub fn decide<R: Rng>(agent: &Agent, agents: &[Agent], now: f64, rng: &mut R) -> Action {
    let sensors = &agent.sensors;

    if agent.energy < LOW_ENERGY {
        return match sensors.nearest_resource(|kind| kind == ResourceKind::Food) {
            Some(food) => reach_resource(food),
            None => Action::Explore,
        };
    }

    if agent.is_ready_to_reproduce(now) {
        let ready_partner = sensors.agents().find(|entry| {
            agents
                .iter()
                .find(|a| a.id == entry.id())
                .is_some_and(|a| a.is_ready_to_reproduce(now))
        });
        return match (ready_partner, sensors.nearest_agent()) {
            (Some(partner), _) => Action::Reproduce {
                partner: partner.id().to_string(),
            },
            (None, Some(nearest)) => Action::Approach {
                target: nearest.id().to_string(),
            },
            (None, None) => Action::Explore,
        };
    }

    if agent.traits.social_affinity < AVOIDANCE_AFFINITY && sensors.nearby_agent_count() >= CROWD_SIZE
    {
        if let Some(nearest) = sensors.nearest_agent() {
            return Action::Avoid {
                target: nearest.id().to_string(),
            };
        }
    }

    let traits = &agent.traits;
    if gate(rng, traits.curiosity) {
        return Action::Explore;
    }
    if gate(rng, traits.social_affinity) {
        if let Some(other) = sensors.nearest_agent() {
            let target = other.id().to_string();
            return if other.distance <= COMMUNICATE_RANGE {
                Action::Communicate { target }
            } else {
                Action::Approach { target }
            };
        }
    }
    if gate(rng, traits.resource_affinity) {
        if let Some(resource) = sensors.nearest_resource(ResourceKind::is_consumable) {
            return reach_resource(resource);
        }
    }

    if rng.r#gen::<f64>() < DEFAULT_EXPLORE_CHANCE {
        Action::Explore
    } else {
        Action::Idle
    }
}

fn heading_towards(agent: &Agent, target: &str) -> Vec3 {
    agent
        .sensors
        .entry(target)
        .or_else(|| agent.sensors.nearest())
        .map(|entry| agent.position.direction_to(entry.position))
        .unwrap_or_default()
}

/// Execute `action`, integrate position and record the action in memory.
pub fn act<R: Rng>(
    agent: &mut Agent,
    action: Action,
    resources: &mut [Resource],
    dt: f64,
    half_world: f64,
    now: f64,
    rng: &mut R,
) {
    let speed = agent.movement_speed;
    match &action {
        Action::Explore => {
            agent.velocity = Vec3::from_heading(rng.gen_range(0.0..TAU)) * speed;
        }
        Action::Approach { target } => {
            agent.velocity = heading_towards(agent, target) * speed;
        }
        Action::Avoid { target } => {
            agent.velocity = -heading_towards(agent, target) * speed;
        }
        Action::Consume { resource } => {
            agent.velocity = Vec3::origin();
            if let Some(source) = resources.iter_mut().find(|r| &r.id == resource) {
                let taken = source.consume();
                agent.gain_energy(taken * ENERGY_PER_UNIT);
                agent.remember(
                    now,
                    CONSUME_INTENSITY,
                    MemoryPayload::Action {
                        action: action.kind(),
                        target: Some(resource.clone()),
                    },
                );
            }
        }
        // Pairing happens in the reproduction pass.
        Action::Reproduce { .. } => {}
        Action::Communicate { target } => {
            agent.velocity = Vec3::origin();
            agent.remember(
                now,
                COMMUNICATE_INTENSITY,
                MemoryPayload::Action {
                    action: action.kind(),
                    target: Some(target.clone()),
                },
            );
        }
        Action::Idle => {
            agent.velocity = Vec3::origin();
        }
    }

    agent.position = (agent.position + agent.velocity * dt).clamp_horizontal(half_world);
    if !agent.velocity.is_zero() {
        agent.rotation.y = agent.velocity.yaw();
    }
    if action != Action::Idle {
        agent.remember(
            now,
            ACTION_INTENSITY,
            MemoryPayload::Action {
                action: action.kind(),
                target: action.target().map(str::to_string),
            },
        );
    }
    agent.last_action = action;
}

/// Refresh consciousness and report whether the agent has died.
pub fn reconcile(agent: &mut Agent) -> Option<DeathReason> {
    agent.consciousness = consciousness::score(agent);
    agent.death_reason()
}

/// Run one full tick for `agent` against the current population and resources.
#[allow(clippy::too_many_arguments)]
pub fn update_agent<R: Rng>(
    agent: &mut Agent,
    agents: &[Agent],
    resources: &mut [Resource],
    grid: &CellGrid,
    dt: f64,
    half_world: f64,
    now: f64,
    rng: &mut R,
) -> Option<DeathReason> {
    agent.age += dt;
    agent.energy = (agent.energy - METABOLIC_RATE * dt).max(0.0);
    if agent.death_reason().is_some() {
        return reconcile(agent);
    }

    sense(agent, agents, resources, grid, now);
    let action = decide(agent, agents, now, rng);
    act(agent, action, resources, dt, half_world, now, rng);
    reconcile(agent)
}
