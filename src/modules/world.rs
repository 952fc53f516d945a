use std::fmt;

use clap::ValueEnum;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::modules::agent::{Action, Agent, AgentId, DeathReason, Founder, MemoryPayload};
use crate::modules::behavior;
use crate::modules::config::SimConfig;
use crate::modules::consciousness;
use crate::modules::environment::{
    CellGrid, EnvironmentalParameters, ParameterKey, WeatherCondition,
    calculate_resource_distribution, populate_cells,
};
use crate::modules::error::SimError;
use crate::modules::evolution;
use crate::modules::resource::{MAX_RESOURCE_AMOUNT, Resource, ResourceKind, update_resource_levels};
use crate::modules::stats::{self, SimulationStatistics, TimelineCategory, TimelineEvent};
use crate::modules::vector::Vec3;

/// Parents must be at most this far apart to pair.
pub const REPRODUCTION_RANGE: f64 = 2.0;
/// Energy each parent pays for one offspring.
pub const REPRODUCTION_COST: f64 = 20.0;
/// Reproduction never takes a parent below this energy.
pub const REPRODUCTION_ENERGY_FLOOR: f64 = 10.0;
/// Fraction of every resource amount a catastrophe of intensity 1 destroys.
pub const CATASTROPHE_SEVERITY: f64 = 0.3;

const BIRTH_INTENSITY: f64 = 1.0;
const PARENT_INTENSITY: f64 = 0.8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CatastropheKind {
    Meteor,
    Plague,
    Flood,
    Wildfire,
}

impl CatastropheKind {
    pub const ALL: [CatastropheKind; 4] = [
        CatastropheKind::Meteor,
        CatastropheKind::Plague,
        CatastropheKind::Flood,
        CatastropheKind::Wildfire,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            CatastropheKind::Meteor => "meteor",
            CatastropheKind::Plague => "plague",
            CatastropheKind::Flood => "flood",
            CatastropheKind::Wildfire => "wildfire",
        }
    }

    const fn title(self) -> &'static str {
        match self {
            CatastropheKind::Meteor => "Meteor strike",
            CatastropheKind::Plague => "Plague",
            CatastropheKind::Flood => "Great flood",
            CatastropheKind::Wildfire => "Wildfire",
        }
    }
}

impl fmt::Display for CatastropheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Entries of the world's append-only event log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    AgentBorn {
        agent_id: AgentId,
        parents: [AgentId; 2],
        generation: u32,
        time: f64,
    },
    AgentDied {
        agent_id: AgentId,
        reason: DeathReason,
        age: f64,
        time: f64,
    },
    SpeciesEmerged {
        agent_id: AgentId,
        time: f64,
    },
    ParameterChanged {
        key: ParameterKey,
        value: f64,
        time: f64,
    },
    WeatherChanged {
        from: WeatherCondition,
        to: WeatherCondition,
        time: f64,
    },
    CatastropheTriggered {
        kind: CatastropheKind,
        intensity: f64,
        time: f64,
    },
}

/// Aggregate root. Every field round-trips through serde.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    pub tick: u64,
    /// Simulated time, advanced by `dt * time_scale` per tick.
    pub time: f64,
    pub time_scale: f64,
    /// Sum of the unscaled `dt` values passed to `tick`.
    pub elapsed: f64,
    /// `time mod 1`, in [0, 1).
    pub day_night_cycle: f64,
    pub world_size: f64,
    pub seed: u64,
    pub environment: EnvironmentalParameters,
    pub resources: Vec<Resource>,
    pub agents: Vec<Agent>,
    pub grid: CellGrid,
    pub statistics: SimulationStatistics,
    pub events: Vec<Event>,
    pub timeline: Vec<TimelineEvent>,
    pub next_agent_id: u64,
    pub next_event_id: u64,
}

impl WorldState {
    pub fn half_world(&self) -> f64 {
        self.world_size / 2.0
    }

    pub fn agent(&self, id: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn resource(&self, id: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == id)
    }

    fn allocate_agent_id(&mut self) -> AgentId {
        self.next_agent_id += 1;
        format!("agent-{}", self.next_agent_id)
    }
}

fn allocate_event_id(counter: &mut u64) -> String {
    *counter += 1;
    format!("event-{}", counter)
}

/// What happened during one committed tick.
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub time: f64,
    pub events: Vec<Event>,
    pub timeline: Vec<TimelineEvent>,
}

impl TickReport {
    pub fn births(&self) -> impl Iterator<Item = &AgentId> {
        self.events.iter().filter_map(|e| match e {
            Event::AgentBorn { agent_id, .. } => Some(agent_id),
            _ => None,
        })
    }

    pub fn deaths(&self) -> impl Iterator<Item = (&AgentId, DeathReason)> {
        self.events.iter().filter_map(|e| match e {
            Event::AgentDied {
                agent_id, reason, ..
            } => Some((agent_id, *reason)),
            _ => None,
        })
    }
}

#[derive(Clone, Debug)]
pub struct TickOutcome {
    pub world: WorldState,
    pub report: TickReport,
}

fn spawn_resource<R: Rng>(kind: ResourceKind, n: usize, half: f64, rng: &mut R) -> Resource {
    let position = Vec3::new(rng.gen_range(-half..half), 0.0, rng.gen_range(-half..half));
    let (amount, regeneration_rate) = match kind {
        ResourceKind::Food => (rng.gen_range(50.0..=MAX_RESOURCE_AMOUNT), rng.gen_range(0.5..=1.5)),
        ResourceKind::Water => (rng.gen_range(50.0..=MAX_RESOURCE_AMOUNT), rng.gen_range(0.3..=1.0)),
        ResourceKind::Light => (MAX_RESOURCE_AMOUNT, 0.0),
    };
    Resource {
        id: format!("{}-{}", kind, n),
        kind,
        position,
        amount,
        regeneration_rate,
        last_regeneration: 0.0,
    }
}

/// Fresh world with randomly placed resources and the two founders.
pub fn initialize_world<R: Rng>(config: &SimConfig, rng: &mut R) -> Result<WorldState, SimError> {
    let config = config.normalized()?;
    let half = config.world_size / 2.0;

    let mut resources = Vec::new();
    for (kind, count) in [
        (ResourceKind::Food, config.food_count),
        (ResourceKind::Water, config.water_count),
        (ResourceKind::Light, config.light_count),
    ] {
        for n in 1..=count {
            resources.push(spawn_resource(kind, n, half, rng));
        }
    }

    let mut grid = CellGrid::new(
        config.grid_size,
        config.world_size,
        config.environment.temperature,
        rng,
    );
    populate_cells(&mut grid, &resources);
    calculate_resource_distribution(&mut grid, &config.environment);

    let founders: Vec<Agent> = [Founder::Adam, Founder::Eve]
        .into_iter()
        .map(Founder::spawn)
        .collect();
    let mut agents = founders.clone();
    for agent in agents.iter_mut() {
        behavior::sense(agent, &founders, &resources, &grid, 0.0);
        agent.consciousness = consciousness::score(agent);
    }
    grid.recompute_occupancy(agents.iter().map(|a| (a.id.as_str(), a.position)));

    let mut next_event_id = 0;
    let genesis = TimelineEvent {
        id: allocate_event_id(&mut next_event_id),
        timestamp: 0.0,
        title: "Genesis".to_string(),
        description: "Adam and Eve awaken in an untouched world".to_string(),
        category: TimelineCategory::Population,
        significance: 1.0,
    };

    info!(
        seed = config.seed,
        resources = resources.len(),
        grid = config.grid_size,
        "world initialized"
    );

    Ok(WorldState {
        tick: 0,
        time: 0.0,
        time_scale: config.time_scale,
        elapsed: 0.0,
        day_night_cycle: 0.0,
        world_size: config.world_size,
        seed: config.seed,
        environment: config.environment.clone(),
        statistics: SimulationStatistics::compute(&agents),
        resources,
        agents,
        grid,
        events: Vec::new(),
        timeline: vec![genesis],
        next_agent_id: 0,
        next_event_id,
    })
}

/// Advance `world` by one step of `dt * time_scale` and return the new state.
///
/// The input is never modified: on error the caller still holds the previous
/// state untouched.
pub fn tick<R: Rng>(world: &WorldState, dt: f64, rng: &mut R) -> Result<TickOutcome, SimError> {
    if !dt.is_finite() || dt <= 0.0 {
        return Err(SimError::InvalidDeltaTime(dt));
    }
    let step = dt * world.time_scale;
    if !step.is_finite() || step <= 0.0 {
        return Err(SimError::InvalidDeltaTime(step));
    }

    let mut next = world.clone();
    let mut events = Vec::new();
    let mut timeline = Vec::new();

    next.tick += 1;
    next.time += step;
    next.elapsed += dt;
    next.day_night_cycle = next.time.rem_euclid(1.0);
    let now = next.time;

    update_resource_levels(
        &mut next.resources,
        step,
        next.environment.food_growth_rate,
        now,
    );
    if let Some((kind, intensity)) = roll_catastrophe(&next.environment, step, rng) {
        let (event, entry) = apply_catastrophe(&mut next, kind, intensity);
        events.push(event);
        timeline.push(entry);
    }

    agent_pass(&mut next, step, rng, &mut events);
    reproduction_pass(&mut next, rng, &mut events);

    let current = SimulationStatistics::compute(&next.agents);
    let counter = &mut next.next_event_id;
    let milestones = stats::detect_milestones(&next.statistics, &current, now, || {
        allocate_event_id(counter)
    });
    for milestone in &milestones {
        info!(
            id = %milestone.id,
            category = %milestone.category,
            "timeline: {}",
            milestone.title
        );
    }
    timeline.extend(milestones);
    next.statistics = current;

    next.grid
        .recompute_occupancy(next.agents.iter().map(|a| (a.id.as_str(), a.position)));

    next.events.extend(events.iter().cloned());
    next.timeline.extend(timeline.iter().cloned());

    debug!(
        tick = next.tick,
        time = now,
        population = next.statistics.population,
        avg_consciousness = next.statistics.average_consciousness,
        "tick committed"
    );

    let report = TickReport {
        tick: next.tick,
        time: now,
        events,
        timeline,
    };
    Ok(TickOutcome {
        world: next,
        report,
    })
}

fn agent_pass<R: Rng>(world: &mut WorldState, step: f64, rng: &mut R, events: &mut Vec<Event>) {
    let now = world.time;
    let half = world.half_world();
    let mut agents = std::mem::take(&mut world.agents);
    let mut deaths: Vec<(AgentId, DeathReason, f64)> = Vec::new();

    for idx in 0..agents.len() {
        let mut agent = agents[idx].clone();
        let died = behavior::update_agent(
            &mut agent,
            &agents,
            &mut world.resources,
            &world.grid,
            step,
            half,
            now,
            rng,
        );
        if let Some(reason) = died {
            deaths.push((agent.id.clone(), reason, agent.age));
        }
        agents[idx] = agent;
    }

    agents.retain(|a| !deaths.iter().any(|(id, _, _)| *id == a.id));
    for (agent_id, reason, age) in deaths {
        info!(agent = %agent_id, %reason, age, "agent died");
        events.push(Event::AgentDied {
            agent_id,
            reason,
            age,
            time: now,
        });
    }
    world.agents = agents;
}

/// Greedy pairing of ready agents that chose to reproduce. Candidates are
/// visited in id order and each takes the first unpaired candidate in range.
pub fn pair_ready_agents(agents: &[Agent], now: f64) -> Vec<(usize, usize)> {
    let mut candidates: Vec<usize> = (0..agents.len())
        .filter(|&i| {
            matches!(agents[i].last_action, Action::Reproduce { .. })
                && agents[i].is_ready_to_reproduce(now)
        })
        .collect();
    candidates.sort_by(|&a, &b| agents[a].id.cmp(&agents[b].id));

    let mut paired = vec![false; agents.len()];
    let mut pairs = Vec::new();
    for (pos, &a) in candidates.iter().enumerate() {
        if paired[a] {
            continue;
        }
        let partner = candidates[pos + 1..].iter().copied().find(|&b| {
            !paired[b] && agents[a].position.distance(agents[b].position) <= REPRODUCTION_RANGE
        });
        if let Some(b) = partner {
            paired[a] = true;
            paired[b] = true;
            pairs.push((a, b));
        }
    }
    pairs
}

fn charge_parent(parent: &mut Agent, child_id: &str, now: f64) {
    let before = parent.energy;
    parent.energy = (before - REPRODUCTION_COST).max(REPRODUCTION_ENERGY_FLOOR.min(before));
    parent.reproduction.last_reproduction_time = now;
    parent.remember(
        now,
        PARENT_INTENSITY,
        MemoryPayload::Feedback {
            energy_delta: parent.energy - before,
            note: format!("raised {}", child_id),
        },
    );
}

fn reproduction_pass<R: Rng>(world: &mut WorldState, rng: &mut R, events: &mut Vec<Event>) {
    let now = world.time;
    let pairs = pair_ready_agents(&world.agents, now);
    let mut offspring: Vec<Agent> = Vec::with_capacity(pairs.len());

    for (a, b) in pairs {
        let id = world.allocate_agent_id();
        let child = evolution::offspring(&world.agents[a], &world.agents[b], id, now, rng);
        let mut child = evolution::mutate_agent(&child, rng);
        let parents = [world.agents[a].id.clone(), world.agents[b].id.clone()];
        child.remember(
            now,
            BIRTH_INTENSITY,
            MemoryPayload::Observation {
                note: format!("born to {} and {}", parents[0], parents[1]),
            },
        );
        behavior::sense(&mut child, &world.agents, &world.resources, &world.grid, now);
        child.consciousness = consciousness::score(&child);

        for idx in [a, b] {
            charge_parent(&mut world.agents[idx], &child.id, now);
        }

        let new_species =
            evolution::is_new_species(&child, world.agents.iter().chain(offspring.iter()));
        info!(
            agent = %child.id,
            generation = child.generation,
            parent_a = %parents[0],
            parent_b = %parents[1],
            new_species,
            "agent born"
        );
        events.push(Event::AgentBorn {
            agent_id: child.id.clone(),
            parents,
            generation: child.generation,
            time: now,
        });
        if new_species {
            events.push(Event::SpeciesEmerged {
                agent_id: child.id.clone(),
                time: now,
            });
        }
        offspring.push(child);
    }

    world.agents.extend(offspring);
}

fn roll_catastrophe<R: Rng>(
    environment: &EnvironmentalParameters,
    step: f64,
    rng: &mut R,
) -> Option<(CatastropheKind, f64)> {
    let chance = (environment.catastrophe_probability * step).clamp(0.0, 1.0);
    if chance <= 0.0 || !rng.gen_bool(chance) {
        return None;
    }
    let kind = CatastropheKind::ALL[rng.gen_range(0..CatastropheKind::ALL.len())];
    Some((kind, rng.gen_range(0.0..=1.0)))
}

fn apply_catastrophe(
    world: &mut WorldState,
    kind: CatastropheKind,
    intensity: f64,
) -> (Event, TimelineEvent) {
    let factor = 1.0 - CATASTROPHE_SEVERITY * intensity;
    for resource in world.resources.iter_mut() {
        resource.amount *= factor;
    }
    info!(%kind, intensity, "catastrophe");
    let entry = TimelineEvent {
        id: allocate_event_id(&mut world.next_event_id),
        timestamp: world.time,
        title: kind.title().to_string(),
        description: format!(
            "A {} at intensity {:.2} left {:.0}% of every resource",
            kind,
            intensity,
            factor * 100.0
        ),
        category: TimelineCategory::Extinction,
        significance: 0.5 + 0.5 * intensity,
    };
    let event = Event::CatastropheTriggered {
        kind,
        intensity,
        time: world.time,
    };
    (event, entry)
}

/// Scale every resource amount by `1 - 0.3 * intensity` and record one
/// extinction-category timeline entry.
pub fn trigger_catastrophe(
    world: &mut WorldState,
    kind: CatastropheKind,
    intensity: f64,
) -> Result<TimelineEvent, SimError> {
    if !intensity.is_finite() || !(0.0..=1.0).contains(&intensity) {
        return Err(SimError::InvalidIntensity(intensity));
    }
    let (event, entry) = apply_catastrophe(world, kind, intensity);
    world.events.push(event);
    world.timeline.push(entry.clone());
    Ok(entry)
}

/// Store a clamped parameter value and redistribute cell resources.
pub fn set_environmental_parameter(
    world: &mut WorldState,
    key: ParameterKey,
    value: f64,
) -> Result<f64, SimError> {
    let stored = world.environment.set(key, value)?;
    calculate_resource_distribution(&mut world.grid, &world.environment);
    info!(parameter = key.label(), requested = value, stored, "parameter changed");
    world.events.push(Event::ParameterChanged {
        key,
        value: stored,
        time: world.time,
    });
    Ok(stored)
}

pub fn set_weather_condition(world: &mut WorldState, weather: WeatherCondition) {
    let from = world.environment.weather_condition;
    world.environment.weather_condition = weather;
    calculate_resource_distribution(&mut world.grid, &world.environment);
    info!(%from, to = %weather, "weather changed");
    world.events.push(Event::WeatherChanged {
        from,
        to: weather,
        time: world.time,
    });
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn fresh() -> (WorldState, StdRng) {
        let mut rng = StdRng::seed_from_u64(42);
        let world = initialize_world(&SimConfig::default(), &mut rng).unwrap();
        (world, rng)
    }

    fn ready_at(id: &str, position: Vec3) -> Agent {
        let mut agent = Founder::Adam.spawn();
        agent.id = id.to_string();
        agent.position = position;
        agent.consciousness = 50.0;
        agent.last_action = Action::Reproduce {
            partner: "anyone".into(),
        };
        agent
    }

    #[test]
    fn initial_world_has_fixed_resource_counts() {
        let (world, _) = fresh();
        let count = |kind| world.resources.iter().filter(|r| r.kind == kind).count();
        assert_eq!(count(ResourceKind::Food), 25);
        assert_eq!(count(ResourceKind::Water), 15);
        assert_eq!(count(ResourceKind::Light), 10);
        assert!(
            world
                .resources
                .iter()
                .all(|r| r.amount > 0.0 && r.amount <= MAX_RESOURCE_AMOUNT)
        );
        assert_eq!(world.grid.cells.len(), 100);
        assert_eq!(world.statistics.population, 2);
        assert_eq!(world.timeline.len(), 1);
    }

    #[test]
    fn initialization_rejects_bad_config() {
        let mut rng = StdRng::seed_from_u64(1);
        let config = SimConfig {
            world_size: -1.0,
            ..SimConfig::default()
        };
        assert!(matches!(
            initialize_world(&config, &mut rng),
            Err(SimError::InvalidConfig(_))
        ));
    }

    #[test]
    fn configured_environment_is_clamped_before_ticking() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut config = SimConfig::default();
        config.environment.food_growth_rate = -50.0;
        let mut world = initialize_world(&config, &mut rng).unwrap();
        assert_eq!(world.environment.food_growth_rate, 0.0);
        for _ in 0..5 {
            world = tick(&world, 0.5, &mut rng).unwrap().world;
            assert!(world.resources.iter().all(|r| r.amount >= 0.0));
        }
    }

    #[test]
    fn tick_advances_scaled_time() {
        let (mut world, mut rng) = fresh();
        world.time_scale = 2.0;
        let next = tick(&world, 0.3, &mut rng).unwrap().world;
        assert_eq!(next.tick, 1);
        assert!((next.time - 0.6).abs() < 1e-12);
        assert!((next.elapsed - 0.3).abs() < 1e-12);
        assert!((next.day_night_cycle - 0.6).abs() < 1e-12);
        let later = tick(&next, 0.3, &mut rng).unwrap().world;
        assert!((later.day_night_cycle - 0.2).abs() < 1e-9);
        assert!((0.0..1.0).contains(&later.day_night_cycle));
    }

    #[test]
    fn invalid_dt_is_rejected() {
        let (world, mut rng) = fresh();
        for dt in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                tick(&world, dt, &mut rng),
                Err(SimError::InvalidDeltaTime(_))
            ));
        }
    }

    #[test]
    fn occupancy_follows_agents() {
        let (world, mut rng) = fresh();
        let next = tick(&world, 0.1, &mut rng).unwrap().world;
        let occupants: usize = next.grid.cells.iter().map(|c| c.occupants.len()).sum();
        assert_eq!(occupants, next.agents.len());
        for agent in &next.agents {
            let cell = next.grid.cell_at(agent.position).unwrap();
            assert!(cell.occupied);
            assert!(cell.occupants.contains(&agent.id));
        }
    }

    #[test]
    fn pairing_is_greedy_in_id_order() {
        let agents = vec![
            ready_at("c", Vec3::origin()),
            ready_at("a", Vec3::origin()),
            ready_at("b", Vec3::new(1.0, 0.0, 0.0)),
        ];
        let pairs = pair_ready_agents(&agents, 10.0);
        assert_eq!(pairs, vec![(1, 2)]);
    }

    #[test]
    fn pairing_skips_distant_and_unready_agents() {
        let mut far = ready_at("b", Vec3::new(5.0, 0.0, 0.0));
        let near = ready_at("a", Vec3::origin());
        assert!(pair_ready_agents(&[near.clone(), far.clone()], 10.0).is_empty());
        far.position = Vec3::new(1.0, 0.0, 0.0);
        far.last_action = Action::Explore;
        assert!(pair_ready_agents(&[near.clone(), far.clone()], 10.0).is_empty());
        far.last_action = Action::Reproduce {
            partner: "a".into(),
        };
        assert!(pair_ready_agents(&[near, far], 3.0).is_empty());
    }

    #[test]
    fn parent_energy_is_floored() {
        let mut parent = Founder::Eve.spawn();
        parent.energy = 25.0;
        charge_parent(&mut parent, "agent-1", 4.0);
        assert_eq!(parent.energy, 10.0);
        assert_eq!(parent.reproduction.last_reproduction_time, 4.0);
        assert!(matches!(
            parent.memory.entries().last().map(|e| &e.payload),
            Some(MemoryPayload::Feedback { energy_delta, .. }) if *energy_delta == -15.0
        ));
    }

    #[test]
    fn setters_recompute_distribution() {
        let (mut world, _) = fresh();
        let before: f64 = world.grid.cells.iter().map(|c| c.resources.food).sum();
        let stored =
            set_environmental_parameter(&mut world, ParameterKey::ResourceAbundance, 9.0).unwrap();
        assert_eq!(stored, 2.0);
        let after: f64 = world.grid.cells.iter().map(|c| c.resources.food).sum();
        assert!(after > before);

        set_weather_condition(&mut world, WeatherCondition::Storm);
        assert_eq!(world.environment.weather_condition, WeatherCondition::Storm);
        assert!(matches!(
            world.events.last(),
            Some(Event::WeatherChanged {
                to: WeatherCondition::Storm,
                ..
            })
        ));
    }

    #[test]
    fn non_finite_parameter_is_rejected() {
        let (mut world, _) = fresh();
        let before = world.clone();
        assert!(
            set_environmental_parameter(&mut world, ParameterKey::Temperature, f64::NAN).is_err()
        );
        assert_eq!(world, before);
    }

    #[test]
    fn catastrophe_rejects_out_of_range_intensity() {
        let (mut world, _) = fresh();
        let before = world.clone();
        for intensity in [-0.1, 1.5, f64::NAN] {
            assert!(matches!(
                trigger_catastrophe(&mut world, CatastropheKind::Meteor, intensity),
                Err(SimError::InvalidIntensity(_))
            ));
        }
        assert_eq!(world, before);
    }

    #[test]
    fn certain_catastrophe_fires_during_tick() {
        let (mut world, mut rng) = fresh();
        world.environment.catastrophe_probability = 1.0;
        let outcome = tick(&world, 1.0, &mut rng).unwrap();
        assert!(
            outcome
                .report
                .events
                .iter()
                .any(|e| matches!(e, Event::CatastropheTriggered { .. }))
        );
        assert!(
            outcome
                .report
                .timeline
                .iter()
                .any(|e| e.category == TimelineCategory::Extinction)
        );
    }

    #[test]
    fn event_ids_are_unique() {
        let (mut world, mut rng) = fresh();
        trigger_catastrophe(&mut world, CatastropheKind::Flood, 0.5).unwrap();
        for _ in 0..20 {
            world = tick(&world, 0.5, &mut rng).unwrap().world;
        }
        let mut ids: Vec<&str> = world.timeline.iter().map(|e| e.id.as_str()).collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }
}
