use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::modules::agent::{Agent, MemoryEntry};
use crate::modules::config::SimConfig;
use crate::modules::environment::{ParameterKey, WeatherCondition};
use crate::modules::error::SimError;
use crate::modules::resource::Resource;
use crate::modules::stats::TimelineEvent;
use crate::modules::world::{self, CatastropheKind, TickReport, WorldState};

/// Owns the current committed world and the RNG driving it. Each call to
/// `step` replaces the world only after the tick fully succeeds.
#[derive(Debug, Clone)]
pub struct Simulation {
    world: WorldState,
    rng: StdRng,
}

impl Simulation {
    pub fn new(config: &SimConfig) -> Result<Self, SimError> {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let world = world::initialize_world(config, &mut rng)?;
        Ok(Self { world, rng })
    }

    /// Resume from a persisted world. The RNG is re-derived from the world's
    /// seed and tick so a resumed run is still reproducible.
    pub fn from_world(world: WorldState) -> Self {
        let rng = StdRng::seed_from_u64(world.seed ^ world.tick);
        Self { world, rng }
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    /// Owned copy of the committed state, safe to persist while stepping on.
    pub fn snapshot(&self) -> WorldState {
        self.world.clone()
    }

    pub fn into_world(self) -> WorldState {
        self.world
    }

    pub fn step(&mut self, dt: f64) -> Result<TickReport, SimError> {
        let outcome = world::tick(&self.world, dt, &mut self.rng)?;
        self.world = outcome.world;
        Ok(outcome.report)
    }

    pub fn run(&mut self, ticks: u64, dt: f64) -> Result<Vec<TickReport>, SimError> {
        (0..ticks).map(|_| self.step(dt)).collect()
    }

    pub fn set_environmental_parameter(&mut self, key: &str, value: f64) -> Result<f64, SimError> {
        let key: ParameterKey = key.parse()?;
        world::set_environmental_parameter(&mut self.world, key, value)
    }

    pub fn set_weather_condition(&mut self, weather: WeatherCondition) {
        world::set_weather_condition(&mut self.world, weather);
    }

    pub fn trigger_catastrophe(
        &mut self,
        kind: CatastropheKind,
        intensity: f64,
    ) -> Result<TimelineEvent, SimError> {
        world::trigger_catastrophe(&mut self.world, kind, intensity)
    }

    pub fn agent(&self, id: &str) -> Option<&Agent> {
        self.world.agent(id)
    }

    pub fn resource(&self, id: &str) -> Option<&Resource> {
        self.world.resource(id)
    }

    pub fn agent_memories(&self, id: &str) -> Result<&[MemoryEntry], SimError> {
        self.agent(id)
            .map(|a| a.memory.entries())
            .ok_or_else(|| SimError::AgentNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_history() {
        let config = SimConfig::default();
        let mut a = Simulation::new(&config).unwrap();
        let mut b = Simulation::new(&config).unwrap();
        a.run(30, 0.1).unwrap();
        b.run(30, 0.1).unwrap();
        assert_eq!(a.world(), b.world());
    }

    #[test]
    fn failed_step_keeps_state() {
        let mut sim = Simulation::new(&SimConfig::default()).unwrap();
        sim.step(0.1).unwrap();
        let before = sim.snapshot();
        assert!(sim.step(-0.1).is_err());
        assert_eq!(sim.world(), &before);
    }

    #[test]
    fn unknown_parameter_is_reported() {
        let mut sim = Simulation::new(&SimConfig::default()).unwrap();
        assert_eq!(
            sim.set_environmental_parameter("gravity", 1.0),
            Err(SimError::UnknownParameter("gravity".into()))
        );
        assert_eq!(sim.set_environmental_parameter("light-level", 0.4), Ok(0.4));
    }

    #[test]
    fn stale_ids_are_not_found() {
        let sim = Simulation::new(&SimConfig::default()).unwrap();
        assert!(sim.agent("adam").is_some());
        assert!(sim.agent("agent-999").is_none());
        assert!(sim.resource("food-1").is_some());
        assert!(sim.resource("food-999").is_none());
        assert!(sim.agent_memories("eve").is_ok());
        assert_eq!(
            sim.agent_memories("ghost"),
            Err(SimError::AgentNotFound("ghost".into()))
        );
    }

    #[test]
    fn resume_continues_from_tick() {
        let mut sim = Simulation::new(&SimConfig::default()).unwrap();
        sim.run(5, 0.1).unwrap();
        let mut resumed = Simulation::from_world(sim.snapshot());
        let report = resumed.step(0.1).unwrap();
        assert_eq!(report.tick, 6);
    }
}
