pub mod modules;

pub use modules::agent::{
    Action, ActionKind, Agent, AgentId, DeathReason, Founder, MAX_ENERGY, MEMORY_CAPACITY,
    MemoryEntry, MemoryKind, MemoryLog, MemoryPayload, ProximityEntry, ReproductionState, Sensed,
    SensorSnapshot, Traits,
};
pub use modules::behavior;
pub use modules::color::Color;
pub use modules::config::{self, SimConfig, load_config, save_config};
pub use modules::consciousness;
pub use modules::environment::{
    Cell, CellGrid, EnvironmentalParameters, ParameterKey, ResourceLevels, WeatherCondition,
    calculate_resource_distribution, populate_cells,
};
pub use modules::error::SimError;
pub use modules::evolution;
pub use modules::resource::{Resource, ResourceKind, update_resource_levels};
pub use modules::sim::Simulation;
pub use modules::snapshot::{
    WorldSnapshot, load_latest_snapshot_from_dir, load_world_snapshot, save_world_snapshot,
    save_world_snapshot_tick, snapshot_file_path, snapshots_dir,
};
pub use modules::state::{self, RuntimeState, Status};
pub use modules::stats::{ActionTally, SimulationStatistics, TimelineCategory, TimelineEvent};
pub use modules::vector::Vec3;
pub use modules::world::{
    self, CatastropheKind, Event, TickOutcome, TickReport, WorldState, initialize_world,
    set_environmental_parameter, set_weather_condition, tick, trigger_catastrophe,
};
