use std::fmt;

use serde::{Deserialize, Serialize};

use crate::modules::color::Color;
use crate::modules::environment::ResourceLevels;
use crate::modules::resource::ResourceKind;
use crate::modules::vector::Vec3;

/// Maximum number of entries an agent remembers.
pub const MEMORY_CAPACITY: usize = 50;
/// Upper bound for agent energy.
pub const MAX_ENERGY: f64 = 100.0;

pub type AgentId = String;

/// Five bounded behavioural propensities, each in [0, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Traits {
    pub curiosity: f64,
    pub social_affinity: f64,
    pub resource_affinity: f64,
    pub exploration: f64,
    pub adaptability: f64,
}

impl Traits {
    pub const fn new(
        curiosity: f64,
        social_affinity: f64,
        resource_affinity: f64,
        exploration: f64,
        adaptability: f64,
    ) -> Self {
        Self {
            curiosity,
            social_affinity,
            resource_affinity,
            exploration,
            adaptability,
        }
    }

    pub const fn values(&self) -> [f64; 5] {
        [
            self.curiosity,
            self.social_affinity,
            self.resource_affinity,
            self.exploration,
            self.adaptability,
        ]
    }

    pub const fn from_values(v: [f64; 5]) -> Self {
        Self::new(v[0], v[1], v[2], v[3], v[4])
    }

    pub fn values_mut(&mut self) -> [&mut f64; 5] {
        [
            &mut self.curiosity,
            &mut self.social_affinity,
            &mut self.resource_affinity,
            &mut self.exploration,
            &mut self.adaptability,
        ]
    }

    pub fn mean_with(&self, other: &Traits) -> Traits {
        let a = self.values();
        let b = other.values();
        Traits::from_values(std::array::from_fn(|i| (a[i] + b[i]) / 2.0))
    }

    /// Mean absolute difference across all five traits.
    pub fn distance(&self, other: &Traits) -> f64 {
        let a = self.values();
        let b = other.values();
        a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum::<f64>() / a.len() as f64
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Explore,
    Approach,
    Avoid,
    Consume,
    Reproduce,
    Communicate,
    Idle,
}

impl ActionKind {
    pub const fn label(self) -> &'static str {
        match self {
            ActionKind::Explore => "explore",
            ActionKind::Approach => "approach",
            ActionKind::Avoid => "avoid",
            ActionKind::Consume => "consume",
            ActionKind::Reproduce => "reproduce",
            ActionKind::Communicate => "communicate",
            ActionKind::Idle => "idle",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Action selected for the current tick. Targets are sensed entity ids.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Action {
    Explore,
    Approach { target: String },
    Avoid { target: String },
    Consume { resource: String },
    Reproduce { partner: AgentId },
    Communicate { target: AgentId },
    #[default]
    Idle,
}

impl Action {
    pub const fn kind(&self) -> ActionKind {
        match self {
            Action::Explore => ActionKind::Explore,
            Action::Approach { .. } => ActionKind::Approach,
            Action::Avoid { .. } => ActionKind::Avoid,
            Action::Consume { .. } => ActionKind::Consume,
            Action::Reproduce { .. } => ActionKind::Reproduce,
            Action::Communicate { .. } => ActionKind::Communicate,
            Action::Idle => ActionKind::Idle,
        }
    }

    pub fn target(&self) -> Option<&str> {
        match self {
            Action::Approach { target }
            | Action::Avoid { target }
            | Action::Communicate { target } => Some(target),
            Action::Consume { resource } => Some(resource),
            Action::Reproduce { partner } => Some(partner),
            Action::Explore | Action::Idle => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryKind {
    Encounter,
    Action,
    Feedback,
    Observation,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MemoryPayload {
    Encounter {
        agent_id: AgentId,
        distance: f64,
    },
    Action {
        action: ActionKind,
        target: Option<String>,
    },
    Feedback {
        energy_delta: f64,
        note: String,
    },
    Observation {
        note: String,
    },
}

impl MemoryPayload {
    pub const fn kind(&self) -> MemoryKind {
        match self {
            MemoryPayload::Encounter { .. } => MemoryKind::Encounter,
            MemoryPayload::Action { .. } => MemoryKind::Action,
            MemoryPayload::Feedback { .. } => MemoryKind::Feedback,
            MemoryPayload::Observation { .. } => MemoryKind::Observation,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub timestamp: f64,
    pub intensity: f64,
    pub payload: MemoryPayload,
}

/// Bounded memory. When full, the weakest entry (oldest on ties) makes room
/// for the new one.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryLog {
    entries: Vec<MemoryEntry>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[MemoryEntry] {
        &self.entries
    }

    pub fn record(&mut self, timestamp: f64, intensity: f64, payload: MemoryPayload) {
        if self.entries.len() >= MEMORY_CAPACITY {
            self.evict_weakest();
        }
        self.entries.push(MemoryEntry {
            timestamp,
            intensity: intensity.clamp(0.0, 1.0),
            payload,
        });
    }

    fn evict_weakest(&mut self) {
        let weakest = self
            .entries
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.intensity
                    .total_cmp(&b.intensity)
                    .then(a.timestamp.total_cmp(&b.timestamp))
            })
            .map(|(idx, _)| idx);
        if let Some(idx) = weakest {
            self.entries.remove(idx);
        }
    }

    pub fn count_of(&self, kinds: &[MemoryKind]) -> usize {
        self.entries
            .iter()
            .filter(|e| kinds.contains(&e.payload.kind()))
            .count()
    }

    pub fn distinct_kinds(&self) -> usize {
        let mut seen: Vec<MemoryKind> = Vec::with_capacity(4);
        for entry in &self.entries {
            let kind = entry.payload.kind();
            if !seen.contains(&kind) {
                seen.push(kind);
            }
        }
        seen.len()
    }
}

/// What a proximity entry refers to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "lowercase")]
pub enum Sensed {
    Agent { id: AgentId },
    Resource { id: String, kind: ResourceKind, amount: f64 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProximityEntry {
    pub sensed: Sensed,
    pub position: Vec3,
    pub distance: f64,
}

impl ProximityEntry {
    pub fn id(&self) -> &str {
        match &self.sensed {
            Sensed::Agent { id } | Sensed::Resource { id, .. } => id,
        }
    }
}

/// Sensor channels counted by the integration factor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SensorChannel {
    Agents,
    Food,
    Water,
    Light,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    /// Sorted by ascending distance.
    pub nearby: Vec<ProximityEntry>,
    pub local: ResourceLevels,
}

impl SensorSnapshot {
    pub fn nearest(&self) -> Option<&ProximityEntry> {
        self.nearby.first()
    }

    pub fn entry(&self, id: &str) -> Option<&ProximityEntry> {
        self.nearby.iter().find(|e| e.id() == id)
    }

    pub fn agents(&self) -> impl Iterator<Item = &ProximityEntry> {
        self.nearby
            .iter()
            .filter(|e| matches!(e.sensed, Sensed::Agent { .. }))
    }

    pub fn nearby_agent_count(&self) -> usize {
        self.agents().count()
    }

    pub fn nearest_agent(&self) -> Option<&ProximityEntry> {
        self.agents().next()
    }

    /// Nearest non-empty resource matching `filter`.
    pub fn nearest_resource(
        &self,
        filter: impl Fn(ResourceKind) -> bool,
    ) -> Option<&ProximityEntry> {
        self.nearby.iter().find(|e| match e.sensed {
            Sensed::Resource { kind, amount, .. } => filter(kind) && amount > 0.0,
            Sensed::Agent { .. } => false,
        })
    }

    pub fn active_channels(&self) -> usize {
        let mut channels: Vec<SensorChannel> = Vec::with_capacity(4);
        for entry in &self.nearby {
            let channel = match entry.sensed {
                Sensed::Agent { .. } => SensorChannel::Agents,
                Sensed::Resource { kind: ResourceKind::Food, .. } => SensorChannel::Food,
                Sensed::Resource { kind: ResourceKind::Water, .. } => SensorChannel::Water,
                Sensed::Resource { kind: ResourceKind::Light, .. } => SensorChannel::Light,
            };
            if !channels.contains(&channel) {
                channels.push(channel);
            }
        }
        channels.len()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReproductionState {
    /// Minimum consciousness needed to reproduce.
    pub threshold: f64,
    /// Simulated time required between reproductions.
    pub cooldown: f64,
    pub last_reproduction_time: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeathReason {
    Starvation,
    Age,
}

impl fmt::Display for DeathReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeathReason::Starvation => write!(f, "starvation"),
            DeathReason::Age => write!(f, "age"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub position: Vec3,
    pub rotation: Vec3,
    pub velocity: Vec3,
    pub scale: f64,
    pub color: Color,
    pub energy: f64,
    pub age: f64,
    pub lifespan: f64,
    pub generation: u32,
    pub perception_radius: f64,
    pub movement_speed: f64,
    pub mutation_rate: f64,
    pub traits: Traits,
    pub sensors: SensorSnapshot,
    pub memory: MemoryLog,
    pub reproduction: ReproductionState,
    pub last_action: Action,
    pub consciousness: f64,
    pub born_at: f64,
}

impl Agent {
    /// Consciousness and cooldown both allow reproducing at time `now`.
    pub fn is_ready_to_reproduce(&self, now: f64) -> bool {
        self.consciousness >= self.reproduction.threshold
            && now - self.reproduction.last_reproduction_time > self.reproduction.cooldown
    }

    pub fn death_reason(&self) -> Option<DeathReason> {
        if self.energy <= 0.0 {
            Some(DeathReason::Starvation)
        } else if self.age >= self.lifespan {
            Some(DeathReason::Age)
        } else {
            None
        }
    }

    pub fn gain_energy(&mut self, amount: f64) {
        self.energy = (self.energy + amount).clamp(0.0, MAX_ENERGY);
    }

    pub fn remember(&mut self, now: f64, intensity: f64, payload: MemoryPayload) {
        self.memory.record(now, intensity, payload);
    }
}

/// The two hand-authored founders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Founder {
    Adam,
    Eve,
}

impl Founder {
    pub fn spawn(self) -> Agent {
        let (id, name, x, color, traits) = match self {
            Founder::Adam => (
                "adam",
                "Adam",
                -2.0,
                Color::new(0x4a, 0x90, 0xe2),
                Traits::new(0.8, 0.6, 0.7, 0.9, 0.5),
            ),
            Founder::Eve => (
                "eve",
                "Eve",
                2.0,
                Color::new(0xe2, 0x4a, 0x90),
                Traits::new(0.7, 0.9, 0.6, 0.5, 0.8),
            ),
        };
        Agent {
            id: id.to_string(),
            name: name.to_string(),
            position: Vec3::new(x, 0.0, 0.0),
            rotation: Vec3::origin(),
            velocity: Vec3::origin(),
            scale: 1.0,
            color,
            energy: MAX_ENERGY,
            age: 0.0,
            lifespan: 100.0,
            generation: 1,
            perception_radius: 10.0,
            movement_speed: 2.0,
            mutation_rate: 0.1,
            traits,
            sensors: SensorSnapshot::default(),
            memory: MemoryLog::new(),
            reproduction: ReproductionState {
                threshold: 5.0,
                cooldown: 5.0,
                last_reproduction_time: 0.0,
            },
            last_action: Action::Idle,
            consciousness: 0.0,
            born_at: 0.0,
        }
    }
}
