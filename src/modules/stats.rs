use std::fmt;

use serde::{Deserialize, Serialize};

use crate::modules::agent::{ActionKind, Agent};
use crate::modules::evolution;
use crate::modules::resource::MAX_CONSUME_PER_ACTION;

/// How many live agents chose each action on the last tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionTally {
    pub explore: u64,
    pub approach: u64,
    pub avoid: u64,
    pub consume: u64,
    pub reproduce: u64,
    pub communicate: u64,
    pub idle: u64,
}

impl ActionTally {
    pub fn record(&mut self, kind: ActionKind) {
        let slot = match kind {
            ActionKind::Explore => &mut self.explore,
            ActionKind::Approach => &mut self.approach,
            ActionKind::Avoid => &mut self.avoid,
            ActionKind::Consume => &mut self.consume,
            ActionKind::Reproduce => &mut self.reproduce,
            ActionKind::Communicate => &mut self.communicate,
            ActionKind::Idle => &mut self.idle,
        };
        *slot = slot.saturating_add(1);
    }
}

/// Aggregates recomputed from the live population after every tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationStatistics {
    pub population: usize,
    pub average_consciousness: f64,
    pub max_consciousness: f64,
    pub average_lifespan: f64,
    pub max_generation: u32,
    /// Heuristic in [0, 10].
    pub language_complexity: f64,
    /// Heuristic, grows logarithmically with population.
    pub social_complexity: f64,
    /// Upper bound on resource units taken by this tick's consume actions.
    pub resource_consumption: f64,
    pub species_count: usize,
    pub actions: ActionTally,
}

impl SimulationStatistics {
    pub fn compute(agents: &[Agent]) -> Self {
        if agents.is_empty() {
            return Self::default();
        }
        let n = agents.len() as f64;
        let average_consciousness = agents.iter().map(|a| a.consciousness).sum::<f64>() / n;
        let max_consciousness = agents.iter().map(|a| a.consciousness).fold(0.0, f64::max);
        let average_lifespan = agents.iter().map(|a| a.lifespan).sum::<f64>() / n;
        let max_generation = agents.iter().map(|a| a.generation).max().unwrap_or(0);

        let mut actions = ActionTally::default();
        for agent in agents {
            actions.record(agent.last_action.kind());
        }

        let awareness = average_consciousness / 100.0;
        let language_complexity = 5.0 * awareness
            + 3.0 * (max_generation as f64 / 20.0).min(1.0)
            + 2.0 * (n / 100.0).min(1.0);
        let social_complexity = n.ln_1p() * (0.5 + awareness);

        Self {
            population: agents.len(),
            average_consciousness,
            max_consciousness,
            average_lifespan,
            max_generation,
            language_complexity,
            social_complexity,
            resource_consumption: actions.consume as f64 * MAX_CONSUME_PER_ACTION,
            species_count: evolution::species_count(agents),
            actions,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineCategory {
    Language,
    Social,
    Technological,
    Extinction,
    Population,
    Mutation,
}

impl fmt::Display for TimelineCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TimelineCategory::Language => "language",
            TimelineCategory::Social => "social",
            TimelineCategory::Technological => "technological",
            TimelineCategory::Extinction => "extinction",
            TimelineCategory::Population => "population",
            TimelineCategory::Mutation => "mutation",
        };
        write!(f, "{}", label)
    }
}

/// Immutable milestone in the world's history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub id: String,
    pub timestamp: f64,
    pub title: String,
    pub description: String,
    pub category: TimelineCategory,
    pub significance: f64,
}

/// Minimum increase in a complexity score that counts as a milestone.
const COMPLEXITY_STEP: f64 = 0.2;

/// Milestones reached between two consecutive statistics. `next_id` hands out
/// event ids.
pub fn detect_milestones(
    previous: &SimulationStatistics,
    current: &SimulationStatistics,
    timestamp: f64,
    mut next_id: impl FnMut() -> String,
) -> Vec<TimelineEvent> {
    let mut events = Vec::new();
    let mut push = |title: String, description: String, category, significance| {
        events.push(TimelineEvent {
            id: next_id(),
            timestamp,
            title,
            description,
            category,
            significance,
        });
    };

    if current.species_count > previous.species_count {
        push(
            "New species emerged".into(),
            format!(
                "Distinct species rose from {} to {}",
                previous.species_count, current.species_count
            ),
            TimelineCategory::Mutation,
            0.7,
        );
    }
    if current.population > 0 && current.population / 10 > previous.population / 10 {
        push(
            format!("Population reached {}", current.population / 10 * 10),
            format!("{} agents are alive", current.population),
            TimelineCategory::Population,
            0.5,
        );
    }
    if current.language_complexity - previous.language_complexity > COMPLEXITY_STEP {
        push(
            "Language grew richer".into(),
            format!(
                "Language complexity {:.2} -> {:.2}",
                previous.language_complexity, current.language_complexity
            ),
            TimelineCategory::Language,
            0.8,
        );
    }
    if current.social_complexity - previous.social_complexity > COMPLEXITY_STEP {
        push(
            "Social bonds deepened".into(),
            format!(
                "Social complexity {:.2} -> {:.2}",
                previous.social_complexity, current.social_complexity
            ),
            TimelineCategory::Social,
            0.7,
        );
    }
    if current.max_generation > previous.max_generation {
        push(
            format!("Generation {} born", current.max_generation),
            format!("Deepest lineage is now generation {}", current.max_generation),
            TimelineCategory::Population,
            0.4,
        );
    }
    if previous.population > 0 && current.population == 0 {
        push(
            "Extinction".into(),
            "The last agent has died".into(),
            TimelineCategory::Extinction,
            1.0,
        );
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::agent::{Action, Founder, Traits};

    fn counter() -> impl FnMut() -> String {
        let mut n = 0;
        move || {
            n += 1;
            format!("event-{n}")
        }
    }

    #[test]
    fn empty_population_is_all_zero() {
        assert_eq!(SimulationStatistics::compute(&[]), SimulationStatistics::default());
    }

    #[test]
    fn aggregates_over_agents() {
        let mut adam = Founder::Adam.spawn();
        let mut eve = Founder::Eve.spawn();
        adam.consciousness = 10.0;
        eve.consciousness = 30.0;
        eve.generation = 3;
        adam.last_action = Action::Consume {
            resource: "food-1".into(),
        };
        let stats = SimulationStatistics::compute(&[adam, eve]);
        assert_eq!(stats.population, 2);
        assert_eq!(stats.average_consciousness, 20.0);
        assert_eq!(stats.max_consciousness, 30.0);
        assert_eq!(stats.max_generation, 3);
        assert_eq!(stats.actions.consume, 1);
        assert_eq!(stats.actions.idle, 1);
        assert_eq!(stats.resource_consumption, 10.0);
    }

    #[test]
    fn species_count_uses_buckets() {
        let mut adam = Founder::Adam.spawn();
        let mut eve = Founder::Eve.spawn();
        adam.traits = Traits::new(0.3, 0.7, 0.1, 0.1, 0.1);
        eve.traits = Traits::new(0.3, 0.7, 0.9, 0.9, 0.9);
        assert_eq!(SimulationStatistics::compute(&[adam.clone(), eve.clone()]).species_count, 1);
        eve.traits.social_affinity = 0.1;
        assert_eq!(SimulationStatistics::compute(&[adam, eve]).species_count, 2);
    }

    #[test]
    fn milestones_fire_on_threshold_crossings() {
        let previous = SimulationStatistics {
            population: 9,
            species_count: 1,
            max_generation: 1,
            language_complexity: 1.0,
            social_complexity: 1.0,
            ..SimulationStatistics::default()
        };
        let current = SimulationStatistics {
            population: 10,
            species_count: 2,
            max_generation: 2,
            language_complexity: 1.1,
            social_complexity: 1.5,
            ..SimulationStatistics::default()
        };
        let events = detect_milestones(&previous, &current, 4.0, counter());
        let categories: Vec<(TimelineCategory, f64)> =
            events.iter().map(|e| (e.category, e.significance)).collect();
        assert_eq!(
            categories,
            vec![
                (TimelineCategory::Mutation, 0.7),
                (TimelineCategory::Population, 0.5),
                (TimelineCategory::Social, 0.7),
                (TimelineCategory::Population, 0.4),
            ]
        );
        assert_eq!(events[0].id, "event-1");
        assert!(events.iter().all(|e| e.timestamp == 4.0));
    }

    #[test]
    fn nothing_changes_nothing_fires() {
        let stats = SimulationStatistics {
            population: 12,
            ..SimulationStatistics::default()
        };
        assert!(detect_milestones(&stats, &stats, 1.0, counter()).is_empty());
    }

    #[test]
    fn extinction_is_recorded() {
        let previous = SimulationStatistics {
            population: 1,
            ..SimulationStatistics::default()
        };
        let events = detect_milestones(&previous, &SimulationStatistics::default(), 9.0, counter());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].category, TimelineCategory::Extinction);
    }
}
