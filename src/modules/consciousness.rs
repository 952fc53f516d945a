//! Scalar consciousness score for an agent.
//!
//! The score is the product of three factors in [0, 1], scaled to [0, 100].
//! Multiplying means a single factor at zero gates the whole score to zero.

use crate::modules::agent::{Agent, MemoryKind};

/// Fixed "freedom of choice" contribution shared by every agent.
const BASELINE_AUTONOMY: f64 = 0.7;

fn ratio(value: f64, scale: f64) -> f64 {
    (value / scale).min(1.0)
}

/// How much of the agent's traits, senses and memory are brought together.
pub fn integration(agent: &Agent) -> f64 {
    let t = &agent.traits;
    let trait_mix = 0.3 * t.curiosity + 0.4 * t.adaptability + 0.3 * t.exploration;
    let channels = agent.sensors.active_channels() as f64 / 4.0;
    let memory = ratio(agent.memory.len() as f64, 20.0);
    let local = agent.sensors.local.mean();
    (0.4 * trait_mix + 0.3 * channels + 0.2 * memory + 0.1 * local).clamp(0.0, 1.0)
}

/// How richly the agent models its own history and maturity.
pub fn self_modeling(agent: &Agent) -> f64 {
    let reflective = agent
        .memory
        .count_of(&[MemoryKind::Action, MemoryKind::Feedback]) as f64;
    let variety = agent.memory.distinct_kinds() as f64 / 4.0;
    let lineage = ratio(agent.generation as f64, 10.0);
    let maturity = ratio(agent.age, agent.lifespan);
    (0.3 * ratio(reflective, 15.0) + 0.3 * variety + 0.2 * lineage + 0.2 * maturity)
        .clamp(0.0, 1.0)
}

/// Room to act: energy, surroundings and lack of crowding.
pub fn decision_freedom(agent: &Agent) -> f64 {
    let energy = ratio(agent.energy, 100.0);
    let local = agent.sensors.local.mean();
    let crowding = (1.0 - agent.sensors.nearby_agent_count() as f64 / 10.0).max(0.0);
    (0.3 * energy + 0.3 * BASELINE_AUTONOMY + 0.2 * local + 0.2 * crowding).clamp(0.0, 1.0)
}

/// Consciousness score in [0, 100]. Pure: identical input gives identical output.
pub fn score(agent: &Agent) -> f64 {
    debug_assert!(agent.lifespan > 0.0, "lifespan must be positive");
    (integration(agent) * self_modeling(agent) * decision_freedom(agent) * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::agent::{ActionKind, Founder, MemoryPayload, Sensed, ProximityEntry};
    use crate::modules::environment::ResourceLevels;
    use crate::modules::vector::Vec3;

    #[test]
    fn founder_has_positive_score() {
        let adam = Founder::Adam.spawn();
        let s = score(&adam);
        assert!(s > 0.0 && s <= 100.0, "score {s}");
    }

    #[test]
    fn score_is_idempotent() {
        let mut eve = Founder::Eve.spawn();
        eve.remember(
            1.0,
            0.5,
            MemoryPayload::Action {
                action: ActionKind::Explore,
                target: None,
            },
        );
        assert_eq!(score(&eve), score(&eve));
    }

    #[test]
    fn zero_self_model_gates_score() {
        let mut adam = Founder::Adam.spawn();
        adam.generation = 0;
        adam.age = 0.0;
        assert_eq!(self_modeling(&adam), 0.0);
        assert_eq!(score(&adam), 0.0);
    }

    #[test]
    fn matches_hand_computed_factors() {
        let mut adam = Founder::Adam.spawn();
        adam.sensors.local = ResourceLevels::new(0.3, 0.3, 0.3);
        adam.sensors.nearby.push(ProximityEntry {
            sensed: Sensed::Agent { id: "eve".into() },
            position: Vec3::new(2.0, 0.0, 0.0),
            distance: 4.0,
        });
        // traits 0.3*0.8 + 0.4*0.5 + 0.3*0.9 = 0.71
        let expected_integration = 0.4 * 0.71 + 0.3 * 0.25 + 0.0 + 0.1 * 0.3;
        assert!((integration(&adam) - expected_integration).abs() < 1e-12);
        // only generation 1 contributes
        assert!((self_modeling(&adam) - 0.02).abs() < 1e-12);
        let expected_freedom = 0.3 + 0.3 * 0.7 + 0.2 * 0.3 + 0.2 * 0.9;
        assert!((decision_freedom(&adam) - expected_freedom).abs() < 1e-12);
        let expected = expected_integration * 0.02 * expected_freedom * 100.0;
        assert!((score(&adam) - expected).abs() < 1e-9);
    }
}
