use std::collections::HashSet;

use rand::Rng;

use crate::modules::agent::{Action, Agent, MemoryLog, ReproductionState, SensorSnapshot, Traits};
use crate::modules::color::{Color, clamp_channel};
use crate::modules::vector::Vec3;

/// Default mutation magnitude for traits, perception and speed.
pub const MUTATION_FACTOR: f64 = 0.2;
/// Magnitude applied to the lifespan factor.
pub const LIFESPAN_FACTOR: f64 = 0.1;
/// Magnitude of a mutation rate's drift on itself.
pub const MUTATION_RATE_DRIFT: f64 = 0.05;
/// Mean trait difference above which an agent counts as a new species.
pub const SPECIES_THRESHOLD: f64 = 0.3;

const PERCEPTION_RANGE: (f64, f64) = (1.0, 50.0);
const SPEED_RANGE: (f64, f64) = (0.1, 10.0);
const LIFESPAN_RANGE: (f64, f64) = (1.0, 1000.0);
const OFFSPRING_ENERGY: f64 = 50.0;
const OFFSPRING_SCALE: f64 = 0.7;
const OFFSPRING_LIFESPAN_BONUS: f64 = 1.1;
const BLEND_JITTER: f64 = 10.0;

fn delta<R: Rng>(rng: &mut R, factor: f64) -> f64 {
    rng.gen_range(-factor..=factor)
}

/// Copy of `agent` where every mutable scalar independently mutates with
/// probability `agent.mutation_rate`.
///
/// Every field drifts additively by at most its factor and is clamped to its
/// range, except lifespan, whose factor scales it by `1 ± 0.1`.
pub fn mutate_agent<R: Rng>(agent: &Agent, rng: &mut R) -> Agent {
    let mut next = agent.clone();
    let p = agent.mutation_rate.clamp(0.0, 1.0);

    if rng.gen_bool(p) {
        next.perception_radius = (next.perception_radius + delta(rng, MUTATION_FACTOR))
            .clamp(PERCEPTION_RANGE.0, PERCEPTION_RANGE.1);
    }
    if rng.gen_bool(p) {
        next.movement_speed =
            (next.movement_speed + delta(rng, MUTATION_FACTOR)).clamp(SPEED_RANGE.0, SPEED_RANGE.1);
    }
    for value in next.traits.values_mut() {
        if rng.gen_bool(p) {
            *value = (*value + delta(rng, MUTATION_FACTOR)).clamp(0.0, 1.0);
        }
    }
    if rng.gen_bool(p) {
        next.mutation_rate = (next.mutation_rate + delta(rng, MUTATION_RATE_DRIFT)).clamp(0.0, 1.0);
    }
    if rng.gen_bool(p) {
        let d = delta(rng, LIFESPAN_FACTOR);
        next.lifespan = (next.lifespan * (1.0 + d)).clamp(LIFESPAN_RANGE.0, LIFESPAN_RANGE.1);
    }
    next
}

/// With probability `2 * mutation_rate`, nudge each channel by up to
/// `50 * mutation_rate`.
pub fn mutate_color<R: Rng>(color: Color, mutation_rate: f64, rng: &mut R) -> Color {
    let rate = mutation_rate.clamp(0.0, 1.0);
    if !rng.gen_bool((2.0 * rate).min(1.0)) {
        return color;
    }
    let spread = 50.0 * rate;
    let channels = color.channels();
    Color::from_channels(std::array::from_fn(|i| {
        clamp_channel(channels[i] as f64 + rng.gen_range(-1.0..=1.0) * spread)
    }))
}

/// Channel-wise average of two colours with a little jitter.
pub fn blend_colors<R: Rng>(a: Color, b: Color, rng: &mut R) -> Color {
    let (ca, cb) = (a.channels(), b.channels());
    Color::from_channels(std::array::from_fn(|i| {
        let mean = (ca[i] as f64 + cb[i] as f64) / 2.0;
        clamp_channel(mean + rng.gen_range(-BLEND_JITTER..=BLEND_JITTER))
    }))
}

/// True when `agent` differs from every other member of `population` by more
/// than `SPECIES_THRESHOLD` mean trait distance.
pub fn is_new_species<'a>(agent: &Agent, population: impl IntoIterator<Item = &'a Agent>) -> bool {
    population
        .into_iter()
        .filter(|other| other.id != agent.id)
        .all(|other| agent.traits.distance(&other.traits) > SPECIES_THRESHOLD)
}

/// Coarse clustering key: curiosity and social affinity rounded to deciles.
pub fn species_key(traits: &Traits) -> (u8, u8) {
    (
        (traits.curiosity * 10.0).round() as u8,
        (traits.social_affinity * 10.0).round() as u8,
    )
}

/// Number of distinct species buckets. Not equivalent to `is_new_species`.
pub fn species_count<'a>(agents: impl IntoIterator<Item = &'a Agent>) -> usize {
    agents
        .into_iter()
        .map(|a| species_key(&a.traits))
        .collect::<HashSet<_>>()
        .len()
}

/// Unmutated child of two parents at their midpoint.
pub fn offspring<R: Rng>(a: &Agent, b: &Agent, id: String, now: f64, rng: &mut R) -> Agent {
    let mean = |x: f64, y: f64| (x + y) / 2.0;
    let mutation_rate = mean(a.mutation_rate, b.mutation_rate);
    let color = mutate_color(blend_colors(a.color, b.color, rng), mutation_rate, rng);
    Agent {
        name: format!("Child of {} & {}", a.name, b.name),
        id,
        position: a.position.midpoint(b.position),
        rotation: Vec3::origin(),
        velocity: Vec3::origin(),
        scale: OFFSPRING_SCALE,
        color,
        energy: OFFSPRING_ENERGY,
        age: 0.0,
        lifespan: mean(a.lifespan, b.lifespan) * OFFSPRING_LIFESPAN_BONUS,
        generation: a.generation.max(b.generation) + 1,
        perception_radius: mean(a.perception_radius, b.perception_radius),
        movement_speed: mean(a.movement_speed, b.movement_speed),
        mutation_rate,
        traits: a.traits.mean_with(&b.traits),
        sensors: SensorSnapshot::default(),
        memory: MemoryLog::new(),
        reproduction: ReproductionState {
            threshold: mean(a.reproduction.threshold, b.reproduction.threshold),
            cooldown: mean(a.reproduction.cooldown, b.reproduction.cooldown),
            last_reproduction_time: now,
        },
        last_action: Action::Idle,
        consciousness: 0.0,
        born_at: now,
    }
}
