use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::modules::vector::Vec3;

/// Upper bound for any resource amount.
pub const MAX_RESOURCE_AMOUNT: f64 = 100.0;
/// Most an agent can take from a resource in one consume action.
pub const MAX_CONSUME_PER_ACTION: f64 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Food,
    Water,
    Light,
}

impl ResourceKind {
    pub const fn label(self) -> &'static str {
        match self {
            ResourceKind::Food => "food",
            ResourceKind::Water => "water",
            ResourceKind::Light => "light",
        }
    }

    /// Food and water deplete and regenerate; light is ambient.
    pub const fn is_consumable(self) -> bool {
        !matches!(self, ResourceKind::Light)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub kind: ResourceKind,
    pub position: Vec3,
    pub amount: f64,
    pub regeneration_rate: f64,
    pub last_regeneration: f64,
}

impl Resource {
    /// Remove up to `MAX_CONSUME_PER_ACTION` and return what was taken.
    pub fn consume(&mut self) -> f64 {
        if !self.kind.is_consumable() {
            return 0.0;
        }
        let taken = self.amount.min(MAX_CONSUME_PER_ACTION).max(0.0);
        self.amount -= taken;
        taken
    }
}

/// Regenerate food and water by `regeneration_rate * dt` (food further scaled
/// by `food_growth_rate`), capped at `MAX_RESOURCE_AMOUNT`. Light passes
/// through untouched.
pub fn update_resource_levels(resources: &mut [Resource], dt: f64, food_growth_rate: f64, now: f64) {
    for resource in resources.iter_mut() {
        let rate = match resource.kind {
            ResourceKind::Light => continue,
            ResourceKind::Food => resource.regeneration_rate * food_growth_rate,
            ResourceKind::Water => resource.regeneration_rate,
        };
        debug_assert!(resource.amount >= 0.0, "resource amount went negative");
        resource.amount = (resource.amount.max(0.0) + rate * dt).min(MAX_RESOURCE_AMOUNT);
        resource.last_regeneration = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(kind: ResourceKind, amount: f64) -> Resource {
        Resource {
            id: format!("{}-1", kind),
            kind,
            position: Vec3::origin(),
            amount,
            regeneration_rate: 2.0,
            last_regeneration: 0.0,
        }
    }

    #[test]
    fn food_and_water_regenerate_up_to_cap() {
        let mut resources = vec![
            resource(ResourceKind::Food, 40.0),
            resource(ResourceKind::Water, 99.5),
        ];
        update_resource_levels(&mut resources, 0.5, 1.0, 3.0);
        assert!((resources[0].amount - 41.0).abs() < 1e-12);
        assert_eq!(resources[1].amount, MAX_RESOURCE_AMOUNT);
        assert_eq!(resources[0].last_regeneration, 3.0);
    }

    #[test]
    fn light_never_regenerates() {
        let mut resources = vec![resource(ResourceKind::Light, 12.0)];
        update_resource_levels(&mut resources, 10.0, 1.0, 1.0);
        assert_eq!(resources[0].amount, 12.0);
        assert_eq!(resources[0].last_regeneration, 0.0);
    }

    #[test]
    fn consume_takes_at_most_ten() {
        let mut food = resource(ResourceKind::Food, 14.0);
        assert_eq!(food.consume(), 10.0);
        assert_eq!(food.consume(), 4.0);
        assert_eq!(food.consume(), 0.0);
        let mut light = resource(ResourceKind::Light, 50.0);
        assert_eq!(light.consume(), 0.0);
    }
}
