use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::modules::error::SimError;
use crate::modules::resource::{MAX_RESOURCE_AMOUNT, Resource, ResourceKind};
use crate::modules::vector::Vec3;

/// Radius, in grid cells, over which a placed resource raises local density.
pub const RESOURCE_FALLOFF_RADIUS: f64 = 2.0;
/// Cell temperature drop per unit of elevation.
const ELEVATION_LAPSE: f64 = 0.5;
const MAX_ELEVATION: f64 = 5.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCondition {
    #[default]
    Clear,
    Rain,
    Storm,
    Drought,
}

impl WeatherCondition {
    pub const fn label(self) -> &'static str {
        match self {
            WeatherCondition::Clear => "clear",
            WeatherCondition::Rain => "rain",
            WeatherCondition::Storm => "storm",
            WeatherCondition::Drought => "drought",
        }
    }

    /// Multipliers applied to (food, water, light).
    pub const fn factors(self) -> (f64, f64, f64) {
        match self {
            WeatherCondition::Clear => (1.0, 1.0, 1.0),
            WeatherCondition::Rain => (1.0, 1.5, 0.7),
            WeatherCondition::Storm => (0.8, 2.0, 0.3),
            WeatherCondition::Drought => (0.6, 0.3, 1.2),
        }
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Settable scalar environmental parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum ParameterKey {
    Temperature,
    LightLevel,
    ResourceAbundance,
    ResourceDistribution,
    FoodGrowthRate,
    WaterAvailability,
    CatastropheProbability,
}

impl ParameterKey {
    pub const ALL: [ParameterKey; 7] = [
        ParameterKey::Temperature,
        ParameterKey::LightLevel,
        ParameterKey::ResourceAbundance,
        ParameterKey::ResourceDistribution,
        ParameterKey::FoodGrowthRate,
        ParameterKey::WaterAvailability,
        ParameterKey::CatastropheProbability,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ParameterKey::Temperature => "temperature",
            ParameterKey::LightLevel => "light_level",
            ParameterKey::ResourceAbundance => "resource_abundance",
            ParameterKey::ResourceDistribution => "resource_distribution",
            ParameterKey::FoodGrowthRate => "food_growth_rate",
            ParameterKey::WaterAvailability => "water_availability",
            ParameterKey::CatastropheProbability => "catastrophe_probability",
        }
    }

    /// Inclusive range a value is clamped into.
    pub const fn range(self) -> (f64, f64) {
        match self {
            ParameterKey::Temperature => (-50.0, 60.0),
            ParameterKey::LightLevel => (0.0, 1.0),
            ParameterKey::ResourceAbundance => (0.0, 2.0),
            ParameterKey::ResourceDistribution => (0.0, 1.0),
            ParameterKey::FoodGrowthRate => (0.0, 5.0),
            ParameterKey::WaterAvailability => (0.0, 2.0),
            ParameterKey::CatastropheProbability => (0.0, 1.0),
        }
    }
}

impl fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for ParameterKey {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        match normalized.as_str() {
            "temperature" => Ok(ParameterKey::Temperature),
            "light_level" => Ok(ParameterKey::LightLevel),
            "resource_abundance" => Ok(ParameterKey::ResourceAbundance),
            "resource_distribution" => Ok(ParameterKey::ResourceDistribution),
            "food_growth_rate" => Ok(ParameterKey::FoodGrowthRate),
            "water_availability" => Ok(ParameterKey::WaterAvailability),
            "catastrophe_probability" => Ok(ParameterKey::CatastropheProbability),
            _ => Err(SimError::UnknownParameter(s.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentalParameters {
    pub temperature: f64,
    pub light_level: f64,
    pub resource_abundance: f64,
    /// Clumping factor: above 0.5 peaks sharpen, below 0.5 levels flatten.
    pub resource_distribution: f64,
    pub food_growth_rate: f64,
    pub water_availability: f64,
    pub weather_condition: WeatherCondition,
    pub catastrophe_probability: f64,
}

impl Default for EnvironmentalParameters {
    fn default() -> Self {
        Self {
            temperature: 20.0,
            light_level: 1.0,
            resource_abundance: 1.0,
            resource_distribution: 0.5,
            food_growth_rate: 1.0,
            water_availability: 1.0,
            weather_condition: WeatherCondition::Clear,
            catastrophe_probability: 0.0,
        }
    }
}

impl EnvironmentalParameters {
    pub fn get(&self, key: ParameterKey) -> f64 {
        match key {
            ParameterKey::Temperature => self.temperature,
            ParameterKey::LightLevel => self.light_level,
            ParameterKey::ResourceAbundance => self.resource_abundance,
            ParameterKey::ResourceDistribution => self.resource_distribution,
            ParameterKey::FoodGrowthRate => self.food_growth_rate,
            ParameterKey::WaterAvailability => self.water_availability,
            ParameterKey::CatastropheProbability => self.catastrophe_probability,
        }
    }

    /// Store `value` clamped into the key's range and return what was stored.
    /// Non-finite values are rejected.
    pub fn set(&mut self, key: ParameterKey, value: f64) -> Result<f64, SimError> {
        if !value.is_finite() {
            return Err(SimError::InvalidParameter {
                key: key.label().to_string(),
                value,
            });
        }
        let (lo, hi) = key.range();
        let clamped = value.clamp(lo, hi);
        let slot = match key {
            ParameterKey::Temperature => &mut self.temperature,
            ParameterKey::LightLevel => &mut self.light_level,
            ParameterKey::ResourceAbundance => &mut self.resource_abundance,
            ParameterKey::ResourceDistribution => &mut self.resource_distribution,
            ParameterKey::FoodGrowthRate => &mut self.food_growth_rate,
            ParameterKey::WaterAvailability => &mut self.water_availability,
            ParameterKey::CatastropheProbability => &mut self.catastrophe_probability,
        };
        *slot = clamped;
        Ok(clamped)
    }

    /// Copy with every key passed through `set`, as if each value had been
    /// assigned at runtime.
    pub fn normalized(&self) -> Result<Self, SimError> {
        let mut params = self.clone();
        for key in ParameterKey::ALL {
            params.set(key, self.get(key))?;
        }
        Ok(params)
    }
}

/// Local resource density, each channel in [0, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceLevels {
    pub food: f64,
    pub water: f64,
    pub light: f64,
}

impl ResourceLevels {
    pub const fn new(food: f64, water: f64, light: f64) -> Self {
        Self { food, water, light }
    }

    pub fn mean(&self) -> f64 {
        (self.food + self.water + self.light) / 3.0
    }

    pub fn clamped(self) -> Self {
        Self::new(
            self.food.clamp(0.0, 1.0),
            self.water.clamp(0.0, 1.0),
            self.light.clamp(0.0, 1.0),
        )
    }

    fn channel_mut(&mut self, kind: ResourceKind) -> &mut f64 {
        match kind {
            ResourceKind::Food => &mut self.food,
            ResourceKind::Water => &mut self.water,
            ResourceKind::Light => &mut self.light,
        }
    }
}

const BASE_LEVELS: ResourceLevels = ResourceLevels::new(0.1, 0.1, 0.5);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub position: Vec3,
    /// Density derived from placed resources, before environmental effects.
    pub base: ResourceLevels,
    /// Effective density after weather, abundance and clumping.
    pub resources: ResourceLevels,
    pub elevation: f64,
    pub temperature: f64,
    pub occupied: bool,
    pub occupants: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellGrid {
    pub size: usize,
    pub world_size: f64,
    pub cell_size: f64,
    /// Row-major: index = row * size + col, rows along z, cols along x.
    pub cells: Vec<Cell>,
}

impl CellGrid {
    /// Build a `size`×`size` grid over a square world centred on the origin.
    pub fn new<R: Rng>(size: usize, world_size: f64, temperature: f64, rng: &mut R) -> Self {
        let size = size.max(1);
        let cell_size = world_size / size as f64;
        let half = world_size / 2.0;
        let mut cells = Vec::with_capacity(size * size);
        for row in 0..size {
            for col in 0..size {
                let elevation = rng.gen_range(0.0..MAX_ELEVATION);
                cells.push(Cell {
                    position: Vec3::new(
                        -half + (col as f64 + 0.5) * cell_size,
                        0.0,
                        -half + (row as f64 + 0.5) * cell_size,
                    ),
                    base: BASE_LEVELS,
                    resources: BASE_LEVELS,
                    elevation,
                    temperature: temperature - elevation * ELEVATION_LAPSE,
                    occupied: false,
                    occupants: Vec::new(),
                });
            }
        }
        Self {
            size,
            world_size,
            cell_size,
            cells,
        }
    }

    fn axis_index(&self, coord: f64) -> Option<usize> {
        let half = self.world_size / 2.0;
        if !(-half..=half).contains(&coord) {
            return None;
        }
        let idx = ((coord + half) / self.cell_size).floor() as usize;
        Some(idx.min(self.size - 1))
    }

    /// (col, row) of the cell containing `position`, or `None` outside the world.
    pub fn coords_for(&self, position: Vec3) -> Option<(usize, usize)> {
        Some((self.axis_index(position.x)?, self.axis_index(position.z)?))
    }

    pub fn index_for(&self, position: Vec3) -> Option<usize> {
        self.coords_for(position).map(|(col, row)| row * self.size + col)
    }

    pub fn cell_at(&self, position: Vec3) -> Option<&Cell> {
        self.index_for(position).and_then(|idx| self.cells.get(idx))
    }

    /// Rebuild occupancy from scratch.
    pub fn recompute_occupancy<'a>(&mut self, agents: impl Iterator<Item = (&'a str, Vec3)>) {
        for cell in &mut self.cells {
            cell.occupants.clear();
            cell.occupied = false;
        }
        for (id, position) in agents {
            if let Some(idx) = self.index_for(position) {
                let cell = &mut self.cells[idx];
                cell.occupants.push(id.to_string());
                cell.occupied = true;
            }
        }
    }
}

/// Seed each cell's base density from placed resources: a low floor plus a
/// linear falloff over `RESOURCE_FALLOFF_RADIUS` cells weighted by amount.
pub fn populate_cells(grid: &mut CellGrid, resources: &[Resource]) {
    let size = grid.size;
    let anchors: Vec<(usize, usize, ResourceKind, f64)> = resources
        .iter()
        .filter_map(|r| {
            grid.coords_for(r.position)
                .map(|(col, row)| (col, row, r.kind, r.amount / MAX_RESOURCE_AMOUNT))
        })
        .collect();

    for row in 0..size {
        for col in 0..size {
            let mut levels = BASE_LEVELS;
            for &(rc, rr, kind, weight) in &anchors {
                let dc = col as f64 - rc as f64;
                let dr = row as f64 - rr as f64;
                let distance = (dc * dc + dr * dr).sqrt();
                if distance < RESOURCE_FALLOFF_RADIUS {
                    *levels.channel_mut(kind) +=
                        (1.0 - distance / RESOURCE_FALLOFF_RADIUS) * weight;
                }
            }
            let cell = &mut grid.cells[row * size + col];
            cell.base = levels.clamped();
            cell.resources = cell.base;
        }
    }
}

fn clump(value: f64, distribution: f64) -> f64 {
    if distribution > 0.5 {
        value.powf(1.0 + (distribution - 0.5) * 2.0)
    } else if distribution < 0.5 {
        value + (0.5 - value) * (1.0 - distribution)
    } else {
        value
    }
}

/// Recompute every cell's effective density from its base density under the
/// current environment: weather, then abundance, then clumping.
pub fn calculate_resource_distribution(grid: &mut CellGrid, params: &EnvironmentalParameters) {
    let (food_w, water_w, light_w) = params.weather_condition.factors();
    let distribution = params.resource_distribution;
    for cell in &mut grid.cells {
        let base = cell.base;
        let food = (base.food * food_w * params.resource_abundance).clamp(0.0, 1.0);
        let water = (base.water * water_w * params.resource_abundance * params.water_availability)
            .clamp(0.0, 1.0);
        let light = base.light * light_w * params.light_level;
        cell.resources = ResourceLevels::new(
            clump(food, distribution),
            clump(water, distribution),
            light,
        )
        .clamped();
        cell.temperature = params.temperature - cell.elevation * ELEVATION_LAPSE;
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn grid() -> CellGrid {
        let mut rng = StdRng::seed_from_u64(7);
        CellGrid::new(10, 100.0, 20.0, &mut rng)
    }

    fn food_at(x: f64, z: f64, amount: f64) -> Resource {
        Resource {
            id: "food-1".into(),
            kind: ResourceKind::Food,
            position: Vec3::new(x, 0.0, z),
            amount,
            regeneration_rate: 0.5,
            last_regeneration: 0.0,
        }
    }

    #[test]
    fn maps_world_coordinates_to_cells() {
        let g = grid();
        assert_eq!(g.coords_for(Vec3::new(-50.0, 0.0, -50.0)), Some((0, 0)));
        assert_eq!(g.coords_for(Vec3::new(0.0, 0.0, 0.0)), Some((5, 5)));
        assert_eq!(g.coords_for(Vec3::new(50.0, 0.0, 49.9)), Some((9, 9)));
        assert_eq!(g.coords_for(Vec3::new(50.1, 0.0, 0.0)), None);
    }

    #[test]
    fn resources_raise_nearby_cells_only() {
        let mut g = grid();
        populate_cells(&mut g, &[food_at(5.0, 5.0, 100.0)]);
        let centre = g.cell_at(Vec3::new(5.0, 0.0, 5.0)).unwrap();
        assert!((centre.base.food - 1.0).abs() < 1e-12);
        let neighbour = g.cell_at(Vec3::new(15.0, 0.0, 5.0)).unwrap();
        assert!((neighbour.base.food - 0.6).abs() < 1e-12);
        let far = g.cell_at(Vec3::new(-45.0, 0.0, -45.0)).unwrap();
        assert_eq!(far.base, BASE_LEVELS);
    }

    #[test]
    fn drought_lowers_food_and_water() {
        let mut clear = grid();
        populate_cells(&mut clear, &[food_at(5.0, 5.0, 60.0)]);
        let mut dry = clear.clone();

        let mut params = EnvironmentalParameters::default();
        calculate_resource_distribution(&mut clear, &params);
        params.weather_condition = WeatherCondition::Drought;
        calculate_resource_distribution(&mut dry, &params);

        for (c, d) in clear.cells.iter().zip(dry.cells.iter()) {
            assert!(d.resources.food < c.resources.food);
            assert!(d.resources.water < c.resources.water);
        }
    }

    #[test]
    fn low_distribution_flattens_towards_half() {
        let mut g = grid();
        populate_cells(&mut g, &[]);
        let params = EnvironmentalParameters {
            resource_distribution: 0.0,
            ..EnvironmentalParameters::default()
        };
        calculate_resource_distribution(&mut g, &params);
        assert!(g.cells.iter().all(|c| (c.resources.food - 0.5).abs() < 1e-12));
    }

    #[test]
    fn high_distribution_sharpens_peaks() {
        let mut g = grid();
        populate_cells(&mut g, &[]);
        let params = EnvironmentalParameters {
            resource_distribution: 1.0,
            ..EnvironmentalParameters::default()
        };
        calculate_resource_distribution(&mut g, &params);
        // 0.1 squared
        assert!(g.cells.iter().all(|c| (c.resources.food - 0.01).abs() < 1e-12));
    }

    #[test]
    fn setter_clamps_and_rejects_nan() {
        let mut params = EnvironmentalParameters::default();
        assert_eq!(params.set(ParameterKey::LightLevel, 3.0), Ok(1.0));
        assert_eq!(params.light_level, 1.0);
        assert!(matches!(
            params.set(ParameterKey::ResourceAbundance, f64::NAN),
            Err(SimError::InvalidParameter { .. })
        ));
        assert_eq!(params.resource_abundance, 1.0);
        assert!(matches!(
            "humidity".parse::<ParameterKey>(),
            Err(SimError::UnknownParameter(_))
        ));
        assert_eq!("food-growth-rate".parse::<ParameterKey>(), Ok(ParameterKey::FoodGrowthRate));
    }

    #[test]
    fn occupancy_is_rebuilt_from_scratch() {
        let mut g = grid();
        g.recompute_occupancy([("adam", Vec3::new(-2.0, 0.0, 0.0))].into_iter());
        let before = g.index_for(Vec3::new(-2.0, 0.0, 0.0)).unwrap();
        assert!(g.cells[before].occupied);

        g.recompute_occupancy([("adam", Vec3::new(30.0, 0.0, 30.0))].into_iter());
        assert!(!g.cells[before].occupied);
        assert!(g.cells[before].occupants.is_empty());
        let after = g.cell_at(Vec3::new(30.0, 0.0, 30.0)).unwrap();
        assert_eq!(after.occupants, vec!["adam".to_string()]);
    }
}
