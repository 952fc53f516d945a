use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::modules::environment::EnvironmentalParameters;
use crate::modules::error::SimError;

/// Settings a world is created from. Missing fields fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub seed: u64,
    pub world_size: f64,
    pub grid_size: usize,
    pub food_count: usize,
    pub water_count: usize,
    pub light_count: usize,
    pub time_scale: f64,
    pub default_dt: f64,
    pub environment: EnvironmentalParameters,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            world_size: 100.0,
            grid_size: 10,
            food_count: 25,
            water_count: 15,
            light_count: 10,
            time_scale: 1.0,
            default_dt: 0.1,
            environment: EnvironmentalParameters::default(),
        }
    }
}

fn positive(name: &str, value: f64) -> Result<(), SimError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidConfig(format!(
            "{} must be finite and positive (got {})",
            name, value
        )))
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        positive("world_size", self.world_size)?;
        positive("time_scale", self.time_scale)?;
        positive("default_dt", self.default_dt)?;
        if self.grid_size == 0 {
            return Err(SimError::InvalidConfig(
                "grid_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Validated copy whose environment is clamped into each parameter's
    /// range. Non-finite environment values are rejected.
    pub fn normalized(&self) -> Result<Self, SimError> {
        self.validate()?;
        let environment = self
            .environment
            .normalized()
            .map_err(|e| SimError::InvalidConfig(e.to_string()))?;
        Ok(Self {
            environment,
            ..self.clone()
        })
    }
}

fn config_dir() -> PathBuf {
    PathBuf::from(".genesis")
}

pub fn config_file_path() -> PathBuf {
    config_dir().join("config.json")
}

pub fn load_config() -> io::Result<SimConfig> {
    let path = config_file_path();
    if !path.exists() {
        return Ok(SimConfig::default());
    }

    let bytes = fs::read(&path)?;
    if bytes.is_empty() {
        return Ok(SimConfig::default());
    }

    serde_json::from_slice(&bytes).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "failed to parse config file {}; fix it or run `genesis init` to reset: {}",
                path.display(),
                e
            ),
        )
    })
}

pub fn save_config(config: &SimConfig) -> io::Result<()> {
    fs::create_dir_all(config_dir())?;
    let json = serde_json::to_vec_pretty(config)?;
    fs::write(config_file_path(), json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.food_count + config.water_count + config.light_count, 50);
    }

    #[test]
    fn rejects_non_positive_values() {
        let mut config = SimConfig {
            time_scale: 0.0,
            ..SimConfig::default()
        };
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
        config.time_scale = 1.0;
        config.grid_size = 0;
        assert!(config.validate().is_err());
        config.grid_size = 10;
        config.default_dt = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn environment_is_clamped_into_range() {
        let mut config = SimConfig::default();
        config.environment.food_growth_rate = -50.0;
        config.environment.catastrophe_probability = 3.0;
        let normalized = config.normalized().unwrap();
        assert_eq!(normalized.environment.food_growth_rate, 0.0);
        assert_eq!(normalized.environment.catastrophe_probability, 1.0);
        assert_eq!(normalized.environment.temperature, 20.0);
        assert_eq!(normalized.seed, config.seed);

        config.environment.temperature = f64::NAN;
        assert!(matches!(config.normalized(), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: SimConfig = serde_json::from_str(r#"{ "seed": 7, "grid_size": 4 }"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.grid_size, 4);
        assert_eq!(config.world_size, 100.0);
        assert_eq!(config.environment, EnvironmentalParameters::default());
    }
}
