use crate::config::start::RandomStartConfig;
use crate::config::vehicle::VehicleConfig;
use crate::controllers::{AltitudeGains, HeadingGains, NavigationGains, SpeedGains};
use crate::utils::constants::DEFAULT_TIMESTEP;
use crate::utils::errors::SimError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PhysicsSettings {
    /// Fixed integration timestep [s]
    pub timestep_s: f64,
    /// Simulated seconds per wall-clock second
    pub time_ratio: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RunSettings {
    /// Simulated duration of one run [s]
    pub duration_s: f64,
    pub hover_vehicles: usize,
    pub delivery_vehicles: usize,
    pub waypoints_per_vehicle: usize,
    /// Altitude commanded to the hover fleet [m]
    pub hover_altitude_m: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GainSettings {
    pub altitude: AltitudeGains,
    pub heading: HeadingGains,
    pub speed: SpeedGains,
    pub navigation: NavigationGains,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub physics: PhysicsSettings,
    pub run: RunSettings,
    pub vehicle: VehicleConfig,
    pub gains: GainSettings,
    pub start: RandomStartConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsSettings {
                timestep_s: DEFAULT_TIMESTEP,
                time_ratio: 1.0,
            },
            run: RunSettings {
                duration_s: 120.0,
                hover_vehicles: 1,
                delivery_vehicles: 1,
                waypoints_per_vehicle: 3,
                hover_altitude_m: 20.0,
            },
            vehicle: VehicleConfig::default(),
            gains: GainSettings::default(),
            start: RandomStartConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn load(path: &str) -> Result<Self, SimError> {
        let file = std::fs::File::open(path)?;
        let config: Self = serde_yaml::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &str) -> Result<(), SimError> {
        let file = std::fs::File::create(path)?;
        serde_yaml::to_writer(file, self)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), SimError> {
        if !(self.physics.timestep_s > 0.0 && self.physics.timestep_s.is_finite()) {
            return Err(SimError::InvalidConfig(
                "physics.timestep_s must be positive and finite".into(),
            ));
        }
        if !(self.physics.time_ratio > 0.0 && self.physics.time_ratio.is_finite()) {
            return Err(SimError::InvalidConfig(
                "physics.time_ratio must be positive and finite".into(),
            ));
        }
        if self.vehicle.fuel_capacity_kg < 0.0 {
            return Err(SimError::InvalidConfig(
                "vehicle.fuel_capacity_kg must not be negative".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = SimulationConfig::default();
        assert_relative_eq!(config.physics.timestep_s, 1.0 / 30.0);
        assert_relative_eq!(config.physics.time_ratio, 1.0);
        assert_relative_eq!(config.gains.navigation.cruise_altitude_m, 125.0);
    }

    #[test]
    fn test_config_save_load() -> Result<(), SimError> {
        let config = SimulationConfig::default();
        let temp_file = NamedTempFile::new()?;
        let path = temp_file.path().to_str().unwrap();

        config.save(path)?;
        let loaded = SimulationConfig::load(path)?;
        assert_relative_eq!(loaded.physics.timestep_s, config.physics.timestep_s);
        assert_relative_eq!(
            loaded.gains.altitude.decel_fraction,
            config.gains.altitude.decel_fraction
        );
        assert_eq!(loaded.run.delivery_vehicles, config.run.delivery_vehicles);
        Ok(())
    }

    #[test]
    fn test_invalid_config_load() {
        assert!(SimulationConfig::load("nonexistent_file.yaml").is_err());
    }

    #[test]
    fn test_bad_timestep_rejected() {
        let mut config = SimulationConfig::default();
        config.physics.timestep_s = 0.0;
        assert!(config.validate().is_err());
    }
}
