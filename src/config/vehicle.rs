use crate::physics::FlightParams;
use crate::utils::constants::{BASE_MASS, ITEM_WEIGHT, TOTAL_CAPACITY};
use serde::{Deserialize, Serialize};

/// Masses and capacities of one airframe.
///
/// The default splits the total lift capacity evenly between fuel and cargo.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VehicleConfig {
    pub base_mass_kg: f64,
    pub fuel_capacity_kg: f64,
    pub item_weight_kg: f64,
    pub item_count: i32,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            base_mass_kg: BASE_MASS,
            fuel_capacity_kg: TOTAL_CAPACITY / 2.0,
            item_weight_kg: ITEM_WEIGHT,
            item_count: (TOTAL_CAPACITY / 2.0 / ITEM_WEIGHT) as i32,
        }
    }
}

impl VehicleConfig {
    /// An airframe carrying no cargo, full fuel
    pub fn unloaded() -> Self {
        Self {
            item_count: 0,
            ..Default::default()
        }
    }

    pub fn flight_params(&self) -> FlightParams {
        FlightParams {
            base_mass_kg: self.base_mass_kg,
            item_weight_kg: self.item_weight_kg,
            ..Default::default()
        }
    }

    /// Mass on the ramp with full fuel [kg]
    pub fn gross_mass_kg(&self) -> f64 {
        self.base_mass_kg + self.fuel_capacity_kg + self.item_weight_kg * self.item_count as f64
    }
}
