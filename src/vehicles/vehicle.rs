use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one vehicle within a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VehicleId(pub u32);

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vehicle-{}", self.0)
    }
}

/// Which control stack a vehicle carries.
///
/// A hover vehicle runs the three independent set-point loops; a delivery
/// vehicle runs the waypoint navigation state machine instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleKind {
    Hover,
    Delivery,
}

/// Where a vehicle enters the world, supplied by the world-generation layer
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub position: Vector3<f64>,
    pub heading_deg: f64,
}
