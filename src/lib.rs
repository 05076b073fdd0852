pub mod config;
pub mod controllers;
pub mod physics;
pub mod utils;
pub mod vehicles;
pub mod world;

pub use config::SimulationConfig;
pub use physics::{ActuatorDemand, FlightIntegrator, PhysicalState};
pub use utils::errors::SimError;
pub use vehicles::{PoseSnapshot, SharedVehicleState, StateSample, VehicleId};
pub use world::{SimulationClock, WaypointQueue, World};
