pub mod simulation;
pub mod start;
pub mod vehicle;

pub use simulation::{GainSettings, PhysicsSettings, RunSettings, SimulationConfig};
pub use start::RandomStartConfig;
pub use vehicle::VehicleConfig;
