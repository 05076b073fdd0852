pub mod actuators;
pub mod error;
pub mod integrator;
pub mod state;

pub use actuators::ActuatorDemand;
pub use error::PhysicsError;
pub use integrator::{FlightIntegrator, FlightParams};
pub use state::PhysicalState;
