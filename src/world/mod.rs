pub mod clock;
pub mod scheduler;
pub mod waypoints;
#[allow(clippy::module_inception)]
pub mod world;

pub use clock::{SimulationClock, TimeScale};
pub use scheduler::spawn_periodic;
pub use waypoints::WaypointQueue;
pub use world::{HoverTargets, World};
