pub mod state;
pub mod vehicle;

pub use state::{PoseSnapshot, SharedVehicleState, StateSample};
pub use vehicle::{SpawnPoint, VehicleId, VehicleKind};
