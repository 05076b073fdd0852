use crate::physics::PhysicsError;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Config error: {0}")]
    InvalidConfig(String),

    #[error("Physics error: {0}")]
    Physics(#[from] PhysicsError),

    #[error("Transient read failure: {0}")]
    TransientRead(String),

    #[error("Unknown vehicle: {0}")]
    VehicleNotFound(u32),

    #[error("Vehicle error: {0}")]
    VehicleError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_yaml::Error),
}
