use thiserror::Error;

#[derive(Error, Debug)]
pub enum PhysicsError {
    #[error("Physics computation error: {0}")]
    ComputationError(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}
