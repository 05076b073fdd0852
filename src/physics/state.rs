use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// True physical state of one vehicle, owned by the integrator.
///
/// Controllers never write here; they observe copies taken under the shared
/// state guard and keep their own finite-difference estimates, which are a
/// separate quantity from the velocity/acceleration integrated below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicalState {
    /// Position in the world frame [m]
    pub position: Vector3<f64>,
    /// Velocity in the world frame [m/s]
    pub velocity: Vector3<f64>,
    /// Acceleration in the world frame [m/s^2]
    pub acceleration: Vector3<f64>,
    /// Heading [degrees, 0..360)
    pub heading_deg: f64,
    /// Actual tilt, rate-limited toward the demanded value [degrees]
    pub tilt_deg: f64,
    /// Actual main rotor speed [RPM]
    pub main_rotor_rpm: f64,
    /// Actual tail rotor speed [RPM]
    pub tail_rotor_rpm: f64,
    /// Accumulated main rotor angle, for animation only [degrees, 0..360)
    pub main_rotor_phase_deg: f64,
    /// Accumulated tail rotor angle, for animation only [degrees, 0..360)
    pub tail_rotor_phase_deg: f64,
    /// Remaining fuel [kg], non-increasing while the main rotor turns
    pub fuel_kg: f64,
    /// Latched once net lift first exceeds weight; never reset. A vehicle
    /// that later descends below the ground plane is not re-grounded.
    pub taken_off: bool,
    /// Latched when fuel runs out; all actuator demand is forced to zero
    pub engine_out: bool,
    /// Accumulated simulated time [s]
    pub time_s: f64,
}

impl PhysicalState {
    /// A vehicle at rest on the ground with full actuators stopped
    pub fn at_rest(position: Vector3<f64>, heading_deg: f64, fuel_kg: f64) -> Self {
        Self {
            position,
            velocity: Vector3::zeros(),
            acceleration: Vector3::zeros(),
            heading_deg,
            tilt_deg: 0.0,
            main_rotor_rpm: 0.0,
            tail_rotor_rpm: 0.0,
            main_rotor_phase_deg: 0.0,
            tail_rotor_phase_deg: 0.0,
            fuel_kg,
            taken_off: false,
            engine_out: fuel_kg <= 0.0,
            time_s: 0.0,
        }
    }

    pub fn altitude(&self) -> f64 {
        self.position.z
    }
}
