use crate::utils::constants::{MAX_MAIN_ROTOR_SPEED, MAX_TAIL_ROTOR_SPEED, MAX_TILT_MAGNITUDE};
use serde::{Deserialize, Serialize};

/// Actuator demand shared between the controllers and the integrator.
///
/// Each field has exactly one writer: the altitude loop owns the main rotor,
/// the heading loop owns the tail rotor, the speed loop owns the tilt. The
/// integrator only reads, except when an engine-out forces everything to zero.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ActuatorDemand {
    /// Desired main rotor speed [RPM]
    pub main_rotor_rpm: f64,
    /// Desired tail rotor speed [RPM]
    pub tail_rotor_rpm: f64,
    /// Desired tilt [degrees]
    pub tilt_deg: f64,
}

impl ActuatorDemand {
    /// Clamp all fields to their physical maxima before consumption
    pub fn clamped(&self) -> Self {
        Self {
            main_rotor_rpm: self.main_rotor_rpm.clamp(0.0, MAX_MAIN_ROTOR_SPEED),
            tail_rotor_rpm: self.tail_rotor_rpm.clamp(0.0, MAX_TAIL_ROTOR_SPEED),
            tilt_deg: self.tilt_deg.clamp(-MAX_TILT_MAGNITUDE, MAX_TILT_MAGNITUDE),
        }
    }

    pub fn zero(&mut self) {
        self.main_rotor_rpm = 0.0;
        self.tail_rotor_rpm = 0.0;
        self.tilt_deg = 0.0;
    }
}

/// Move `actual` toward `desired` by at most `max_delta_per_s * dt`,
/// without overshooting the desired value.
pub fn slew_toward(actual: f64, desired: f64, max_delta_per_s: f64, dt: f64) -> f64 {
    let max_step = max_delta_per_s * dt;
    if actual < desired {
        (actual + max_step).min(desired)
    } else if actual > desired {
        (actual - max_step).max(desired)
    } else {
        actual
    }
}
