use crate::controllers::estimator::MotionEstimator;
use crate::controllers::target::TargetHandle;
use crate::utils::constants::STABLE_TAIL_ROTOR_SPEED;
use crate::utils::errors::SimError;
use crate::utils::math::angular_error;
use crate::vehicles::SharedVehicleState;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Tuning for the heading feedback loop
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HeadingGains {
    /// Proportional gain [tail RPM per degree of error]
    pub kp: f64,
    /// Correction clamp about the stable tail speed [RPM]
    pub change_inc_rpm: f64,
    /// Alignment band [degrees]
    pub tolerance_deg: f64,
    /// Heading changes are only trusted near hover; above this ground speed
    /// the loop holds the stable tail speed [m/s]
    pub airspeed_gate: f64,
}

impl Default for HeadingGains {
    fn default() -> Self {
        Self {
            kp: 0.1,
            change_inc_rpm: 10.0,
            tolerance_deg: 0.15,
            airspeed_gate: 2.0,
        }
    }
}

/// Wraparound-safe proportional heading law about the stable tail speed.
#[derive(Debug, Clone, Copy)]
pub struct HeadingLaw {
    gains: HeadingGains,
}

impl HeadingLaw {
    pub fn new(gains: HeadingGains) -> Self {
        Self { gains }
    }

    /// Desired tail rotor speed for the given target and measurement [RPM]
    pub fn desired_tail_rpm(&self, target_deg: f64, actual_deg: f64) -> f64 {
        let err = angular_error(target_deg, actual_deg);
        if err.abs() <= self.gains.tolerance_deg {
            return STABLE_TAIL_ROTOR_SPEED;
        }
        let correction = (self.gains.kp * err)
            .clamp(-self.gains.change_inc_rpm, self.gains.change_inc_rpm);
        STABLE_TAIL_ROTOR_SPEED + correction
    }

    /// Aligned within `tolerance_deg` and essentially not turning
    pub fn is_aligned(&self, target_deg: f64, actual_deg: f64, turn_rate_dps: f64) -> bool {
        angular_error(target_deg, actual_deg).abs() <= self.gains.tolerance_deg
            && turn_rate_dps.abs() < 0.5
    }

    pub fn tolerance_deg(&self) -> f64 {
        self.gains.tolerance_deg
    }
}

/// Periodic heading loop for a hover vehicle. Owns the tail rotor demand.
pub struct HeadingController {
    shared: Arc<SharedVehicleState>,
    target: TargetHandle,
    law: HeadingLaw,
    gains: HeadingGains,
    estimator: MotionEstimator,
    last_heading: Option<(f64, f64)>,
    turn_rate_dps: f64,
}

impl HeadingController {
    pub const PERIOD: Duration = Duration::from_millis(crate::utils::constants::HEADING_PERIOD_MS);

    pub fn new(shared: Arc<SharedVehicleState>, target: TargetHandle, gains: HeadingGains) -> Self {
        Self {
            shared,
            target,
            law: HeadingLaw::new(gains),
            gains,
            estimator: MotionEstimator::default(),
            last_heading: None,
            turn_rate_dps: 0.0,
        }
    }

    pub fn turn_rate_dps(&self) -> f64 {
        self.turn_rate_dps
    }

    /// One control tick: read, compare, nudge the tail rotor demand.
    pub fn tick(&mut self) -> Result<(), SimError> {
        let sample = self.shared.sample()?;
        self.estimator.update(sample.time_s, sample.position);

        if let Some((last_t, last_h)) = self.last_heading {
            let dt = sample.time_s - last_t;
            if dt > 1e-6 {
                self.turn_rate_dps = angular_error(sample.heading_deg, last_h) / dt;
            }
        }
        self.last_heading = Some((sample.time_s, sample.heading_deg));

        if self.estimator.planar_speed() > self.gains.airspeed_gate {
            return self
                .shared
                .request_tail_rotor_rpm(STABLE_TAIL_ROTOR_SPEED);
        }

        let target = self.target.value_or(sample.time_s, sample.heading_deg);
        let tail = self.law.desired_tail_rpm(target, sample.heading_deg);
        self.shared.request_tail_rotor_rpm(tail)
    }
}
