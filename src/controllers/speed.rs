use crate::controllers::estimator::MotionEstimator;
use crate::controllers::target::TargetHandle;
use crate::utils::errors::SimError;
use crate::vehicles::SharedVehicleState;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Tuning for the horizontal speed loop
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpeedGains {
    /// Proportional gain [degrees of tilt per m/s of error]
    pub kp: f64,
    /// Tilt demand clamp, kept inside the physical limit [degrees]
    pub max_tilt_deg: f64,
    /// Hold band around the target [m/s]
    pub tolerance: f64,
    /// Safety margin on the stopping-distance estimate
    pub stop_margin: f64,
    /// Floor for the acceleration history, so the stopping distance stays
    /// finite before any acceleration has been observed [m/s^2]
    pub min_accel: f64,
}

impl Default for SpeedGains {
    fn default() -> Self {
        Self {
            kp: 0.05,
            max_tilt_deg: 4.0,
            tolerance: 0.05,
            stop_margin: 1.06,
            min_accel: 1e-4,
        }
    }
}

/// Proportional tilt law about a level baseline, with a stopping-distance
/// estimate fed by the acceleration the craft has actually shown.
#[derive(Debug, Clone)]
pub struct SpeedLaw {
    gains: SpeedGains,
    peak_accel: f64,
}

impl SpeedLaw {
    pub fn new(gains: SpeedGains) -> Self {
        Self {
            gains,
            peak_accel: gains.min_accel,
        }
    }

    /// Track the largest horizontal acceleration magnitude seen so far
    pub fn observe_accel(&mut self, accel_mag: f64) {
        if accel_mag.is_finite() && accel_mag > self.peak_accel {
            self.peak_accel = accel_mag;
        }
    }

    /// Desired tilt for the given measured and target speed [degrees].
    ///
    /// Positive error tilts forward to accelerate; negative error tilts back
    /// to brake.
    pub fn desired_tilt(&self, speed: f64, target: f64) -> f64 {
        let err = target - speed;
        if err.abs() <= self.gains.tolerance {
            return 0.0;
        }
        (self.gains.kp * err).clamp(-self.gains.max_tilt_deg, self.gains.max_tilt_deg)
    }

    /// Distance needed to stop from `speed`, from recent acceleration history
    pub fn stopping_distance(&self, speed: f64) -> f64 {
        let ratio = speed / self.peak_accel.max(self.gains.min_accel);
        self.gains.stop_margin * ratio * ratio
    }

    pub fn peak_accel(&self) -> f64 {
        self.peak_accel
    }
}

/// Periodic speed loop for a hover vehicle. Owns the tilt demand.
pub struct SpeedController {
    shared: Arc<SharedVehicleState>,
    target: TargetHandle,
    law: SpeedLaw,
    estimator: MotionEstimator,
}

impl SpeedController {
    pub const PERIOD: Duration = Duration::from_millis(crate::utils::constants::SPEED_PERIOD_MS);

    pub fn new(shared: Arc<SharedVehicleState>, target: TargetHandle, gains: SpeedGains) -> Self {
        Self {
            shared,
            target,
            law: SpeedLaw::new(gains),
            estimator: MotionEstimator::default(),
        }
    }

    /// One control tick: read, estimate speed from consecutive samples,
    /// nudge the tilt demand.
    pub fn tick(&mut self) -> Result<(), SimError> {
        let sample = self.shared.sample()?;
        if self.estimator.update(sample.time_s, sample.position).is_none() {
            return Ok(());
        }

        let speed = self.estimator.planar_speed();
        self.law
            .observe_accel(crate::utils::math::planar_speed(&self.estimator.acceleration()));

        let target = self.target.value_or(sample.time_s, speed);
        let tilt = self.law.desired_tilt(speed, target);
        self.shared.request_tilt_deg(tilt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tilt_sign_tracks_error() {
        let law = SpeedLaw::new(SpeedGains::default());
        assert!(law.desired_tilt(0.0, 2.0) > 0.0);
        assert!(law.desired_tilt(2.0, 0.0) < 0.0);
        assert_relative_eq!(law.desired_tilt(1.0, 1.0), 0.0);
    }

    #[test]
    fn test_tilt_is_clamped() {
        let law = SpeedLaw::new(SpeedGains::default());
        assert_relative_eq!(law.desired_tilt(0.0, 200.0), 4.0);
        assert_relative_eq!(law.desired_tilt(200.0, 0.0), -4.0);
    }

    #[test]
    fn test_stopping_distance_uses_peak_accel() {
        let mut law = SpeedLaw::new(SpeedGains::default());
        law.observe_accel(0.5);
        // 1.06 * (2 / 0.5)^2 = 16.96
        assert_relative_eq!(law.stopping_distance(2.0), 16.96, epsilon = 1e-9);

        // A stronger observed acceleration shortens the estimate
        law.observe_accel(1.0);
        assert_relative_eq!(law.stopping_distance(2.0), 4.24, epsilon = 1e-9);
    }

    #[test]
    fn test_peak_accel_ignores_non_finite() {
        let mut law = SpeedLaw::new(SpeedGains::default());
        law.observe_accel(f64::NAN);
        law.observe_accel(0.3);
        assert_relative_eq!(law.peak_accel(), 0.3);
    }
}
