use crate::controllers::estimator::MotionEstimator;
use crate::controllers::target::TargetHandle;
use crate::physics::FlightParams;
use crate::utils::constants::{FUEL_PER_REVOLUTION, MAX_MAIN_ROTOR_SPEED};
use crate::utils::errors::SimError;
use crate::vehicles::SharedVehicleState;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Tuning for the altitude feedback loop
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AltitudeGains {
    /// Proportional correction about the hover baseline [RPM per m]
    pub kp_rpm_per_m: f64,
    /// Correction clamp outside the deceleration zone [RPM]
    pub max_correction_rpm: f64,
    /// Fraction of the commanded span treated as deceleration zone
    pub decel_fraction: f64,
    /// Bias applied against the direction of travel inside the zone [RPM]
    pub decel_bias_rpm: f64,
    /// Vertical-rate damping about the baseline [RPM per m/s]
    pub rate_damping: f64,
    /// Hold band around the target [m]
    pub tolerance_m: f64,
}

impl Default for AltitudeGains {
    fn default() -> Self {
        Self {
            kp_rpm_per_m: 0.5,
            max_correction_rpm: 12.0,
            decel_fraction: 0.36,
            decel_bias_rpm: 30.0,
            rate_damping: 8.0,
            tolerance_m: 2.0,
        }
    }
}

/// Estimates the hover baseline from accumulated fuel-burn history.
///
/// The controller never reads the true fuel level; it integrates the rotor
/// speed it observes and derives mass the same way the integrator burns fuel.
#[derive(Debug, Clone)]
pub struct HoverModel {
    params: FlightParams,
    fuel_capacity_kg: f64,
    burned_kg: f64,
    last_time_s: Option<f64>,
}

impl HoverModel {
    pub fn new(params: FlightParams, fuel_capacity_kg: f64) -> Self {
        Self {
            params,
            fuel_capacity_kg,
            burned_kg: 0.0,
            last_time_s: None,
        }
    }

    /// Account the fuel burned since the previous observation
    pub fn observe(&mut self, time_s: f64, main_rotor_rpm: f64) {
        if let Some(last) = self.last_time_s {
            let dt = time_s - last;
            if dt > 0.0 {
                self.burned_kg += main_rotor_rpm / 60.0 * dt * FUEL_PER_REVOLUTION;
            }
        }
        self.last_time_s = Some(time_s);
    }

    pub fn params(&self) -> &FlightParams {
        &self.params
    }

    pub fn fuel_estimate_kg(&self) -> f64 {
        (self.fuel_capacity_kg - self.burned_kg).max(0.0)
    }

    pub fn total_mass_kg(&self, item_count: i32) -> f64 {
        self.params.base_mass_kg
            + self.params.item_weight_kg * item_count as f64
            + self.fuel_estimate_kg()
    }

    /// Main rotor speed expected to balance current weight [RPM]
    pub fn hover_rpm(&self, item_count: i32) -> f64 {
        self.total_mass_kg(item_count) * self.params.gravity / self.params.thrust_per_rpm
    }
}

/// Deceleration-zone altitude law: hover baseline plus a bounded correction.
#[derive(Debug, Clone)]
pub struct AltitudeLaw {
    gains: AltitudeGains,
    target_m: f64,
    span_m: f64,
}

impl AltitudeLaw {
    pub fn new(gains: AltitudeGains) -> Self {
        Self {
            gains,
            target_m: 0.0,
            span_m: 1.0,
        }
    }

    pub fn target(&self) -> f64 {
        self.target_m
    }

    /// Retarget, capturing the span the deceleration zone is scaled from
    pub fn set_target(&mut self, target_m: f64, current_alt_m: f64) {
        self.target_m = target_m;
        self.span_m = (target_m - current_alt_m).abs().max(self.gains.tolerance_m);
    }

    /// Desired main rotor speed for the current measurement.
    ///
    /// The measured position is extrapolated one tick ahead with the last
    /// vertical-rate estimate before being compared to the target.
    pub fn desired_rpm(
        &self,
        altitude_m: f64,
        vertical_rate: f64,
        hover_rpm: f64,
        lookahead_s: f64,
    ) -> f64 {
        let projected = altitude_m + vertical_rate * lookahead_s;
        let err = self.target_m - projected;

        let correction = if err.abs() <= self.gains.tolerance_m {
            0.0
        } else {
            let in_decel_zone = err.abs() < self.gains.decel_fraction * self.span_m;
            // Only brake while actually moving at the target; a slow creep
            // through the zone is left to the proportional term
            let closing = vertical_rate * err.signum() > 0.5;
            if in_decel_zone && closing {
                // Bias down while ascending, up while descending
                -vertical_rate.signum() * self.gains.decel_bias_rpm
            } else {
                (self.gains.kp_rpm_per_m * err)
                    .clamp(-self.gains.max_correction_rpm, self.gains.max_correction_rpm)
            }
        };

        (hover_rpm + correction - self.gains.rate_damping * vertical_rate)
            .clamp(0.0, MAX_MAIN_ROTOR_SPEED)
    }
}

/// Periodic altitude loop for a hover vehicle. Owns the main rotor demand.
pub struct AltitudeController {
    shared: Arc<SharedVehicleState>,
    target: TargetHandle,
    law: AltitudeLaw,
    hover_model: HoverModel,
    estimator: MotionEstimator,
}

impl AltitudeController {
    pub const PERIOD: Duration = Duration::from_millis(crate::utils::constants::ALTITUDE_PERIOD_MS);

    pub fn new(
        shared: Arc<SharedVehicleState>,
        target: TargetHandle,
        gains: AltitudeGains,
        params: FlightParams,
        fuel_capacity_kg: f64,
    ) -> Self {
        Self {
            shared,
            target,
            law: AltitudeLaw::new(gains),
            hover_model: HoverModel::new(params, fuel_capacity_kg),
            estimator: MotionEstimator::default(),
        }
    }

    /// One control tick: read, estimate, correct the main rotor demand.
    pub fn tick(&mut self) -> Result<(), SimError> {
        let sample = self.shared.sample()?;
        self.hover_model.observe(sample.time_s, sample.main_rotor_rpm);

        let dt = match self.estimator.update(sample.time_s, sample.position) {
            Some(dt) => dt,
            None => return Ok(()),
        };

        let target = self.target.value_or(sample.time_s, sample.position.z);
        if target != self.law.target() {
            self.law.set_target(target, sample.position.z);
        }

        let hover = self.hover_model.hover_rpm(sample.item_count);
        let rpm = self
            .law
            .desired_rpm(sample.position.z, self.estimator.vertical_rate(), hover, dt);
        self.shared.request_main_rotor_rpm(rpm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn law_at(target: f64, current: f64) -> AltitudeLaw {
        let mut law = AltitudeLaw::new(AltitudeGains::default());
        law.set_target(target, current);
        law
    }

    #[test]
    fn test_hover_rpm_from_mass() {
        // 100 kg base + 150 kg fuel: 250 * 9.80665 / 11.1111 ~= 220.65 RPM
        let model = HoverModel::new(FlightParams::default(), 150.0);
        assert_relative_eq!(model.hover_rpm(0), 220.65, epsilon = 0.01);
    }

    #[test]
    fn test_fuel_burn_history_lowers_hover_rpm() {
        let mut model = HoverModel::new(FlightParams::default(), 150.0);
        model.observe(0.0, 300.0);
        // 100 s at 300 RPM burns 100 * 5 / 60 = 8.33 kg
        model.observe(100.0, 300.0);
        assert_relative_eq!(model.fuel_estimate_kg(), 150.0 - 500.0 / 60.0, epsilon = 1e-9);
        assert!(model.hover_rpm(0) < 220.65);
    }

    #[test]
    fn test_climb_demand_exceeds_hover_baseline() {
        let law = law_at(100.0, 0.0);
        let rpm = law.desired_rpm(0.0, 0.0, 220.0, 0.2);
        assert_relative_eq!(rpm, 232.0);
    }

    #[test]
    fn test_deceleration_zone_biases_against_climb() {
        let law = law_at(100.0, 0.0);
        // 80 m up, rising at 1.5 m/s: inside the 36 m zone and closing
        let rpm = law.desired_rpm(80.0, 1.5, 220.0, 0.2);
        assert!(rpm < 220.0 - 20.0);
    }

    #[test]
    fn test_descent_zone_biases_against_fall() {
        let law = law_at(0.1, 100.0);
        let rpm = law.desired_rpm(20.0, -1.5, 220.0, 0.2);
        assert!(rpm > 220.0 + 20.0);
    }

    #[test]
    fn test_hold_band_damps_residual_rate() {
        let law = law_at(100.0, 0.0);
        let rpm = law.desired_rpm(99.5, 0.4, 220.0, 0.2);
        assert_relative_eq!(rpm, 220.0 - 0.4 * 8.0, epsilon = 1e-9);
    }
}
