use crate::physics::actuators::{slew_toward, ActuatorDemand};
use crate::physics::state::PhysicalState;
use crate::utils::constants::*;
use crate::utils::math::{deg_to_rad, wrap_heading};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Mass and thrust parameters for one vehicle
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FlightParams {
    /// Empty mass of the airframe [kg]
    pub base_mass_kg: f64,
    /// Mass of one cargo item [kg]
    pub item_weight_kg: f64,
    /// Lift produced per RPM of main rotor speed [N]
    pub thrust_per_rpm: f64,
    /// Gravitational acceleration magnitude [m/s^2]
    pub gravity: f64,
}

impl Default for FlightParams {
    fn default() -> Self {
        Self {
            base_mass_kg: BASE_MASS,
            item_weight_kg: ITEM_WEIGHT,
            thrust_per_rpm: THRUST_PER_RPM,
            gravity: EARTH_ACCELERATION,
        }
    }
}

/// Advances one vehicle's true physical state by a fixed timestep.
///
/// The update order is fixed: fuel, actuator slew, vertical force balance,
/// heading, lateral acceleration, then semi-implicit Euler integration.
#[derive(Debug, Clone, Default)]
pub struct FlightIntegrator {
    params: FlightParams,
}

impl FlightIntegrator {
    pub fn new(params: FlightParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &FlightParams {
        &self.params
    }

    /// Total mass including cargo and remaining fuel [kg]
    pub fn total_mass(&self, state: &PhysicalState, item_count: i32) -> f64 {
        self.params.base_mass_kg + self.params.item_weight_kg * item_count as f64 + state.fuel_kg
    }

    /// Advance `state` by `dt` seconds under the given actuator demand.
    ///
    /// Demand is taken mutably: fuel exhaustion forces every desired value to
    /// zero, and that write must be visible to the controllers' next read.
    pub fn step(
        &self,
        state: &mut PhysicalState,
        demand: &mut ActuatorDemand,
        item_count: i32,
        dt: f64,
    ) {
        // Degenerate input is a programming error, not a recoverable state.
        assert!(dt > 0.0 && dt.is_finite(), "timestep must be positive and finite");
        debug_assert!(
            demand.main_rotor_rpm.is_finite()
                && demand.tail_rotor_rpm.is_finite()
                && demand.tilt_deg.is_finite(),
            "actuator demand must be finite"
        );

        self.update_fuel(state, demand, dt);

        // Slew actuals toward the clamped demand
        let clamped = demand.clamped();
        state.main_rotor_rpm = slew_toward(
            state.main_rotor_rpm,
            clamped.main_rotor_rpm,
            MAX_MAIN_ROTOR_DELTA,
            dt,
        );
        state.tail_rotor_rpm = slew_toward(
            state.tail_rotor_rpm,
            clamped.tail_rotor_rpm,
            MAX_TAIL_ROTOR_DELTA,
            dt,
        );
        state.tilt_deg = slew_toward(state.tilt_deg, clamped.tilt_deg, MAX_TILT_DELTA, dt);

        self.update_rotor_phases(state, dt);

        // Vertical force balance
        let total_mass = self.total_mass(state, item_count);
        let tilt_rad = deg_to_rad(state.tilt_deg);
        let lift_n = state.main_rotor_rpm * self.params.thrust_per_rpm * tilt_rad.cos();
        let weight_n = total_mass * self.params.gravity;
        let delta_n = lift_n - weight_n;

        if delta_n > 0.0 {
            state.acceleration.z = delta_n / total_mass;
            if !state.taken_off {
                debug!(time_s = state.time_s, "vehicle has lifted off");
                state.taken_off = true;
            }
        } else if state.taken_off {
            // Ground contact is not modeled after first liftoff: a craft that
            // keeps descending continues below the ground plane.
            state.acceleration.z = delta_n / total_mass;
        } else {
            state.acceleration.z = 0.0;
        }

        if state.taken_off {
            self.update_heading(state, dt);
            // Thrust component rotated into the horizontal plane
            let lateral_accel =
                state.main_rotor_rpm * self.params.thrust_per_rpm * tilt_rad.sin() / total_mass;
            let heading_rad = deg_to_rad(state.heading_deg);
            state.acceleration.x = lateral_accel * heading_rad.cos();
            state.acceleration.y = lateral_accel * heading_rad.sin();
        } else {
            // No skating while grounded
            state.acceleration.x = 0.0;
            state.acceleration.y = 0.0;
        }

        // Semi-implicit Euler: velocity first, then position
        state.velocity += state.acceleration * dt;
        state.position += state.velocity * dt;
        state.time_s += dt;
    }

    /// Burn fuel for this step; on exhaustion latch the engine-out state and
    /// force all demand to zero. The latch is sticky.
    fn update_fuel(&self, state: &mut PhysicalState, demand: &mut ActuatorDemand, dt: f64) {
        if state.fuel_kg > 0.0 {
            let revolutions = state.main_rotor_rpm / 60.0 * dt;
            state.fuel_kg -= revolutions * FUEL_PER_REVOLUTION;
            if state.fuel_kg <= 0.0 {
                state.fuel_kg = 0.0;
                if !state.engine_out {
                    warn!(time_s = state.time_s, "out of fuel, engine out");
                    state.engine_out = true;
                }
            }
        }
        if state.engine_out {
            demand.zero();
        }
    }

    fn update_heading(&self, state: &mut PhysicalState, dt: f64) {
        let effective = state
            .tail_rotor_rpm
            .clamp(MIN_TAIL_ROTOR_SPEED, MAX_TAIL_ROTOR_SPEED);
        let rotor_setting = effective - STABLE_TAIL_ROTOR_SPEED;
        state.heading_deg =
            wrap_heading(state.heading_deg + rotor_setting * ROTATION_PER_TAIL_RPM * dt);
    }

    fn update_rotor_phases(&self, state: &mut PhysicalState, dt: f64) {
        state.main_rotor_phase_deg = wrap_heading(
            state.main_rotor_phase_deg
                + state.main_rotor_rpm * ROTOR_DEGREES_PER_RPM_SECOND * dt,
        );
        state.tail_rotor_phase_deg = wrap_heading(
            state.tail_rotor_phase_deg
                + state.tail_rotor_rpm * ROTOR_DEGREES_PER_RPM_SECOND * dt,
        );
    }
}
