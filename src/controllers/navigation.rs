use crate::controllers::altitude::HoverModel;
use crate::controllers::estimator::MotionEstimator;
use crate::controllers::heading::{HeadingGains, HeadingLaw};
use crate::controllers::speed::{SpeedGains, SpeedLaw};
use crate::physics::FlightParams;
use crate::utils::constants::{MAX_MAIN_ROTOR_SPEED, STABLE_TAIL_ROTOR_SPEED};
use crate::utils::errors::SimError;
use crate::utils::math::{angular_error, bearing_to, deg_to_rad, heading_from_velocity, planar_distance, planar_speed};
use crate::vehicles::{SharedVehicleState, StateSample};
use crate::world::WaypointQueue;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info};

/// Flight phase of a delivery vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavState {
    Landed,
    FindingHeading,
    ApproachingRough,
    TurnToward,
    Slowing,
    FineTuneHeading,
    ApproachingFine,
    Descending,
}

/// Tuning for the waypoint navigation state machine
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NavigationGains {
    /// Cruise altitude while far from the destination [m]
    pub cruise_altitude_m: f64,
    /// Altitude target once over the destination [m]
    pub final_altitude_m: f64,
    /// Lateral distance at which the altitude target drops [m]
    pub lateral_handoff_m: f64,
    /// Boundary between rough and fine approach [m]
    pub approach_radius_m: f64,
    /// Lateral distance that allows the descent [m]
    pub final_radius_m: f64,
    /// Ground speed cap during the rough approach [m/s]
    pub cruise_speed_cap: f64,
    /// Distance clamp for the proportional tilt law [m]
    pub distance_clamp_m: f64,
    /// Creep speed cap during the fine approach [m/s]
    pub creep_speed: f64,
    /// Below this the craft counts as stopped [m/s]
    pub slow_speed: f64,
    /// Heading tolerance for the precise alignment phases [degrees]
    pub fine_heading_tol_deg: f64,
    /// Heading tolerance while tracking in flight [degrees]
    pub coarse_heading_tol_deg: f64,
    /// Ticks in one state before the escape transition fires
    pub stuck_ticks: u32,
    /// Vertical rate/acceleration magnitude that counts as ground contact
    pub settle_eps: f64,
    /// Tilt authority for the lateral laws [degrees]
    pub max_tilt_deg: f64,
    /// Braking tilt per m/s of along-heading speed [degrees per m/s]
    pub brake_gain: f64,
    /// Cap on the desired vertical rate [m/s]
    pub max_climb_rate: f64,
    /// Desired vertical rate per meter of altitude error [1/s]
    pub climb_rate_gain: f64,
    /// Cap on the desired vertical acceleration [m/s^2]
    pub max_vert_accel: f64,
    /// Desired vertical acceleration per m/s of rate error [1/s]
    pub vert_accel_gain: f64,
    /// Patrol altitudes used when no destination is assigned [m]
    pub patrol_low_m: f64,
    pub patrol_high_m: f64,
    /// Patrol dwell on each altitude [s]
    pub patrol_period_s: f64,
}

impl Default for NavigationGains {
    fn default() -> Self {
        Self {
            cruise_altitude_m: 125.0,
            final_altitude_m: 0.1,
            lateral_handoff_m: 5.0,
            approach_radius_m: 25.0,
            final_radius_m: 1.0,
            cruise_speed_cap: 5.0,
            distance_clamp_m: 525.0,
            creep_speed: 0.5,
            slow_speed: 0.25,
            fine_heading_tol_deg: 0.03,
            coarse_heading_tol_deg: 0.15,
            stuck_ticks: 500,
            settle_eps: 0.001,
            max_tilt_deg: 4.0,
            brake_gain: 1.0,
            max_climb_rate: 2.5,
            climb_rate_gain: 0.2,
            max_vert_accel: 0.8,
            vert_accel_gain: 0.8,
            patrol_low_m: 75.0,
            patrol_high_m: 125.0,
            patrol_period_s: 20.0,
        }
    }
}

/// Waypoint navigation for a delivery vehicle.
///
/// Samples the pose once per tick, estimates motion by finite differences,
/// and drives all three actuator demands through a sequence of flight
/// phases. The vertical channel runs every tick regardless of the lateral
/// phase.
pub struct NavigationController {
    shared: Arc<SharedVehicleState>,
    waypoints: Arc<Mutex<WaypointQueue>>,
    gains: NavigationGains,
    hover_model: HoverModel,
    estimator: MotionEstimator,
    speed_law: SpeedLaw,
    fine_heading: HeadingLaw,
    coarse_heading: HeadingLaw,
    state: NavState,
    destination: Option<Vector3<f64>>,
    state_ticks: u32,
    last_heading: Option<(f64, f64)>,
    turn_rate_dps: f64,
}

impl NavigationController {
    pub const PERIOD: Duration =
        Duration::from_millis(crate::utils::constants::NAVIGATION_PERIOD_MS);

    pub fn new(
        shared: Arc<SharedVehicleState>,
        waypoints: Arc<Mutex<WaypointQueue>>,
        gains: NavigationGains,
        params: FlightParams,
        fuel_capacity_kg: f64,
    ) -> Self {
        let fine_heading = HeadingLaw::new(HeadingGains {
            tolerance_deg: gains.fine_heading_tol_deg,
            ..Default::default()
        });
        let coarse_heading = HeadingLaw::new(HeadingGains {
            tolerance_deg: gains.coarse_heading_tol_deg,
            ..Default::default()
        });
        Self {
            shared,
            waypoints,
            gains,
            hover_model: HoverModel::new(params, fuel_capacity_kg),
            estimator: MotionEstimator::default(),
            speed_law: SpeedLaw::new(SpeedGains {
                max_tilt_deg: gains.max_tilt_deg,
                ..Default::default()
            }),
            fine_heading,
            coarse_heading,
            state: NavState::Landed,
            destination: None,
            state_ticks: 0,
            last_heading: None,
            turn_rate_dps: 0.0,
        }
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn destination(&self) -> Option<Vector3<f64>> {
        self.destination
    }

    /// One navigation tick: sample, estimate, drive all three demands.
    pub fn tick(&mut self) -> Result<(), SimError> {
        let sample = self.shared.sample()?;
        self.hover_model.observe(sample.time_s, sample.main_rotor_rpm);

        if let Some((last_t, last_h)) = self.last_heading {
            let dt = sample.time_s - last_t;
            if dt > 1e-6 {
                self.turn_rate_dps = angular_error(sample.heading_deg, last_h) / dt;
            }
        }
        self.last_heading = Some((sample.time_s, sample.heading_deg));

        if self.estimator.update(sample.time_s, sample.position).is_none() {
            return Ok(());
        }
        self.speed_law
            .observe_accel(planar_speed(&self.estimator.acceleration()));

        // Vertical channel, independent of the lateral phase
        let alt_target = self.select_altitude_target(&sample);
        let rpm = self.vertical_rpm(&sample, alt_target);
        self.shared.request_main_rotor_rpm(rpm)?;

        // Lateral phase machine
        self.state_ticks = self.state_ticks.saturating_add(1);
        let (tail, tilt) = self.lateral(&sample)?;
        self.shared.request_tail_rotor_rpm(tail)?;
        self.shared.request_tilt_deg(tilt)
    }

    fn transition(&mut self, next: NavState) {
        if next != self.state {
            debug!(from = ?self.state, to = ?next, "nav transition");
            self.state = next;
            self.state_ticks = 0;
        }
    }

    /// Altitude target for this tick: cruise clear of obstacles, drop over
    /// the destination, patrol between two levels when idle.
    fn select_altitude_target(&self, sample: &StateSample) -> f64 {
        match self.destination {
            Some(dest) => {
                if planar_distance(&sample.position, &dest) > self.gains.lateral_handoff_m {
                    self.gains.cruise_altitude_m
                } else {
                    self.gains.final_altitude_m
                }
            }
            None => {
                let phase = (sample.time_s / self.gains.patrol_period_s) as i64;
                if phase % 2 == 0 {
                    self.gains.patrol_low_m
                } else {
                    self.gains.patrol_high_m
                }
            }
        }
    }

    /// Two-stage cascaded vertical law: altitude error shapes a desired
    /// rate, rate error shapes a desired acceleration, which becomes an RPM
    /// offset about the hover baseline.
    fn vertical_rpm(&self, sample: &StateSample, alt_target: f64) -> f64 {
        let gains = &self.gains;
        let err = alt_target - sample.position.z;
        let desired_rate =
            (gains.climb_rate_gain * err).clamp(-gains.max_climb_rate, gains.max_climb_rate);
        let rate_err = desired_rate - self.estimator.vertical_rate();
        let desired_accel =
            (gains.vert_accel_gain * rate_err).clamp(-gains.max_vert_accel, gains.max_vert_accel);

        let mass = self.hover_model.total_mass_kg(sample.item_count);
        let hover = self.hover_model.hover_rpm(sample.item_count);
        let rpm_offset = mass * desired_accel / self.hover_model.params().thrust_per_rpm;
        (hover + rpm_offset).clamp(0.0, MAX_MAIN_ROTOR_SPEED)
    }

    fn distance_to_destination(&self, sample: &StateSample) -> f64 {
        self.destination
            .map(|d| planar_distance(&sample.position, &d))
            .unwrap_or(f64::INFINITY)
    }

    /// Lateral phase machine; returns (tail demand, tilt demand)
    fn lateral(&mut self, sample: &StateSample) -> Result<(f64, f64), SimError> {
        let gains = self.gains;
        let level = (STABLE_TAIL_ROTOR_SPEED, 0.0);

        match self.state {
            NavState::Landed => {
                if self.destination.is_none() {
                    let mut queue = self.waypoints.lock().map_err(|_| {
                        SimError::TransientRead("waypoint queue lock poisoned".into())
                    })?;
                    if let Some(next) = queue.claim_nearest(&sample.position) {
                        info!(x = next.x, y = next.y, "destination claimed");
                        self.destination = Some(next);
                    }
                }
                if self.destination.is_some() {
                    self.transition(NavState::FindingHeading);
                }
                Ok(level)
            }

            NavState::FindingHeading => {
                let Some(dest) = self.destination else {
                    self.transition(NavState::Landed);
                    return Ok(level);
                };
                let bearing = bearing_to(&sample.position, &dest);
                if self
                    .fine_heading
                    .is_aligned(bearing, sample.heading_deg, self.turn_rate_dps)
                {
                    self.transition(NavState::ApproachingRough);
                    return Ok(level);
                }
                if self.state_ticks > gains.stuck_ticks {
                    self.transition(NavState::TurnToward);
                    return Ok(level);
                }
                Ok((
                    self.fine_heading.desired_tail_rpm(bearing, sample.heading_deg),
                    0.0,
                ))
            }

            NavState::ApproachingRough => {
                let Some(dest) = self.destination else {
                    self.transition(NavState::Landed);
                    return Ok(level);
                };
                let dist = planar_distance(&sample.position, &dest);
                if dist <= gains.approach_radius_m {
                    self.transition(NavState::TurnToward);
                    return Ok(level);
                }
                if self.state_ticks > gains.stuck_ticks {
                    self.transition(NavState::FindingHeading);
                    return Ok(level);
                }
                let bearing = bearing_to(&sample.position, &dest);
                let tail = self
                    .coarse_heading
                    .desired_tail_rpm(bearing, sample.heading_deg);
                let speed = self.estimator.planar_speed();
                let tilt = if speed > gains.cruise_speed_cap {
                    0.0
                } else {
                    gains.max_tilt_deg * dist.min(gains.distance_clamp_m)
                        / gains.distance_clamp_m
                };
                Ok((tail, tilt))
            }

            NavState::TurnToward => {
                let speed = self.estimator.planar_speed();
                if speed < gains.slow_speed {
                    self.transition(NavState::Slowing);
                    return Ok(level);
                }
                // Face the direction of travel, not the target, so braking
                // tilt opposes the velocity.
                let travel = heading_from_velocity(&self.estimator.velocity());
                if self
                    .coarse_heading
                    .is_aligned(travel, sample.heading_deg, self.turn_rate_dps)
                {
                    self.transition(NavState::Slowing);
                    return Ok(level);
                }
                Ok((
                    self.coarse_heading.desired_tail_rpm(travel, sample.heading_deg),
                    0.0,
                ))
            }

            NavState::Slowing => {
                let speed = self.estimator.planar_speed();
                if speed < gains.slow_speed {
                    if self.distance_to_destination(sample) <= gains.approach_radius_m {
                        self.transition(NavState::FineTuneHeading);
                    } else {
                        self.transition(NavState::FindingHeading);
                    }
                    return Ok(level);
                }
                let heading_rad = deg_to_rad(sample.heading_deg);
                let velocity = self.estimator.velocity();
                let along = velocity.x * heading_rad.cos() + velocity.y * heading_rad.sin();
                let tilt = (-gains.brake_gain * along)
                    .clamp(-gains.max_tilt_deg, gains.max_tilt_deg);
                Ok((STABLE_TAIL_ROTOR_SPEED, tilt))
            }

            NavState::FineTuneHeading => {
                let Some(dest) = self.destination else {
                    self.transition(NavState::Landed);
                    return Ok(level);
                };
                let bearing = bearing_to(&sample.position, &dest);
                if self
                    .fine_heading
                    .is_aligned(bearing, sample.heading_deg, self.turn_rate_dps)
                {
                    self.transition(NavState::ApproachingFine);
                    return Ok(level);
                }
                Ok((
                    self.fine_heading.desired_tail_rpm(bearing, sample.heading_deg),
                    0.0,
                ))
            }

            NavState::ApproachingFine => {
                let Some(dest) = self.destination else {
                    self.transition(NavState::Landed);
                    return Ok(level);
                };
                let dist = planar_distance(&sample.position, &dest);
                if dist > gains.approach_radius_m {
                    self.transition(NavState::ApproachingRough);
                    return Ok(level);
                }
                if dist <= gains.final_radius_m {
                    self.transition(NavState::Descending);
                    return Ok(level);
                }
                let bearing = bearing_to(&sample.position, &dest);
                let tail = self
                    .coarse_heading
                    .desired_tail_rpm(bearing, sample.heading_deg);
                let heading_rad = deg_to_rad(sample.heading_deg);
                let velocity = self.estimator.velocity();
                let along = velocity.x * heading_rad.cos() + velocity.y * heading_rad.sin();
                let creep_target = (0.1 * dist).min(gains.creep_speed);
                let tilt = self.speed_law.desired_tilt(along, creep_target);
                Ok((tail, tilt))
            }

            NavState::Descending => {
                if self.estimator.vertical_rate().abs() < gains.settle_eps
                    && self.estimator.vertical_accel().abs() < gains.settle_eps
                {
                    if self.destination.take().is_some() {
                        if self.shared.unload_item()? {
                            info!("cargo item delivered");
                        }
                    }
                    self.transition(NavState::Landed);
                    return Ok(level);
                }
                // Velocity persists without drag; keep bleeding off any
                // residual creep so the descent stays over the target.
                let heading_rad = deg_to_rad(sample.heading_deg);
                let velocity = self.estimator.velocity();
                let along = velocity.x * heading_rad.cos() + velocity.y * heading_rad.sin();
                let tilt = (-gains.brake_gain * along)
                    .clamp(-gains.max_tilt_deg, gains.max_tilt_deg);
                Ok((STABLE_TAIL_ROTOR_SPEED, tilt))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::PhysicalState;
    use approx::assert_relative_eq;

    fn controller_with(
        position: Vector3<f64>,
        waypoints: Vec<Vector3<f64>>,
    ) -> (NavigationController, Arc<SharedVehicleState>) {
        let shared = Arc::new(SharedVehicleState::new(
            PhysicalState::at_rest(position, 0.0, 150.0),
            8,
        ));
        let queue = Arc::new(Mutex::new(WaypointQueue::new(waypoints)));
        let nav = NavigationController::new(
            Arc::clone(&shared),
            queue,
            NavigationGains::default(),
            FlightParams::default(),
            150.0,
        );
        (nav, shared)
    }

    fn sample_at(position: Vector3<f64>, time_s: f64) -> StateSample {
        StateSample {
            time_s,
            position,
            heading_deg: 0.0,
            tilt_deg: 0.0,
            main_rotor_rpm: 0.0,
            tail_rotor_rpm: 0.0,
            fuel_kg: 150.0,
            item_count: 8,
            taken_off: true,
            engine_out: false,
        }
    }

    #[test]
    fn test_landed_claims_nearest_waypoint() {
        let (mut nav, _) = controller_with(
            Vector3::zeros(),
            vec![Vector3::new(10.0, 10.0, 0.0), Vector3::new(5.0, 5.0, 0.0)],
        );
        nav.lateral(&sample_at(Vector3::zeros(), 0.0)).unwrap();
        let dest = nav.destination().unwrap();
        assert_relative_eq!(dest.x, 5.0);
        assert_relative_eq!(dest.y, 5.0);
        assert_eq!(nav.state(), NavState::FindingHeading);
    }

    #[test]
    fn test_landed_without_waypoints_stays_landed() {
        let (mut nav, _) = controller_with(Vector3::zeros(), vec![]);
        nav.lateral(&sample_at(Vector3::zeros(), 0.0)).unwrap();
        assert_eq!(nav.state(), NavState::Landed);
        assert!(nav.destination().is_none());
    }

    #[test]
    fn test_fine_approach_holds_outside_one_meter() {
        let (mut nav, _) = controller_with(Vector3::zeros(), vec![]);
        nav.destination = Some(Vector3::new(10.0, 0.0, 0.0));
        nav.state = NavState::ApproachingFine;

        // 1.05 m out: must NOT start the descent
        nav.lateral(&sample_at(Vector3::new(8.95, 0.0, 125.0), 0.0))
            .unwrap();
        assert_ne!(nav.state(), NavState::Descending);

        // 0.9 m out: descent begins
        nav.state = NavState::ApproachingFine;
        nav.lateral(&sample_at(Vector3::new(9.1, 0.0, 125.0), 0.02))
            .unwrap();
        assert_eq!(nav.state(), NavState::Descending);
    }

    #[test]
    fn test_fine_approach_escalates_when_pushed_out() {
        let (mut nav, _) = controller_with(Vector3::zeros(), vec![]);
        nav.destination = Some(Vector3::new(100.0, 0.0, 0.0));
        nav.state = NavState::ApproachingFine;
        nav.lateral(&sample_at(Vector3::zeros(), 0.0)).unwrap();
        assert_eq!(nav.state(), NavState::ApproachingRough);
    }

    #[test]
    fn test_rough_approach_hands_off_at_radius() {
        let (mut nav, _) = controller_with(Vector3::zeros(), vec![]);
        nav.destination = Some(Vector3::new(20.0, 0.0, 0.0));
        nav.state = NavState::ApproachingRough;
        nav.lateral(&sample_at(Vector3::zeros(), 0.0)).unwrap();
        assert_eq!(nav.state(), NavState::TurnToward);
    }

    #[test]
    fn test_rough_approach_tilt_proportional_to_distance() {
        let (mut nav, _) = controller_with(Vector3::zeros(), vec![]);
        nav.destination = Some(Vector3::new(1050.0, 0.0, 0.0));
        nav.state = NavState::ApproachingRough;
        // Distance beyond the clamp saturates at full tilt authority
        let (_, tilt) = nav
            .lateral(&sample_at(Vector3::zeros(), 0.0))
            .unwrap();
        assert_relative_eq!(tilt, 4.0);

        nav.destination = Some(Vector3::new(262.5, 0.0, 0.0));
        let (_, half_tilt) = nav.lateral(&sample_at(Vector3::zeros(), 0.02)).unwrap();
        assert_relative_eq!(half_tilt, 2.0);
    }

    #[test]
    fn test_stuck_escape_from_finding_heading() {
        let (mut nav, _) = controller_with(Vector3::zeros(), vec![]);
        nav.destination = Some(Vector3::new(100.0, 100.0, 0.0));
        nav.state = NavState::FindingHeading;
        nav.state_ticks = 501;
        nav.lateral(&sample_at(Vector3::zeros(), 0.0)).unwrap();
        assert_eq!(nav.state(), NavState::TurnToward);
    }

    #[test]
    fn test_descent_settle_delivers_and_lands() {
        let (mut nav, shared) = controller_with(Vector3::zeros(), vec![]);
        nav.destination = Some(Vector3::new(0.5, 0.0, 0.0));
        nav.state = NavState::Descending;
        // Estimator is at rest: both rates are zero, under the epsilon
        nav.lateral(&sample_at(Vector3::new(0.5, 0.0, 0.05), 0.0))
            .unwrap();
        assert_eq!(nav.state(), NavState::Landed);
        assert!(nav.destination().is_none());
        assert_eq!(shared.sample().unwrap().item_count, 7);
    }

    #[test]
    fn test_altitude_target_tracks_destination_distance() {
        let (mut nav, _) = controller_with(Vector3::zeros(), vec![]);
        nav.destination = Some(Vector3::new(100.0, 0.0, 0.0));
        let far = nav.select_altitude_target(&sample_at(Vector3::zeros(), 0.0));
        assert_relative_eq!(far, 125.0);

        let near = nav.select_altitude_target(&sample_at(Vector3::new(97.0, 0.0, 50.0), 0.0));
        assert_relative_eq!(near, 0.1);
    }

    #[test]
    fn test_patrol_oscillates_between_two_altitudes() {
        let (nav, _) = controller_with(Vector3::zeros(), vec![]);
        let low = nav.select_altitude_target(&sample_at(Vector3::zeros(), 5.0));
        let high = nav.select_altitude_target(&sample_at(Vector3::zeros(), 25.0));
        let low_again = nav.select_altitude_target(&sample_at(Vector3::zeros(), 45.0));
        assert_relative_eq!(low, 75.0);
        assert_relative_eq!(high, 125.0);
        assert_relative_eq!(low_again, 75.0);
    }
}
