use nalgebra::Vector3;
use rotorsim::config::VehicleConfig;
use rotorsim::controllers::{
    AltitudeController, AltitudeGains, HeadingController, HeadingGains, NavigationController,
    NavigationGains, SpeedController, SpeedGains, TargetHandle,
};
use rotorsim::physics::{FlightIntegrator, PhysicalState};
use rotorsim::utils::constants::DEFAULT_TIMESTEP;
use rotorsim::vehicles::{SharedVehicleState, StateSample};
use rotorsim::world::WaypointQueue;
use std::sync::{Arc, Mutex};

/// Drives one hover vehicle synchronously: the physics tick and the three
/// control loops advance on simulated time, with no threads or wall-clock
/// sleeps, so scenarios are deterministic.
pub struct HoverHarness {
    pub shared: Arc<SharedVehicleState>,
    pub altitude_target: TargetHandle,
    pub heading_target: TargetHandle,
    pub speed_target: TargetHandle,
    integrator: FlightIntegrator,
    altitude: AltitudeController,
    heading: HeadingController,
    speed: SpeedController,
    sim_time: f64,
    next_altitude_s: f64,
    next_heading_s: f64,
    next_speed_s: f64,
}

impl HoverHarness {
    pub fn new(config: VehicleConfig) -> Self {
        Self::with_spawn(config, Vector3::zeros(), 0.0)
    }

    pub fn with_spawn(config: VehicleConfig, position: Vector3<f64>, heading_deg: f64) -> Self {
        let shared = Arc::new(SharedVehicleState::new(
            PhysicalState::at_rest(position, heading_deg, config.fuel_capacity_kg),
            config.item_count,
        ));
        let altitude_target = TargetHandle::new(0.0);
        let heading_target = TargetHandle::new(heading_deg);
        let speed_target = TargetHandle::new(0.0);

        let altitude = AltitudeController::new(
            Arc::clone(&shared),
            altitude_target.clone(),
            AltitudeGains::default(),
            config.flight_params(),
            config.fuel_capacity_kg,
        );
        let heading = HeadingController::new(
            Arc::clone(&shared),
            heading_target.clone(),
            HeadingGains::default(),
        );
        let speed = SpeedController::new(
            Arc::clone(&shared),
            speed_target.clone(),
            SpeedGains::default(),
        );

        Self {
            shared,
            altitude_target,
            heading_target,
            speed_target,
            integrator: FlightIntegrator::new(config.flight_params()),
            altitude,
            heading,
            speed,
            sim_time: 0.0,
            next_altitude_s: 0.0,
            next_heading_s: 0.0,
            next_speed_s: 0.0,
        }
    }

    /// Advance simulated time by `seconds`
    pub fn run_for(&mut self, seconds: f64) {
        let end = self.sim_time + seconds;
        while self.sim_time < end {
            self.shared
                .step_physics(&self.integrator, DEFAULT_TIMESTEP)
                .expect("physics step failed");
            self.sim_time += DEFAULT_TIMESTEP;

            if self.sim_time >= self.next_altitude_s {
                self.altitude.tick().expect("altitude tick failed");
                self.next_altitude_s += AltitudeController::PERIOD.as_secs_f64();
            }
            if self.sim_time >= self.next_heading_s {
                self.heading.tick().expect("heading tick failed");
                self.next_heading_s += HeadingController::PERIOD.as_secs_f64();
            }
            if self.sim_time >= self.next_speed_s {
                self.speed.tick().expect("speed tick failed");
                self.next_speed_s += SpeedController::PERIOD.as_secs_f64();
            }
        }
    }

    pub fn sample(&self) -> StateSample {
        self.shared.sample().expect("sample failed")
    }
}

/// Drives one delivery vehicle synchronously: physics plus the navigation
/// state machine.
pub struct DeliveryHarness {
    pub shared: Arc<SharedVehicleState>,
    pub waypoints: Arc<Mutex<WaypointQueue>>,
    pub navigation: NavigationController,
    integrator: FlightIntegrator,
    sim_time: f64,
    next_nav_s: f64,
}

impl DeliveryHarness {
    pub fn new(config: VehicleConfig, waypoints: Vec<Vector3<f64>>) -> Self {
        Self::with_spawn(config, waypoints, Vector3::zeros(), 0.0)
    }

    pub fn with_spawn(
        config: VehicleConfig,
        waypoints: Vec<Vector3<f64>>,
        position: Vector3<f64>,
        heading_deg: f64,
    ) -> Self {
        let shared = Arc::new(SharedVehicleState::new(
            PhysicalState::at_rest(position, heading_deg, config.fuel_capacity_kg),
            config.item_count,
        ));
        let queue = Arc::new(Mutex::new(WaypointQueue::new(waypoints)));
        let navigation = NavigationController::new(
            Arc::clone(&shared),
            Arc::clone(&queue),
            NavigationGains::default(),
            config.flight_params(),
            config.fuel_capacity_kg,
        );
        Self {
            shared,
            waypoints: queue,
            navigation,
            integrator: FlightIntegrator::new(config.flight_params()),
            sim_time: 0.0,
            next_nav_s: 0.0,
        }
    }

    /// Advance simulated time by `seconds`
    pub fn run_for(&mut self, seconds: f64) {
        let end = self.sim_time + seconds;
        while self.sim_time < end {
            self.shared
                .step_physics(&self.integrator, DEFAULT_TIMESTEP)
                .expect("physics step failed");
            self.sim_time += DEFAULT_TIMESTEP;

            while self.sim_time >= self.next_nav_s {
                self.navigation.tick().expect("navigation tick failed");
                self.next_nav_s += NavigationController::PERIOD.as_secs_f64();
            }
        }
    }

    pub fn sample(&self) -> StateSample {
        self.shared.sample().expect("sample failed")
    }
}
