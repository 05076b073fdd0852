use crate::config::{SimulationConfig, VehicleConfig};
use crate::controllers::{
    AltitudeController, HeadingController, NavigationController, SpeedController, TargetHandle,
};
use crate::physics::{FlightIntegrator, PhysicalState};
use crate::utils::errors::SimError;
use crate::vehicles::{PoseSnapshot, SharedVehicleState, SpawnPoint, VehicleId, VehicleKind};
use crate::world::clock::{SimulationClock, TimeScale};
use crate::world::scheduler::spawn_periodic;
use crate::world::waypoints::WaypointQueue;
use crossbeam_channel::{unbounded, Receiver, Sender};
use nalgebra::Vector3;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::info;

/// Set-point handles for one hover vehicle's three loops
#[derive(Clone)]
pub struct HoverTargets {
    pub altitude: TargetHandle,
    pub heading: TargetHandle,
    pub speed: TargetHandle,
}

struct VehicleEntry {
    kind: VehicleKind,
    shared: Arc<SharedVehicleState>,
    waypoints: Arc<Mutex<WaypointQueue>>,
    targets: Option<HoverTargets>,
}

/// The simulation world: vehicle registry, fixed-timestep clock, and the
/// read-only interface consumed by rendering, HUD and telemetry layers.
///
/// Controllers get explicit handles at spawn time; nothing reaches back into
/// the world through ambient lookups.
pub struct World {
    config: SimulationConfig,
    time_scale: Arc<TimeScale>,
    clock: SimulationClock,
    vehicles: Mutex<HashMap<VehicleId, VehicleEntry>>,
    next_id: AtomicU32,
    shutdown_tx: Mutex<Option<Sender<()>>>,
    shutdown_rx: Receiver<()>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl World {
    pub fn new(config: SimulationConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = unbounded();
        let time_scale = Arc::new(TimeScale::new(config.physics.time_ratio));
        let clock = SimulationClock::new(config.physics.timestep_s);
        Self {
            config,
            time_scale,
            clock,
            vehicles: Mutex::new(HashMap::new()),
            next_id: AtomicU32::new(1),
            shutdown_tx: Mutex::new(Some(shutdown_tx)),
            shutdown_rx,
            handles: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The clock, for callers that drive physics synchronously
    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Start the wall-clock paced physics loop
    pub fn start(&self) {
        let clock = self.clock.clone();
        let period = Duration::from_secs_f64(self.clock.timestep_s());
        let handle = spawn_periodic(
            "physics".into(),
            period,
            Arc::clone(&self.time_scale),
            self.shutdown_rx.clone(),
            move || clock.tick(),
        );
        self.handles.lock().expect("handle list poisoned").push(handle);
    }

    pub fn set_time_ratio(&self, ratio: f64) {
        self.time_scale.set(ratio);
    }

    pub fn time_ratio(&self) -> f64 {
        self.time_scale.get()
    }

    fn allocate_id(&self) -> VehicleId {
        VehicleId(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn spawn_shared(&self, config: &VehicleConfig, spawn: SpawnPoint) -> Arc<SharedVehicleState> {
        let physical = PhysicalState::at_rest(
            spawn.position,
            crate::utils::math::wrap_heading(spawn.heading_deg),
            config.fuel_capacity_kg,
        );
        Arc::new(SharedVehicleState::new(physical, config.item_count))
    }

    /// Spawn a hover vehicle: three independent set-point loops
    pub fn spawn_hover(&self, vehicle_config: VehicleConfig, spawn: SpawnPoint) -> VehicleId {
        let id = self.allocate_id();
        let shared = self.spawn_shared(&vehicle_config, spawn);
        let integrator = FlightIntegrator::new(vehicle_config.flight_params());
        self.clock.register(id, Arc::clone(&shared), integrator);

        let targets = HoverTargets {
            altitude: TargetHandle::new(0.0),
            heading: TargetHandle::new(spawn.heading_deg),
            speed: TargetHandle::new(0.0),
        };

        let gains = &self.config.gains;
        let mut altitude = AltitudeController::new(
            Arc::clone(&shared),
            targets.altitude.clone(),
            gains.altitude,
            vehicle_config.flight_params(),
            vehicle_config.fuel_capacity_kg,
        );
        let mut heading =
            HeadingController::new(Arc::clone(&shared), targets.heading.clone(), gains.heading);
        let mut speed =
            SpeedController::new(Arc::clone(&shared), targets.speed.clone(), gains.speed);

        let mut handles = self.handles.lock().expect("handle list poisoned");
        handles.push(spawn_periodic(
            format!("{id}-altitude"),
            AltitudeController::PERIOD,
            Arc::clone(&self.time_scale),
            self.shutdown_rx.clone(),
            move || altitude.tick(),
        ));
        handles.push(spawn_periodic(
            format!("{id}-heading"),
            HeadingController::PERIOD,
            Arc::clone(&self.time_scale),
            self.shutdown_rx.clone(),
            move || heading.tick(),
        ));
        handles.push(spawn_periodic(
            format!("{id}-speed"),
            SpeedController::PERIOD,
            Arc::clone(&self.time_scale),
            self.shutdown_rx.clone(),
            move || speed.tick(),
        ));
        drop(handles);

        self.vehicles.lock().expect("registry poisoned").insert(
            id,
            VehicleEntry {
                kind: VehicleKind::Hover,
                shared,
                waypoints: Arc::new(Mutex::new(WaypointQueue::default())),
                targets: Some(targets),
            },
        );
        info!(%id, "hover vehicle spawned");
        id
    }

    /// Spawn a delivery vehicle: one navigation loop drives all demands
    pub fn spawn_delivery(&self, vehicle_config: VehicleConfig, spawn: SpawnPoint) -> VehicleId {
        let id = self.allocate_id();
        let shared = self.spawn_shared(&vehicle_config, spawn);
        let integrator = FlightIntegrator::new(vehicle_config.flight_params());
        self.clock.register(id, Arc::clone(&shared), integrator);

        let waypoints = Arc::new(Mutex::new(WaypointQueue::default()));
        let mut navigation = NavigationController::new(
            Arc::clone(&shared),
            Arc::clone(&waypoints),
            self.config.gains.navigation,
            vehicle_config.flight_params(),
            vehicle_config.fuel_capacity_kg,
        );

        self.handles.lock().expect("handle list poisoned").push(spawn_periodic(
            format!("{id}-navigation"),
            NavigationController::PERIOD,
            Arc::clone(&self.time_scale),
            self.shutdown_rx.clone(),
            move || navigation.tick(),
        ));

        self.vehicles.lock().expect("registry poisoned").insert(
            id,
            VehicleEntry {
                kind: VehicleKind::Delivery,
                shared,
                waypoints,
                targets: None,
            },
        );
        info!(%id, "delivery vehicle spawned");
        id
    }

    /// Remove a vehicle from the physics tick and the registry. Its control
    /// loops wind down at the world-wide shutdown.
    pub fn despawn(&self, id: VehicleId) -> Result<(), SimError> {
        self.clock.deregister(id);
        self.vehicles
            .lock()
            .expect("registry poisoned")
            .remove(&id)
            .map(|_| ())
            .ok_or(SimError::VehicleNotFound(id.0))
    }

    fn with_entry<T>(
        &self,
        id: VehicleId,
        f: impl FnOnce(&VehicleEntry) -> Result<T, SimError>,
    ) -> Result<T, SimError> {
        let vehicles = self.vehicles.lock().expect("registry poisoned");
        let entry = vehicles.get(&id).ok_or(SimError::VehicleNotFound(id.0))?;
        f(entry)
    }

    pub fn kind(&self, id: VehicleId) -> Result<VehicleKind, SimError> {
        self.with_entry(id, |entry| Ok(entry.kind))
    }

    /// Read-only pose snapshot for rendering
    pub fn get_pose(&self, id: VehicleId) -> Result<PoseSnapshot, SimError> {
        self.with_entry(id, |entry| entry.shared.pose())
    }

    /// Accumulated rotor angles for animation, no feedback into control
    pub fn get_rotor_phase(&self, id: VehicleId) -> Result<(f64, f64), SimError> {
        self.with_entry(id, |entry| entry.shared.rotor_phase())
    }

    pub fn get_fuel_remaining(&self, id: VehicleId) -> Result<f64, SimError> {
        self.with_entry(id, |entry| Ok(entry.shared.sample()?.fuel_kg))
    }

    pub fn get_item_count(&self, id: VehicleId) -> Result<i32, SimError> {
        self.with_entry(id, |entry| Ok(entry.shared.sample()?.item_count))
    }

    /// Replace a vehicle's waypoint queue wholesale
    pub fn set_waypoints(
        &self,
        id: VehicleId,
        points: Vec<Vector3<f64>>,
    ) -> Result<(), SimError> {
        self.with_entry(id, |entry| {
            entry
                .waypoints
                .lock()
                .map_err(|_| SimError::TransientRead("waypoint queue lock poisoned".into()))?
                .replace(points);
            Ok(())
        })
    }

    /// Remove a delivered waypoint; the navigation loop never does this
    pub fn complete_waypoint(
        &self,
        id: VehicleId,
        point: &Vector3<f64>,
    ) -> Result<bool, SimError> {
        self.with_entry(id, |entry| {
            Ok(entry
                .waypoints
                .lock()
                .map_err(|_| SimError::TransientRead("waypoint queue lock poisoned".into()))?
                .complete(point))
        })
    }

    /// Command a hover vehicle to hold an altitude at zero ground speed
    pub fn command_hover(&self, id: VehicleId, altitude_m: f64) -> Result<(), SimError> {
        self.with_entry(id, |entry| {
            let targets = entry.targets.as_ref().ok_or_else(|| {
                SimError::VehicleError(format!("{id} has no set-point loops"))
            })?;
            targets.altitude.set(altitude_m);
            targets.speed.set(0.0);
            Ok(())
        })
    }

    /// Set-point handles for a hover vehicle
    pub fn hover_targets(&self, id: VehicleId) -> Result<HoverTargets, SimError> {
        self.with_entry(id, |entry| {
            entry.targets.clone().ok_or_else(|| {
                SimError::VehicleError(format!("{id} has no set-point loops"))
            })
        })
    }

    pub fn vehicle_ids(&self) -> Vec<VehicleId> {
        self.vehicles
            .lock()
            .expect("registry poisoned")
            .keys()
            .copied()
            .collect()
    }

    /// Stop every loop and wait for the threads to wind down
    pub fn shutdown(&self) {
        let sender = self.shutdown_tx.lock().expect("shutdown lock poisoned").take();
        drop(sender);
        let handles: Vec<_> = self
            .handles
            .lock()
            .expect("handle list poisoned")
            .drain(..)
            .collect();
        for handle in handles {
            let _ = handle.join();
        }
        info!("world stopped");
    }
}

impl Drop for World {
    fn drop(&mut self) {
        self.shutdown();
    }
}
