use crate::physics::FlightIntegrator;
use crate::utils::errors::SimError;
use crate::vehicles::{SharedVehicleState, VehicleId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Global ratio of simulated time to wall-clock time.
///
/// Every periodic loop divides its sleep by this, so the whole simulation
/// speeds up or slows down without changing any tick-relative behavior.
pub struct TimeScale {
    bits: AtomicU64,
}

impl TimeScale {
    pub fn new(ratio: f64) -> Self {
        assert!(ratio.is_finite() && ratio > 0.0, "time ratio must be positive");
        Self {
            bits: AtomicU64::new(ratio.to_bits()),
        }
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }

    pub fn set(&self, ratio: f64) {
        assert!(ratio.is_finite() && ratio > 0.0, "time ratio must be positive");
        self.bits.store(ratio.to_bits(), Ordering::Relaxed);
    }
}

struct PhysicsEntry {
    id: VehicleId,
    shared: Arc<SharedVehicleState>,
    integrator: FlightIntegrator,
}

/// Owns the fixed-timestep physics tick for every live vehicle.
///
/// Each tick advances every registered vehicle by exactly `timestep_s` of
/// simulated time, regardless of the wall-clock pacing chosen by the
/// scheduler.
#[derive(Clone)]
pub struct SimulationClock {
    timestep_s: f64,
    entries: Arc<Mutex<Vec<PhysicsEntry>>>,
}

impl SimulationClock {
    pub fn new(timestep_s: f64) -> Self {
        assert!(
            timestep_s.is_finite() && timestep_s > 0.0,
            "timestep must be positive and finite"
        );
        Self {
            timestep_s,
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn timestep_s(&self) -> f64 {
        self.timestep_s
    }

    pub fn register(
        &self,
        id: VehicleId,
        shared: Arc<SharedVehicleState>,
        integrator: FlightIntegrator,
    ) {
        let mut entries = self.entries.lock().expect("clock registry poisoned");
        entries.push(PhysicsEntry {
            id,
            shared,
            integrator,
        });
    }

    pub fn deregister(&self, id: VehicleId) {
        let mut entries = self.entries.lock().expect("clock registry poisoned");
        entries.retain(|entry| entry.id != id);
    }

    /// Advance every live vehicle by one fixed timestep
    pub fn tick(&self) -> Result<(), SimError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| SimError::TransientRead("clock registry poisoned".into()))?;
        for entry in entries.iter() {
            entry.shared.step_physics(&entry.integrator, self.timestep_s)?;
        }
        Ok(())
    }
}
