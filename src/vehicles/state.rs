use crate::physics::{ActuatorDemand, FlightIntegrator, PhysicalState};
use crate::utils::errors::SimError;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Read-only pose for the rendering layer, copied under the guard so
/// position and transform always come from the same physics tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PoseSnapshot {
    pub position: Vector3<f64>,
    pub heading_deg: f64,
    pub tilt_deg: f64,
}

/// Everything a controller may observe in one read.
///
/// Like the pose, this is copied out under the guard; the controller then
/// works on a consistent-but-possibly-stale view, which the system tolerates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StateSample {
    pub time_s: f64,
    pub position: Vector3<f64>,
    pub heading_deg: f64,
    pub tilt_deg: f64,
    pub main_rotor_rpm: f64,
    pub tail_rotor_rpm: f64,
    pub fuel_kg: f64,
    pub item_count: i32,
    pub taken_off: bool,
    pub engine_out: bool,
}

struct VehicleCore {
    physical: PhysicalState,
    demand: ActuatorDemand,
    item_count: i32,
}

/// Shared state of one vehicle: the contention point between the physics
/// tick and the control loops.
///
/// The physics tick is the only writer of the physical state; each actuator
/// demand field has exactly one controller writing it. Readers always copy.
pub struct SharedVehicleState {
    core: Mutex<VehicleCore>,
}

impl SharedVehicleState {
    pub fn new(physical: PhysicalState, item_count: i32) -> Self {
        Self {
            core: Mutex::new(VehicleCore {
                physical,
                demand: ActuatorDemand::default(),
                item_count,
            }),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, VehicleCore>, SimError> {
        self.core
            .lock()
            .map_err(|_| SimError::TransientRead("vehicle state lock poisoned".into()))
    }

    /// Atomic pose snapshot for rendering and camera framing
    pub fn pose(&self) -> Result<PoseSnapshot, SimError> {
        let core = self.lock()?;
        Ok(PoseSnapshot {
            position: core.physical.position,
            heading_deg: core.physical.heading_deg,
            tilt_deg: core.physical.tilt_deg,
        })
    }

    /// Full controller-facing sample
    pub fn sample(&self) -> Result<StateSample, SimError> {
        let core = self.lock()?;
        Ok(StateSample {
            time_s: core.physical.time_s,
            position: core.physical.position,
            heading_deg: core.physical.heading_deg,
            tilt_deg: core.physical.tilt_deg,
            main_rotor_rpm: core.physical.main_rotor_rpm,
            tail_rotor_rpm: core.physical.tail_rotor_rpm,
            fuel_kg: core.physical.fuel_kg,
            item_count: core.item_count,
            taken_off: core.physical.taken_off,
            engine_out: core.physical.engine_out,
        })
    }

    /// Accumulated rotor angles for animation [degrees]
    pub fn rotor_phase(&self) -> Result<(f64, f64), SimError> {
        let core = self.lock()?;
        Ok((
            core.physical.main_rotor_phase_deg,
            core.physical.tail_rotor_phase_deg,
        ))
    }

    /// Current actuator demand, as the integrator will next consume it
    pub fn demand(&self) -> Result<ActuatorDemand, SimError> {
        Ok(self.lock()?.demand)
    }

    /// Request a new main rotor speed. Ignored once the engine is out.
    pub fn request_main_rotor_rpm(&self, rpm: f64) -> Result<(), SimError> {
        let mut core = self.lock()?;
        if !core.physical.engine_out {
            core.demand.main_rotor_rpm = rpm;
        }
        Ok(())
    }

    /// Request a new tail rotor speed. Ignored once the engine is out.
    pub fn request_tail_rotor_rpm(&self, rpm: f64) -> Result<(), SimError> {
        let mut core = self.lock()?;
        if !core.physical.engine_out {
            core.demand.tail_rotor_rpm = rpm;
        }
        Ok(())
    }

    /// Request a new tilt level. Ignored once the engine is out.
    pub fn request_tilt_deg(&self, tilt: f64) -> Result<(), SimError> {
        let mut core = self.lock()?;
        if !core.physical.engine_out {
            core.demand.tilt_deg = tilt;
        }
        Ok(())
    }

    /// Drop one cargo item. Returns false when the hold is already empty.
    pub fn unload_item(&self) -> Result<bool, SimError> {
        let mut core = self.lock()?;
        if core.item_count > 0 {
            core.item_count -= 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Advance the physical state by one fixed timestep. Called only by the
    /// simulation clock.
    pub fn step_physics(&self, integrator: &FlightIntegrator, dt: f64) -> Result<(), SimError> {
        let mut core = self.lock()?;
        let VehicleCore {
            physical,
            demand,
            item_count,
        } = &mut *core;
        integrator.step(physical, demand, *item_count, dt);
        Ok(())
    }
}
