use nalgebra::Vector3;

/// Reject samples closer together than this [s]
const MIN_SAMPLE_DT: f64 = 1e-6;

/// Velocity and acceleration estimated by finite-differencing sampled
/// positions.
///
/// This is deliberately NOT the velocity the integrator uses internally; the
/// two quantities can diverge under irregular sampling and the control laws
/// are written against this estimated one.
#[derive(Debug, Clone)]
pub struct MotionEstimator {
    /// Share of each new raw sample blended into the running estimate
    alpha: f64,
    last_time_s: Option<f64>,
    last_position: Vector3<f64>,
    last_raw_velocity: Vector3<f64>,
    velocity: Vector3<f64>,
    acceleration: Vector3<f64>,
    samples: u64,
}

impl MotionEstimator {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            last_time_s: None,
            last_position: Vector3::zeros(),
            last_raw_velocity: Vector3::zeros(),
            velocity: Vector3::zeros(),
            acceleration: Vector3::zeros(),
            samples: 0,
        }
    }

    /// Feed one position sample. Returns the sample-to-sample dt, or None
    /// when the estimate could not be advanced (first sample, or dt below
    /// the guard threshold).
    pub fn update(&mut self, time_s: f64, position: Vector3<f64>) -> Option<f64> {
        let last_time = match self.last_time_s {
            None => {
                self.last_time_s = Some(time_s);
                self.last_position = position;
                return None;
            }
            Some(t) => t,
        };

        let dt = time_s - last_time;
        if dt < MIN_SAMPLE_DT {
            return None;
        }

        let raw_velocity = (position - self.last_position) / dt;
        let raw_acceleration = (raw_velocity - self.last_raw_velocity) / dt;

        if self.samples == 0 {
            self.velocity = raw_velocity;
        } else {
            self.velocity = self.velocity * (1.0 - self.alpha) + raw_velocity * self.alpha;
            self.acceleration =
                self.acceleration * (1.0 - self.alpha) + raw_acceleration * self.alpha;
        }

        self.last_raw_velocity = raw_velocity;
        self.last_position = position;
        self.last_time_s = Some(time_s);
        self.samples += 1;
        Some(dt)
    }

    pub fn velocity(&self) -> Vector3<f64> {
        self.velocity
    }

    pub fn acceleration(&self) -> Vector3<f64> {
        self.acceleration
    }

    pub fn vertical_rate(&self) -> f64 {
        self.velocity.z
    }

    pub fn vertical_accel(&self) -> f64 {
        self.acceleration.z
    }

    pub fn planar_speed(&self) -> f64 {
        crate::utils::math::planar_speed(&self.velocity)
    }

    /// True once at least one finite difference has been formed
    pub fn primed(&self) -> bool {
        self.samples > 0
    }

    pub fn reset(&mut self) {
        let alpha = self.alpha;
        *self = Self::new(alpha);
    }
}

impl Default for MotionEstimator {
    fn default() -> Self {
        Self::new(0.3)
    }
}
