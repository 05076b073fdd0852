use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy)]
struct Target {
    value: f64,
    expires_at_s: Option<f64>,
}

/// A scalar set-point shared between a commander and one control loop.
///
/// Mutated only through the setters; the loop reads it every tick. A target
/// may carry a duration, after which the loop falls back to holding whatever
/// it measures at expiry.
#[derive(Clone)]
pub struct TargetHandle {
    inner: Arc<Mutex<Target>>,
}

impl TargetHandle {
    pub fn new(initial: f64) -> Self {
        assert!(initial.is_finite(), "control target must be finite");
        Self {
            inner: Arc::new(Mutex::new(Target {
                value: initial,
                expires_at_s: None,
            })),
        }
    }

    /// Replace the set-point, clearing any expiry
    pub fn set(&self, value: f64) {
        assert!(value.is_finite(), "control target must be finite");
        let mut target = self.inner.lock().expect("target lock poisoned");
        target.value = value;
        target.expires_at_s = None;
    }

    /// Replace the set-point, valid for `duration_s` of simulated time
    pub fn set_for(&self, value: f64, duration_s: f64, now_s: f64) {
        assert!(value.is_finite(), "control target must be finite");
        assert!(duration_s > 0.0, "target duration must be positive");
        let mut target = self.inner.lock().expect("target lock poisoned");
        target.value = value;
        target.expires_at_s = Some(now_s + duration_s);
    }

    /// Current set-point; once expired, latches onto `fallback`
    pub fn value_or(&self, now_s: f64, fallback: f64) -> f64 {
        let mut target = self.inner.lock().expect("target lock poisoned");
        if let Some(expiry) = target.expires_at_s {
            if now_s >= expiry {
                target.value = fallback;
                target.expires_at_s = None;
            }
        }
        target.value
    }

    pub fn value(&self) -> f64 {
        self.inner.lock().expect("target lock poisoned").value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_set_and_read() {
        let target = TargetHandle::new(0.0);
        target.set(42.0);
        assert_relative_eq!(target.value(), 42.0);
    }

    #[test]
    fn test_expiry_latches_fallback() {
        let target = TargetHandle::new(0.0);
        target.set_for(100.0, 5.0, 10.0);
        assert_relative_eq!(target.value_or(12.0, 33.0), 100.0);
        assert_relative_eq!(target.value_or(15.0, 33.0), 33.0);
        // Latched, not re-evaluated
        assert_relative_eq!(target.value_or(16.0, 99.0), 33.0);
    }

    #[test]
    #[should_panic(expected = "must be finite")]
    fn test_nan_target_panics() {
        let target = TargetHandle::new(0.0);
        target.set(f64::NAN);
    }
}
