use crate::utils::errors::SimError;
use crate::world::clock::TimeScale;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Floor on the time ratio when scaling sleep periods, so a misconfigured
/// ratio cannot stretch a period toward infinity
const MIN_RATIO: f64 = 1e-3;

/// Spawn one periodic control loop on its own thread.
///
/// The loop sleeps `period / time_scale` between ticks and runs until the
/// shutdown channel is signalled or dropped. A tick that returns an error is
/// logged and skipped; the next scheduled tick is the retry. The error
/// policy lives here, with the scheduler, not inside the loops.
pub fn spawn_periodic<F>(
    name: String,
    period: Duration,
    time_scale: Arc<TimeScale>,
    shutdown: Receiver<()>,
    mut tick: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Result<(), SimError> + Send + 'static,
{
    let thread_name = name.clone();
    thread::Builder::new()
        .name(thread_name)
        .spawn(move || {
            loop {
                let scaled = period.div_f64(time_scale.get().max(MIN_RATIO));
                match shutdown.recv_timeout(scaled) {
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {
                        if let Err(err) = tick() {
                            tracing::warn!(%name, %err, "tick failed, skipping");
                        }
                    }
                }
            }
            tracing::debug!(%name, "loop stopped");
        })
        .expect("failed to spawn control loop thread")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_loop_ticks_until_shutdown() {
        let (tx, rx) = unbounded();
        let scale = Arc::new(TimeScale::new(1.0));
        let count = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&count);

        let handle = spawn_periodic(
            "test-loop".into(),
            Duration::from_millis(1),
            scale,
            rx,
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        );

        std::thread::sleep(Duration::from_millis(50));
        drop(tx);
        handle.join().unwrap();
        assert!(count.load(Ordering::SeqCst) > 0);
    }

    #[test]
    fn test_failed_tick_does_not_kill_loop() {
        let (tx, rx) = unbounded();
        let scale = Arc::new(TimeScale::new(1.0));
        let count = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&count);

        let handle = spawn_periodic(
            "flaky-loop".into(),
            Duration::from_millis(1),
            scale,
            rx,
            move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                if n % 2 == 0 {
                    Err(SimError::TransientRead("pose unavailable".into()))
                } else {
                    Ok(())
                }
            },
        );

        std::thread::sleep(Duration::from_millis(50));
        drop(tx);
        handle.join().unwrap();
        // Failures were logged and skipped, not fatal
        assert!(count.load(Ordering::SeqCst) > 2);
    }
}
