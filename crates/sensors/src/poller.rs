//! Sensor poller - background thread that samples polled fold sensors.

use crate::provider::SensorSampler;
use crate::sample::SensorSample;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default polling interval for fold sensors.
pub const DEFAULT_SENSOR_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Callback type for sensor samples.
pub type SampleCallback = Arc<dyn Fn(SensorSample) + Send + Sync + 'static>;

/// Background poller delivering a sample whenever the readings change.
pub struct SensorPoller {
    running: Arc<AtomicBool>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl Default for SensorPoller {
    fn default() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }
}

impl SensorPoller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start polling with the given sampler and callback.
    pub fn start<S>(&mut self, sampler: Arc<S>, callback: SampleCallback)
    where
        S: SensorSampler + ?Sized + 'static,
    {
        self.start_with_interval(sampler, callback, DEFAULT_SENSOR_POLL_INTERVAL);
    }

    /// Start polling with a custom interval.
    pub fn start_with_interval<S>(
        &mut self,
        sampler: Arc<S>,
        callback: SampleCallback,
        interval: Duration,
    ) where
        S: SensorSampler + ?Sized + 'static,
    {
        if self.running.load(Ordering::SeqCst) {
            tracing::warn!("SensorPoller already running");
            return;
        }

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);

        let handle = std::thread::spawn(move || {
            tracing::info!("SensorPoller started with interval {:?}", interval);

            let mut last: Option<SensorSample> = None;

            while running.load(Ordering::SeqCst) {
                let sample = sampler.sample();

                // Only deliver if a reading changed
                let should_emit = match &last {
                    None => true,
                    Some(prev) => !prev.same_reading(&sample),
                };

                if should_emit {
                    tracing::trace!(
                        angle = sample.hinge_angle_degrees,
                        hall_closed = sample.hall_closed,
                        "sensor sample changed"
                    );
                    callback(sample);
                    last = Some(sample);
                }

                std::thread::sleep(interval);
            }

            tracing::info!("SensorPoller stopped");
        });

        self.handle = Some(handle);
    }

    /// Stop the poller.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Check if the poller is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for SensorPoller {
    fn drop(&mut self) {
        self.stop();
    }
}
