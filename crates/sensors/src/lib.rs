//! Sensor and environment capabilities for foldstate.
//!
//! This crate describes everything the device-state engine consumes from the
//! outside world. It tracks:
//! - Hinge angle (continuous, may be NaN when the sensor drops out)
//! - Hall sensor (binary full-closure signal)
//! - Environment (external displays, power save, thermal status)
//! - Foreground requesters (for override auto-cancellation)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Domain Layer                             │
//! │  sample.rs   - SensorSample, EnvironmentSnapshot (pure)     │
//! │  provider.rs - Capability traits for sensors and env        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Application Layer                          │
//! │  poller.rs - Background polling and sample delivery         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use foldstate_sensors::{NullProvider, SensorPoller};
//! use std::sync::Arc;
//!
//! let mut poller = SensorPoller::new();
//! poller.start(Arc::new(NullProvider), Arc::new(|sample| {
//!     println!("angle: {}, hall closed: {}", sample.hinge_angle_degrees, sample.hall_closed);
//! }));
//! ```

mod poller;
mod provider;
mod sample;

pub use poller::{SampleCallback, SensorPoller, DEFAULT_SENSOR_POLL_INTERVAL};
pub use provider::{
    EnvironmentProvider, ForegroundProvider, NullProvider, RequesterToken, SensorSampler,
};
pub use sample::{EnvironmentSnapshot, SensorSample};
