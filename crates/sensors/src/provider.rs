//! Capability traits for sensor, environment and foreground detection.
//!
//! These traits abstract the platform sensor stack,
//! allowing the state engine to remain pure and testable.

use crate::sample::{EnvironmentSnapshot, SensorSample};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identity of a process requesting a device-state override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequesterToken(Uuid);

impl RequesterToken {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RequesterToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequesterToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Provider for fold sensor readings.
pub trait SensorSampler: Send + Sync {
    /// Current hinge angle in degrees, NaN when unavailable.
    fn read_hinge_angle(&self) -> f32;

    /// Whether the hall sensor reports the device fully closed.
    fn read_hall_closed(&self) -> bool;

    /// Read both sensors into a timestamped sample.
    fn sample(&self) -> SensorSample {
        SensorSample::new(self.read_hinge_angle(), self.read_hall_closed())
    }
}

/// Provider for the external environment.
pub trait EnvironmentProvider: Send + Sync {
    /// Check that no external display is connected.
    fn has_no_connected_external_display(&self) -> bool;

    /// Check if battery saver is on.
    fn is_power_save_mode(&self) -> bool {
        false
    }

    /// Check if thermal status is critical or worse.
    fn is_thermal_critical(&self) -> bool {
        false
    }

    fn snapshot(&self) -> EnvironmentSnapshot {
        EnvironmentSnapshot {
            no_external_display: self.has_no_connected_external_display(),
            power_save_mode: self.is_power_save_mode(),
            thermal_critical: self.is_thermal_critical(),
        }
    }
}

/// Provider for foreground status of override requesters.
pub trait ForegroundProvider: Send + Sync {
    /// Whether the process owning `token` is currently on top.
    fn is_requester_foreground(&self, token: RequesterToken) -> bool;
}

/// Null implementation for testing or devices without fold sensors.
///
/// Reports an unavailable hinge angle, an open hall sensor, no external
/// display, and every requester as foreground.
pub struct NullProvider;

impl SensorSampler for NullProvider {
    fn read_hinge_angle(&self) -> f32 {
        f32::NAN
    }

    fn read_hall_closed(&self) -> bool {
        false
    }
}

impl EnvironmentProvider for NullProvider {
    fn has_no_connected_external_display(&self) -> bool {
        true
    }
}

impl ForegroundProvider for NullProvider {
    fn is_requester_foreground(&self, _token: RequesterToken) -> bool {
        true
    }
}
