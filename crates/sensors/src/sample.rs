//! Sensor sample and environment snapshot structures.

use serde::{Deserialize, Serialize};

/// A single reading of the fold sensors.
///
/// Produced on every sensor event and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    /// Hinge angle in degrees, nominally in `[0, 360)`. NaN when unavailable.
    pub hinge_angle_degrees: f32,

    /// Whether the hall-effect sensor reports full mechanical closure.
    pub hall_closed: bool,

    /// Timestamp when the sample was captured
    pub timestamp_ms: i64,
}

impl SensorSample {
    pub fn new(hinge_angle_degrees: f32, hall_closed: bool) -> Self {
        Self {
            hinge_angle_degrees,
            hall_closed,
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Sample with only a hinge angle (hall sensor open).
    pub fn angle(hinge_angle_degrees: f32) -> Self {
        Self::new(hinge_angle_degrees, false)
    }

    /// Returns the hinge angle if it is a usable reading.
    ///
    /// NaN, infinities and values outside `[0, 360)` count as a sensor
    /// anomaly and yield `None`.
    pub fn valid_angle(&self) -> Option<f32> {
        let angle = self.hinge_angle_degrees;
        if angle.is_finite() && (0.0..360.0).contains(&angle) {
            Some(angle)
        } else {
            None
        }
    }

    /// Whether two samples carry the same physical readings, ignoring time.
    pub fn same_reading(&self, other: &SensorSample) -> bool {
        let angles_equal = self.hinge_angle_degrees == other.hinge_angle_degrees
            || (self.hinge_angle_degrees.is_nan() && other.hinge_angle_degrees.is_nan());
        angles_equal && self.hall_closed == other.hall_closed
    }
}

/// Snapshot of the external environment consulted by availability checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentSnapshot {
    /// No external display is currently connected.
    pub no_external_display: bool,

    /// Battery saver is enabled.
    #[serde(default)]
    pub power_save_mode: bool,

    /// Thermal status is at or above critical.
    #[serde(default)]
    pub thermal_critical: bool,
}

impl Default for EnvironmentSnapshot {
    fn default() -> Self {
        Self {
            no_external_display: true,
            power_save_mode: false,
            thermal_critical: false,
        }
    }
}
