//! Device-specific policy settings.

use crate::error::{PolicyError, Result};
use serde::{Deserialize, Serialize};

/// Angle below which the device always counts as closed in tent mode.
pub const DEFAULT_MAX_CLOSED_ANGLE_DEGREES: f32 = 5.0;

/// Angle a closed device must exceed before leaving CLOSED in tent mode.
pub const DEFAULT_TENT_MODE_SWITCH_ANGLE_DEGREES: f32 = 90.0;

/// Upper bound of the half-opened posture.
pub const DEFAULT_HALF_OPENED_MAX_ANGLE_DEGREES: f32 = 130.0;

/// Thresholds and feature switches for the tent-mode policy.
///
/// All fields have defaults, so `{}` is a valid configuration (tent mode,
/// all emulated states enabled).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicySettings {
    /// Symmetric close threshold. `0` selects tent-mode hysteresis.
    #[serde(default)]
    pub close_angle_degrees: f32,

    /// Lower bound of the symmetric closed band.
    ///
    /// Angles below it match neither CLOSED nor HALF_OPENED and resolve to
    /// the OPENED fallback. Leave at `0` unless the hinge sensor reports
    /// spurious near-zero readings while open.
    #[serde(default)]
    pub min_closed_angle_degrees: f32,

    /// Tent mode: enter CLOSED at or below this angle.
    #[serde(default = "default_max_closed_angle")]
    pub max_closed_angle_degrees: f32,

    /// Tent mode: leave CLOSED only above this angle.
    #[serde(default = "default_tent_mode_switch_angle")]
    pub tent_mode_switch_angle_degrees: f32,

    #[serde(default = "default_half_opened_max_angle")]
    pub half_opened_max_angle_degrees: f32,

    /// Offer the emulated rear-display state.
    #[serde(default = "default_true")]
    pub enable_rear_display: bool,

    /// Offer the emulated concurrent-display state.
    #[serde(default = "default_true")]
    pub enable_concurrent_display: bool,

    /// Foreground check period for overrides. `0` disables the tick.
    #[serde(default = "default_foreground_check_interval_ms")]
    pub foreground_check_interval_ms: u64,

    /// Sensor polling period. `0` means samples are pushed by the caller.
    #[serde(default = "default_sensor_poll_interval_ms")]
    pub sensor_poll_interval_ms: u64,
}

fn default_max_closed_angle() -> f32 {
    DEFAULT_MAX_CLOSED_ANGLE_DEGREES
}

fn default_tent_mode_switch_angle() -> f32 {
    DEFAULT_TENT_MODE_SWITCH_ANGLE_DEGREES
}

fn default_half_opened_max_angle() -> f32 {
    DEFAULT_HALF_OPENED_MAX_ANGLE_DEGREES
}

fn default_true() -> bool {
    true
}

fn default_foreground_check_interval_ms() -> u64 {
    1000
}

fn default_sensor_poll_interval_ms() -> u64 {
    50
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            close_angle_degrees: 0.0,
            min_closed_angle_degrees: 0.0,
            max_closed_angle_degrees: default_max_closed_angle(),
            tent_mode_switch_angle_degrees: default_tent_mode_switch_angle(),
            half_opened_max_angle_degrees: default_half_opened_max_angle(),
            enable_rear_display: true,
            enable_concurrent_display: true,
            foreground_check_interval_ms: default_foreground_check_interval_ms(),
            sensor_poll_interval_ms: default_sensor_poll_interval_ms(),
        }
    }
}

impl PolicySettings {
    /// Parse and validate settings from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Whether the closed state uses the asymmetric tent-mode band.
    pub fn uses_tent_mode(&self) -> bool {
        self.close_angle_degrees <= 0.0
    }

    /// Angle at or below which a sample can count as closed.
    pub fn closed_threshold(&self) -> f32 {
        if self.uses_tent_mode() {
            self.max_closed_angle_degrees
        } else {
            self.close_angle_degrees
        }
    }

    pub fn validate(&self) -> Result<()> {
        let angles = [
            ("close_angle_degrees", self.close_angle_degrees),
            ("min_closed_angle_degrees", self.min_closed_angle_degrees),
            ("max_closed_angle_degrees", self.max_closed_angle_degrees),
            (
                "tent_mode_switch_angle_degrees",
                self.tent_mode_switch_angle_degrees,
            ),
            (
                "half_opened_max_angle_degrees",
                self.half_opened_max_angle_degrees,
            ),
        ];
        for (field, value) in angles {
            if !value.is_finite() || !(0.0..360.0).contains(&value) {
                return Err(invalid(format!("{field} must be in [0, 360), got {value}")));
            }
        }

        if self.uses_tent_mode() {
            if self.max_closed_angle_degrees >= self.tent_mode_switch_angle_degrees {
                return Err(invalid(format!(
                    "max_closed_angle_degrees ({}) must be below tent_mode_switch_angle_degrees ({})",
                    self.max_closed_angle_degrees, self.tent_mode_switch_angle_degrees
                )));
            }
        } else if self.min_closed_angle_degrees > self.close_angle_degrees {
            return Err(invalid(format!(
                "min_closed_angle_degrees ({}) exceeds close_angle_degrees ({})",
                self.min_closed_angle_degrees, self.close_angle_degrees
            )));
        }

        if self.closed_threshold() >= self.half_opened_max_angle_degrees {
            return Err(invalid(format!(
                "closed threshold ({}) must be below half_opened_max_angle_degrees ({})",
                self.closed_threshold(),
                self.half_opened_max_angle_degrees
            )));
        }

        Ok(())
    }
}

fn invalid(message: String) -> PolicyError {
    PolicyError::InvalidSettings(message)
}
