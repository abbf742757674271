//! Why the set of supported device states changed.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportedStatesReason {
    /// First report after the provider starts.
    Initialized,
    ThermalCritical,
    ThermalNormal,
    PowerSaveEnabled,
    PowerSaveDisabled,
    ExternalDisplayChanged,
}

impl SupportedStatesReason {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Initialized => "initialized",
            Self::ThermalCritical => "thermal_critical",
            Self::ThermalNormal => "thermal_normal",
            Self::PowerSaveEnabled => "power_save_enabled",
            Self::PowerSaveDisabled => "power_save_disabled",
            Self::ExternalDisplayChanged => "external_display_changed",
        }
    }
}

impl std::fmt::Display for SupportedStatesReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
