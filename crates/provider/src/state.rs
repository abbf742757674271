//! Resolved state structures.

use crate::overrides::OverrideRecord;
use foldstate_states::StateId;
use serde::Serialize;

/// The authoritative device state at one point in time.
///
/// Replaced wholesale on every transition, never mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedState {
    pub id: StateId,
    pub timestamp_ms: i64,
}

impl ResolvedState {
    pub fn now(id: StateId) -> Self {
        Self {
            id,
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Read-only view of the provider published after every command.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderSnapshot {
    /// Effective state (override if any, else sensor-driven).
    pub current: ResolvedState,

    /// Sensor-driven state.
    pub base: StateId,

    /// Override currently in effect.
    pub active_override: Option<OverrideRecord>,

    /// Number of pending override records, active one included.
    pub pending_overrides: usize,

    /// States supported in the current environment.
    pub supported: Vec<StateId>,
}

impl ProviderSnapshot {
    pub fn is_overridden(&self) -> bool {
        self.active_override.is_some()
    }
}
