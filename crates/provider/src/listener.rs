//! Listener interface for state-change notifications.

use foldstate_states::{StateId, SupportedStatesReason};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A single change of the effective device state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    /// Effective state before the change.
    pub previous: StateId,
    /// Effective state after the change.
    pub state: StateId,
    /// Sensor-driven state at the time of the change.
    pub base: StateId,
    /// Whether `state` comes from an override request.
    pub overridden: bool,
    pub timestamp_ms: i64,
}

/// Receives device-state notifications.
///
/// Callbacks run synchronously on the provider thread, in registration
/// order. They must return quickly and must not call blocking provider
/// methods (those fail with `ProviderError::Reentrant`).
pub trait DeviceStateListener: Send + Sync {
    /// The effective device state changed to `state`.
    fn on_state_changed(&self, state: StateId);

    /// Full transition details. Defaults to [`Self::on_state_changed`].
    fn on_transition(&self, transition: &StateTransition) {
        self.on_state_changed(transition.state);
    }

    /// The set of supported states changed.
    fn on_supported_states_changed(&self, _states: &[StateId], _reason: SupportedStatesReason) {}
}

/// Type alias for shared listener reference.
pub type ListenerRef = Arc<dyn DeviceStateListener>;

impl<F> DeviceStateListener for F
where
    F: Fn(StateId) + Send + Sync,
{
    fn on_state_changed(&self, state: StateId) {
        self(state)
    }
}
