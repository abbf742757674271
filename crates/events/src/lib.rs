//! Shared event contracts for device-state notifications.
//!
//! This crate defines the DTOs published when the resolved device state or
//! the set of supported states changes. Display and window management
//! consume these through an [`EventBus`], so field names are fixed here.

mod bus;

pub use bus::{emit_event, EmittedEvent, EventBus, EventBusRef, InMemoryEventBus, NullEventBus};

use foldstate_states::{StateId, SupportedStatesReason};
use serde::{Deserialize, Serialize};

/// Event emitted when the effective device state changes.
///
/// Producers: policy (event bus listener)
/// Consumers: display manager, window manager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceStateChangedEvent {
    /// New effective state id.
    pub state: StateId,
    /// Label of the new state.
    pub name: String,
    /// Effective state before the transition.
    #[serde(default)]
    pub previous: Option<StateId>,
    /// Whether the new state comes from an override request.
    #[serde(default)]
    pub overridden: bool,
    /// Timestamp in milliseconds.
    #[serde(default)]
    pub timestamp_ms: i64,
}

/// Event emitted when the set of supported states changes.
///
/// Producers: policy (event bus listener)
/// Consumers: settings UI, display manager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportedStatesChangedEvent {
    /// Supported state ids, in priority order.
    pub states: Vec<StateId>,
    /// Why the set changed.
    pub reason: SupportedStatesReason,
}

/// Event names as constants to prevent typos.
pub mod event_names {
    /// Effective device state changed.
    pub const DEVICE_STATE_CHANGED: &str = "device_state:changed";
    /// Supported device states changed.
    pub const SUPPORTED_STATES_CHANGED: &str = "device_state:supported_changed";
}
