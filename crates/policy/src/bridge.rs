//! Forwards provider notifications onto an event bus.

use foldstate_events::{
    emit_event, event_names, DeviceStateChangedEvent, EventBusRef, SupportedStatesChangedEvent,
};
use foldstate_provider::{DeviceStateListener, StateTransition};
use foldstate_states::{ConfigurationTable, StateId, SupportedStatesReason};
use std::sync::Arc;

/// Listener that publishes state changes as JSON events.
pub struct EventBusListener {
    bus: EventBusRef,
    table: Arc<ConfigurationTable>,
}

impl EventBusListener {
    pub fn new(bus: EventBusRef, table: Arc<ConfigurationTable>) -> Self {
        Self { bus, table }
    }
}

impl DeviceStateListener for EventBusListener {
    /// Direct calls carry no transition context, so `previous` is unset.
    fn on_state_changed(&self, state: StateId) {
        let event = DeviceStateChangedEvent {
            state,
            name: self.table.name_of(state).to_string(),
            previous: None,
            overridden: false,
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
        };
        emit_event(self.bus.as_ref(), event_names::DEVICE_STATE_CHANGED, &event);
    }

    fn on_transition(&self, transition: &StateTransition) {
        let event = DeviceStateChangedEvent {
            state: transition.state,
            name: self.table.name_of(transition.state).to_string(),
            previous: Some(transition.previous),
            overridden: transition.overridden,
            timestamp_ms: transition.timestamp_ms,
        };
        emit_event(self.bus.as_ref(), event_names::DEVICE_STATE_CHANGED, &event);
    }

    fn on_supported_states_changed(&self, states: &[StateId], reason: SupportedStatesReason) {
        let event = SupportedStatesChangedEvent {
            states: states.to_vec(),
            reason,
        };
        emit_event(
            self.bus.as_ref(),
            event_names::SUPPORTED_STATES_CHANGED,
            &event,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::PolicySettings;
    use crate::tent_mode::{build_table, device_states::*};
    use foldstate_events::InMemoryEventBus;

    fn create_listener() -> (Arc<InMemoryEventBus>, EventBusListener) {
        let bus = Arc::new(InMemoryEventBus::new());
        let table = Arc::new(build_table(&PolicySettings::default()).unwrap());
        (bus.clone(), EventBusListener::new(bus, table))
    }

    #[test]
    fn test_direct_state_change_is_timestamped() {
        let (bus, listener) = create_listener();
        let before = chrono::Utc::now().timestamp_millis();

        listener.on_state_changed(HALF_OPENED);

        let events: Vec<DeviceStateChangedEvent> =
            bus.payloads_for(event_names::DEVICE_STATE_CHANGED);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "HALF_OPENED");
        assert_eq!(events[0].previous, None);
        assert!(events[0].timestamp_ms >= before);
    }

    #[test]
    fn test_transition_keeps_provider_timestamp() {
        let (bus, listener) = create_listener();

        listener.on_transition(&StateTransition {
            previous: OPENED,
            state: CLOSED,
            base: CLOSED,
            overridden: false,
            timestamp_ms: 42,
        });

        let events: Vec<DeviceStateChangedEvent> =
            bus.payloads_for(event_names::DEVICE_STATE_CHANGED);
        assert_eq!(events[0].previous, Some(OPENED));
        assert_eq!(events[0].timestamp_ms, 42);
    }
}
