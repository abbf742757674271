//! Event bus abstraction for decoupled notification delivery.
//!
//! The state engine publishes through this trait so it can run headless in
//! tests and be bridged to whatever IPC the host platform uses.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

/// Trait for emitting events to subscribers.
pub trait EventBus: Send + Sync {
    /// Emit an event with a JSON payload.
    ///
    /// # Arguments
    /// * `topic` - Event name (e.g., "device_state:changed")
    /// * `payload` - JSON payload to emit
    fn emit(&self, topic: &str, payload: serde_json::Value);
}

/// Type alias for shared event bus reference.
pub type EventBusRef = Arc<dyn EventBus>;

/// Serialize `event` and emit it on `bus`.
///
/// Serialization failures are logged and the event is dropped.
pub fn emit_event<T: Serialize>(bus: &dyn EventBus, topic: &str, event: &T) {
    match serde_json::to_value(event) {
        Ok(payload) => bus.emit(topic, payload),
        Err(e) => tracing::warn!(topic, error = %e, "failed to serialize event"),
    }
}

/// A captured event from InMemoryEventBus.
#[derive(Debug, Clone)]
pub struct EmittedEvent {
    pub topic: String,
    pub payload: serde_json::Value,
}

/// In-memory event bus for testing.
///
/// Captures all emitted events for later inspection.
#[derive(Default)]
pub struct InMemoryEventBus {
    events: Mutex<Vec<EmittedEvent>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<EmittedEvent>> {
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Get all captured events.
    pub fn events(&self) -> Vec<EmittedEvent> {
        self.lock().clone()
    }

    /// Get events for a specific topic.
    pub fn events_for(&self, topic: &str) -> Vec<EmittedEvent> {
        self.lock()
            .iter()
            .filter(|e| e.topic == topic)
            .cloned()
            .collect()
    }

    /// Decode every payload on `topic` into `T`, skipping malformed ones.
    pub fn payloads_for<T: DeserializeOwned>(&self, topic: &str) -> Vec<T> {
        self.events_for(topic)
            .into_iter()
            .filter_map(|e| serde_json::from_value(e.payload).ok())
            .collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl EventBus for InMemoryEventBus {
    fn emit(&self, topic: &str, payload: serde_json::Value) {
        self.lock().push(EmittedEvent {
            topic: topic.to_string(),
            payload,
        });
    }
}

/// No-op event bus that discards all events.
pub struct NullEventBus;

impl EventBus for NullEventBus {
    fn emit(&self, _topic: &str, _payload: serde_json::Value) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{event_names, DeviceStateChangedEvent};
    use serde_json::json;

    #[test]
    fn test_in_memory_event_bus_filters_topics() {
        let bus = InMemoryEventBus::new();

        bus.emit(event_names::DEVICE_STATE_CHANGED, json!({"state": 0, "name": "CLOSED"}));
        bus.emit(event_names::SUPPORTED_STATES_CHANGED, json!({}));
        bus.emit(event_names::DEVICE_STATE_CHANGED, json!({"state": 2, "name": "OPENED"}));

        assert_eq!(bus.len(), 3);
        assert_eq!(bus.events_for(event_names::DEVICE_STATE_CHANGED).len(), 2);
        assert_eq!(bus.events_for("missing").len(), 0);

        bus.clear();
        assert!(bus.is_empty());
    }

    #[test]
    fn test_emit_event_round_trips_payload() {
        let bus = InMemoryEventBus::new();
        let event = DeviceStateChangedEvent {
            state: 1,
            name: "HALF_OPENED".to_string(),
            previous: Some(2),
            overridden: false,
            timestamp_ms: 42,
        };

        emit_event(&bus, event_names::DEVICE_STATE_CHANGED, &event);

        let decoded: Vec<DeviceStateChangedEvent> =
            bus.payloads_for(event_names::DEVICE_STATE_CHANGED);
        assert_eq!(decoded, vec![event]);
    }

    #[test]
    fn test_null_event_bus() {
        NullEventBus.emit("device_state:changed", json!({"state": 0}));
    }
}
