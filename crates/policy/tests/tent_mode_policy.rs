//! Integration tests for the tent-mode policy.
//!
//! Samples are pushed by hand (polling disabled) unless a test exercises the
//! poller wiring explicitly.

use foldstate_events::{
    event_names, DeviceStateChangedEvent, InMemoryEventBus, SupportedStatesChangedEvent,
};
use foldstate_policy::device_states::*;
use foldstate_policy::{DeviceStatePolicy, PolicyError, PolicySettings, TentModePolicy};
use foldstate_provider::{Capabilities, ProviderError, StateProvider};
use foldstate_sensors::{
    EnvironmentProvider, ForegroundProvider, RequesterToken, SensorSample, SensorSampler,
};
use foldstate_states::{ConfigError, StateId, SupportedStatesReason};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::{Duration, Instant};

/// Sampler whose angle can be changed from the test thread.
struct ScriptedSampler {
    angle_bits: AtomicU32,
    hall_closed: AtomicBool,
}

impl ScriptedSampler {
    fn new(angle: f32) -> Self {
        Self {
            angle_bits: AtomicU32::new(angle.to_bits()),
            hall_closed: AtomicBool::new(false),
        }
    }

    fn set_angle(&self, angle: f32) {
        self.angle_bits.store(angle.to_bits(), Ordering::SeqCst);
    }
}

impl SensorSampler for ScriptedSampler {
    fn read_hinge_angle(&self) -> f32 {
        f32::from_bits(self.angle_bits.load(Ordering::SeqCst))
    }

    fn read_hall_closed(&self) -> bool {
        self.hall_closed.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
struct TestEnvironment {
    external_display: AtomicBool,
    power_save: AtomicBool,
}

impl EnvironmentProvider for TestEnvironment {
    fn has_no_connected_external_display(&self) -> bool {
        !self.external_display.load(Ordering::SeqCst)
    }

    fn is_power_save_mode(&self) -> bool {
        self.power_save.load(Ordering::SeqCst)
    }
}

struct AlwaysForeground;

impl ForegroundProvider for AlwaysForeground {
    fn is_requester_foreground(&self, _token: RequesterToken) -> bool {
        true
    }
}

struct Harness {
    policy: TentModePolicy,
    sampler: Arc<ScriptedSampler>,
    environment: Arc<TestEnvironment>,
}

impl Harness {
    fn provider(&self) -> &StateProvider {
        self.policy.get_device_state_provider()
    }

    /// Push `angle` and wait for it to be resolved.
    fn feed(&self, angle: f32) -> StateId {
        self.provider().on_sensor_sample(SensorSample::angle(angle));
        self.provider().flush().unwrap();
        self.provider().get_state()
    }
}

fn push_settings() -> PolicySettings {
    PolicySettings {
        sensor_poll_interval_ms: 0,
        foreground_check_interval_ms: 0,
        ..Default::default()
    }
}

fn create_harness(settings: PolicySettings, initial_angle: f32) -> Harness {
    let sampler = Arc::new(ScriptedSampler::new(initial_angle));
    let environment = Arc::new(TestEnvironment::default());
    let policy = TentModePolicy::new(
        settings,
        Capabilities {
            sensors: sampler.clone(),
            environment: environment.clone(),
            foreground: Arc::new(AlwaysForeground),
        },
    )
    .expect("policy starts");
    Harness {
        policy,
        sampler,
        environment,
    }
}

// =============================================================================
// Hysteresis
// =============================================================================

mod hysteresis {
    use super::*;

    #[test]
    fn test_tent_mode_asymmetric_band() {
        let h = create_harness(push_settings(), 180.0);
        assert_eq!(h.provider().get_state(), OPENED);

        assert_eq!(h.feed(3.0), CLOSED);
        assert_eq!(h.feed(80.0), CLOSED, "80 is below the tent switch angle");
        assert_ne!(h.feed(95.0), CLOSED, "95 exceeds the tent switch angle");
    }

    #[test]
    fn test_tent_mode_does_not_enter_closed_above_max() {
        let h = create_harness(push_settings(), 180.0);
        assert_eq!(h.feed(60.0), HALF_OPENED);
        assert_eq!(h.feed(30.0), HALF_OPENED);
        assert_eq!(h.feed(6.0), HALF_OPENED);
        assert_eq!(h.feed(5.0), CLOSED);
    }

    #[test]
    fn test_symmetric_threshold() {
        let settings = PolicySettings {
            close_angle_degrees: 10.0,
            ..push_settings()
        };
        let h = create_harness(settings, 180.0);

        assert_eq!(h.feed(8.0), CLOSED, "closing through 8");
        assert_eq!(h.feed(9.0), CLOSED, "opening back through 9");
        assert_eq!(h.feed(10.5), HALF_OPENED);
        assert_eq!(h.feed(9.0), CLOSED);
    }

    #[test]
    fn test_nan_never_crashes() {
        let h = create_harness(push_settings(), f32::NAN);
        assert_eq!(h.provider().get_state(), OPENED);
        assert_eq!(h.feed(3.0), CLOSED);
        assert_eq!(h.feed(f32::NAN), OPENED);
    }
}

// =============================================================================
// Overrides and availability
// =============================================================================

mod overrides {
    use super::*;

    #[test]
    fn test_rear_display_override_cancelled_by_closing() {
        let h = create_harness(push_settings(), 180.0);
        let token = RequesterToken::new();

        h.provider().request_override(REAR_DISPLAY, token).unwrap();
        assert_eq!(h.provider().get_state(), REAR_DISPLAY);

        // Sensor movement that does not close keeps the override
        assert_eq!(h.feed(100.0), REAR_DISPLAY);

        assert_eq!(h.feed(2.0), CLOSED);
        assert!(!h.provider().snapshot().is_overridden());

        // Reopening returns to sensor-driven state, not the old override
        assert_eq!(h.feed(170.0), OPENED);
    }

    #[test]
    fn test_concurrent_display_gated_by_external_display() {
        let h = create_harness(push_settings(), 180.0);
        h.environment.external_display.store(true, Ordering::SeqCst);
        h.provider().notify_environment_changed();

        let err = h
            .provider()
            .request_override(CONCURRENT_DISPLAY, RequesterToken::new())
            .unwrap_err();
        assert!(matches!(
            err,
            ProviderError::StateNotSupported(CONCURRENT_DISPLAY)
        ));
        assert_eq!(h.provider().get_state(), OPENED);
    }

    #[test]
    fn test_power_save_cancels_active_override() {
        let h = create_harness(push_settings(), 180.0);
        let bus = Arc::new(InMemoryEventBus::new());
        h.policy.attach_event_bus(bus.clone());
        h.provider()
            .request_override(CONCURRENT_DISPLAY, RequesterToken::new())
            .unwrap();
        assert_eq!(h.provider().get_state(), CONCURRENT_DISPLAY);

        h.environment.power_save.store(true, Ordering::SeqCst);
        h.provider().notify_environment_changed();
        h.provider().flush().unwrap();

        assert_eq!(h.provider().get_state(), OPENED);
        let supported = h.provider().snapshot().supported;
        assert_eq!(supported, vec![CLOSED, HALF_OPENED, OPENED]);

        h.environment.power_save.store(false, Ordering::SeqCst);
        h.provider().notify_environment_changed();
        h.provider().flush().unwrap();

        let notified: Vec<SupportedStatesChangedEvent> =
            bus.payloads_for(event_names::SUPPORTED_STATES_CHANGED);
        let all = vec![CLOSED, HALF_OPENED, OPENED, REAR_DISPLAY, CONCURRENT_DISPLAY];
        assert_eq!(
            notified,
            vec![
                SupportedStatesChangedEvent {
                    states: all.clone(),
                    reason: SupportedStatesReason::Initialized,
                },
                SupportedStatesChangedEvent {
                    states: vec![CLOSED, HALF_OPENED, OPENED],
                    reason: SupportedStatesReason::PowerSaveEnabled,
                },
                SupportedStatesChangedEvent {
                    states: all,
                    reason: SupportedStatesReason::PowerSaveDisabled,
                },
            ]
        );

        // The cancelled override does not come back
        assert_eq!(h.provider().get_state(), OPENED);
    }

    #[test]
    fn test_disabled_state_is_unknown() {
        let settings = PolicySettings {
            enable_rear_display: false,
            ..push_settings()
        };
        let h = create_harness(settings, 180.0);
        let err = h
            .provider()
            .request_override(REAR_DISPLAY, RequesterToken::new())
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnknownState(REAR_DISPLAY)));
    }
}

// =============================================================================
// Wiring
// =============================================================================

mod wiring {
    use super::*;

    #[test]
    fn test_event_bus_receives_transitions() {
        let h = create_harness(push_settings(), 180.0);
        let bus = Arc::new(InMemoryEventBus::new());
        h.policy.attach_event_bus(bus.clone());

        h.feed(3.0);
        h.provider()
            .request_override(REAR_DISPLAY, RequesterToken::new())
            .unwrap_err();
        h.feed(120.0);
        h.feed(120.0);

        let changes: Vec<DeviceStateChangedEvent> =
            bus.payloads_for(event_names::DEVICE_STATE_CHANGED);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].state, CLOSED);
        assert_eq!(changes[0].name, "CLOSED");
        assert_eq!(changes[0].previous, Some(OPENED));
        // 120 exceeds the tent switch angle, so CLOSED is left
        assert_eq!(changes[1].state, HALF_OPENED);
        assert_eq!(changes[1].previous, Some(CLOSED));
        assert!(!changes[1].overridden);

        let supported: Vec<SupportedStatesChangedEvent> =
            bus.payloads_for(event_names::SUPPORTED_STATES_CHANGED);
        assert_eq!(supported.len(), 1);
        assert_eq!(supported[0].reason, SupportedStatesReason::Initialized);
    }

    #[test]
    fn test_configure_hook_calls_completion() {
        let h = create_harness(push_settings(), 180.0);
        let (tx, rx) = mpsc::channel();

        h.policy.configure_device_for_state(
            CLOSED,
            Box::new(move || {
                let _ = tx.send(());
            }),
        );

        assert!(rx.recv_timeout(Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn test_poller_feeds_provider() {
        let settings = PolicySettings {
            sensor_poll_interval_ms: 5,
            ..push_settings()
        };
        let h = create_harness(settings, 180.0);
        assert!(h.policy.is_polling());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        h.provider().add_listener(Arc::new(move |state: StateId| {
            seen_clone.lock().unwrap().push(state);
        }));

        h.sampler.set_angle(2.0);

        let deadline = Instant::now() + Duration::from_secs(2);
        while h.provider().get_state() != CLOSED && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(h.provider().get_state(), CLOSED);

        h.provider().flush().unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![CLOSED]);
    }

    #[test]
    fn test_invalid_settings_refuse_to_start() {
        let settings = PolicySettings {
            max_closed_angle_degrees: 120.0,
            ..push_settings()
        };
        let result = TentModePolicy::new(
            settings,
            Capabilities {
                sensors: Arc::new(ScriptedSampler::new(180.0)),
                environment: Arc::new(TestEnvironment::default()),
                foreground: Arc::new(AlwaysForeground),
            },
        );
        assert!(matches!(result, Err(PolicyError::InvalidSettings(_))));
    }

    #[test]
    fn test_config_error_is_surfaced() {
        let err: PolicyError = ConfigError::EmptyTable.into();
        assert!(err.to_string().contains("empty"));
    }
}
