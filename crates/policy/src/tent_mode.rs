//! Tent-mode device-state policy for foldables with an outer display.
//!
//! Closed-state detection runs in one of two modes:
//!
//! - **Symmetric** (`close_angle_degrees > 0`): closed inside the fixed band
//!   `[min_closed_angle_degrees, close_angle_degrees]`, the same whether the
//!   hinge is closing or opening.
//! - **Tent mode** (`close_angle_degrees == 0`): enter CLOSED only at or
//!   below `max_closed_angle_degrees`, but once closed stay there until the
//!   angle exceeds `tent_mode_switch_angle_degrees`. A device propped up in
//!   a tent or table-top posture keeps the outer display instead of
//!   flickering between CLOSED and HALF_OPENED.
//!
//! A hall sensor reporting closed always yields CLOSED.

use crate::bridge::EventBusListener;
use crate::error::Result;
use crate::policy::DeviceStatePolicy;
use crate::settings::PolicySettings;
use foldstate_events::EventBusRef;
use foldstate_provider::{Capabilities, ProviderOptions, StateProvider};
use foldstate_sensors::{SensorPoller, SensorSample};
use foldstate_states::{
    ActivePredicate, AvailabilityPredicate, ConfigurationTable, StateConfiguration, StateFlags,
    StateId,
};
use std::sync::Arc;
use std::time::Duration;

/// Device state identifiers used by the tent-mode table.
pub mod device_states {
    use foldstate_states::StateId;

    pub const CLOSED: StateId = 0;
    pub const HALF_OPENED: StateId = 1;
    pub const OPENED: StateId = 2;
    pub const REAR_DISPLAY: StateId = 3;
    pub const CONCURRENT_DISPLAY: StateId = 4;
}

use device_states::*;

fn closed_predicate(settings: &PolicySettings) -> ActivePredicate {
    if !settings.uses_tent_mode() {
        let min = settings.min_closed_angle_degrees;
        let max = settings.close_angle_degrees;
        return ActivePredicate::custom(move |sample: &SensorSample, _| {
            sample.hall_closed || sample.valid_angle().is_some_and(|a| a >= min && a <= max)
        });
    }

    let max_closed = settings.max_closed_angle_degrees;
    let switch_angle = settings.tent_mode_switch_angle_degrees;
    ActivePredicate::custom(move |sample: &SensorSample, previous: StateId| {
        if sample.hall_closed {
            return true;
        }
        let Some(angle) = sample.valid_angle() else {
            return false;
        };
        angle <= max_closed || (previous == CLOSED && angle <= switch_angle)
    })
}

fn half_opened_predicate(settings: &PolicySettings) -> ActivePredicate {
    let lower = settings.closed_threshold();
    let upper = settings.half_opened_max_angle_degrees;
    ActivePredicate::custom(move |sample: &SensorSample, _| {
        sample.valid_angle().is_some_and(|a| a > lower && a <= upper)
    })
}

/// Build the ordered configuration table for `settings`.
///
/// Priority: CLOSED, HALF_OPENED, OPENED (fallback), then the emulated-only
/// REAR_DISPLAY and CONCURRENT_DISPLAY states when enabled.
pub fn build_table(settings: &PolicySettings) -> Result<ConfigurationTable> {
    settings.validate()?;

    let emulated = StateFlags::EMULATED_ONLY
        | StateFlags::CANCEL_WHEN_REQUESTER_NOT_ON_TOP
        | StateFlags::UNSUPPORTED_WHEN_THERMAL_STATUS_CRITICAL
        | StateFlags::UNSUPPORTED_WHEN_POWER_SAVE_MODE;

    let mut configs = vec![
        StateConfiguration::builder(CLOSED, "CLOSED")
            .flags(StateFlags::CANCEL_OVERRIDE_REQUESTS)
            .active(closed_predicate(settings))
            .build(),
        StateConfiguration::builder(HALF_OPENED, "HALF_OPENED")
            .active(half_opened_predicate(settings))
            .build(),
        StateConfiguration::builder(OPENED, "OPENED")
            .always_active()
            .build(),
    ];

    if settings.enable_rear_display {
        configs.push(
            StateConfiguration::builder(REAR_DISPLAY, "REAR_DISPLAY")
                .flags(emulated | StateFlags::APP_INACCESSIBLE)
                .build(),
        );
    }

    if settings.enable_concurrent_display {
        configs.push(
            StateConfiguration::builder(CONCURRENT_DISPLAY, "CONCURRENT_DISPLAY")
                .flags(emulated)
                .availability(AvailabilityPredicate::no_external_display())
                .build(),
        );
    }

    Ok(ConfigurationTable::new(configs)?)
}

/// Device-state policy for foldables that support tent/table-top postures.
pub struct TentModePolicy {
    settings: PolicySettings,
    table: Arc<ConfigurationTable>,
    provider: StateProvider,
    poller: SensorPoller,
}

impl TentModePolicy {
    /// Build the table, start the provider, and start sensor polling if
    /// `sensor_poll_interval_ms` is non-zero.
    ///
    /// # Errors
    ///
    /// Fails if the settings are invalid, the table is malformed, or the
    /// provider worker cannot be spawned. A policy that fails here must not
    /// be used.
    pub fn new(settings: PolicySettings, capabilities: Capabilities) -> Result<Self> {
        let table = Arc::new(build_table(&settings)?);

        let options = ProviderOptions {
            foreground_check_interval: (settings.foreground_check_interval_ms > 0)
                .then(|| Duration::from_millis(settings.foreground_check_interval_ms)),
        };
        let sensors = Arc::clone(&capabilities.sensors);
        let provider = StateProvider::start(Arc::clone(&table), capabilities, options)?;

        let mut poller = SensorPoller::new();
        if settings.sensor_poll_interval_ms > 0 {
            let sink = provider.clone();
            poller.start_with_interval(
                sensors,
                Arc::new(move |sample: SensorSample| sink.on_sensor_sample(sample)),
                Duration::from_millis(settings.sensor_poll_interval_ms),
            );
        }

        tracing::info!(
            tent_mode = settings.uses_tent_mode(),
            closed_threshold = settings.closed_threshold(),
            states = ?table.ids(),
            "tent mode policy started"
        );

        Ok(Self {
            settings,
            table,
            provider,
            poller,
        })
    }

    pub fn settings(&self) -> &PolicySettings {
        &self.settings
    }

    pub fn table(&self) -> &Arc<ConfigurationTable> {
        &self.table
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_running()
    }

    /// Publish every state change on `bus`.
    pub fn attach_event_bus(&self, bus: EventBusRef) {
        self.provider
            .add_listener(Arc::new(EventBusListener::new(bus, Arc::clone(&self.table))));
    }
}

impl DeviceStatePolicy for TentModePolicy {
    fn get_device_state_provider(&self) -> &StateProvider {
        &self.provider
    }
}

impl Drop for TentModePolicy {
    fn drop(&mut self) {
        // The poller holds a provider handle; stop it so the worker can exit.
        self.poller.stop();
    }
}
