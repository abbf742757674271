//! Single-threaded provider state machine.
//!
//! `ProviderCore` owns every piece of mutable provider state. It is driven
//! exclusively by the worker thread, so nothing here locks except the
//! published snapshot.

use crate::error::{ProviderError, Result};
use crate::listener::{ListenerRef, StateTransition};
use crate::overrides::{OverrideRecord, OverrideTable};
use crate::state::{ProviderSnapshot, ResolvedState};
use foldstate_sensors::{
    EnvironmentProvider, EnvironmentSnapshot, ForegroundProvider, RequesterToken, SensorSample,
};
use foldstate_states::{
    is_supported, resolve, supported_states, ConfigurationTable, StateFlags, StateId,
    SupportedStatesReason,
};
use std::sync::{Arc, Mutex};

pub struct ProviderCore {
    table: Arc<ConfigurationTable>,
    environment: Arc<dyn EnvironmentProvider>,
    foreground: Arc<dyn ForegroundProvider>,
    listeners: Vec<ListenerRef>,
    env: EnvironmentSnapshot,
    supported: Vec<StateId>,
    last_sample: SensorSample,
    base: StateId,
    overrides: OverrideTable,
    current: ResolvedState,
    published: Arc<Mutex<ProviderSnapshot>>,
}

impl ProviderCore {
    /// Resolve the initial state from the first sample.
    pub fn new(
        table: Arc<ConfigurationTable>,
        initial: SensorSample,
        environment: Arc<dyn EnvironmentProvider>,
        foreground: Arc<dyn ForegroundProvider>,
    ) -> Self {
        let env = environment.snapshot();
        let supported = supported_states(&table, &env);
        let base = resolve(&table, &initial, table.fallback().id(), &env);
        let current = ResolvedState::now(base);

        tracing::info!(
            state = base,
            name = table.name_of(base),
            angle = initial.hinge_angle_degrees,
            "initial device state resolved"
        );

        let published = Arc::new(Mutex::new(ProviderSnapshot {
            current,
            base,
            active_override: None,
            pending_overrides: 0,
            supported: supported.clone(),
        }));

        Self {
            table,
            environment,
            foreground,
            listeners: Vec::new(),
            env,
            supported,
            last_sample: initial,
            base,
            overrides: OverrideTable::new(),
            current,
            published,
        }
    }

    /// Shared handle to the snapshot published after every mutation.
    pub fn published(&self) -> Arc<Mutex<ProviderSnapshot>> {
        Arc::clone(&self.published)
    }

    #[cfg(test)]
    pub fn current(&self) -> ResolvedState {
        self.current
    }

    #[cfg(test)]
    pub fn base(&self) -> StateId {
        self.base
    }

    pub fn add_listener(&mut self, listener: ListenerRef) {
        listener.on_supported_states_changed(&self.supported, SupportedStatesReason::Initialized);
        self.listeners.push(listener);
        tracing::debug!(listeners = self.listeners.len(), "listener registered");
    }

    pub fn on_sensor_sample(&mut self, sample: SensorSample) {
        self.last_sample = sample;
        self.update_base();
        self.publish();
    }

    pub fn request_override(&mut self, state: StateId, token: RequesterToken) -> Result<()> {
        let config = self
            .table
            .get(state)
            .ok_or(ProviderError::UnknownState(state))?;

        if !is_supported(config, &self.env) {
            tracing::warn!(state, name = config.name(), "override rejected: state not supported");
            return Err(ProviderError::StateNotSupported(state));
        }

        if self.base_flags().contains(StateFlags::CANCEL_OVERRIDE_REQUESTS) {
            tracing::warn!(
                state,
                base = self.base,
                "override rejected: current state cancels overrides"
            );
            return Err(ProviderError::OverrideBlocked { current: self.base });
        }

        self.overrides.insert(token, state, config.flags());
        tracing::info!(state, name = config.name(), %token, "override granted");

        self.publish();
        Ok(())
    }

    /// Returns whether `token` had an override.
    pub fn cancel_override(&mut self, token: RequesterToken) -> bool {
        let Some(record) = self.overrides.remove_token(token) else {
            tracing::debug!(%token, "cancel for token without override");
            return false;
        };

        tracing::info!(state = record.state, %token, "override cancelled");
        self.publish();
        true
    }

    /// Drop overrides whose requester left the foreground.
    pub fn check_foreground(&mut self) {
        let foreground = Arc::clone(&self.foreground);
        let dropped = self.overrides.drain_where(|r| {
            r.flags.contains(StateFlags::CANCEL_WHEN_REQUESTER_NOT_ON_TOP)
                && !foreground.is_requester_foreground(r.token)
        });

        if dropped.is_empty() {
            return;
        }
        for record in &dropped {
            tracing::debug!(state = record.state, token = %record.token, "dropping stale override");
        }
        self.publish();
    }

    /// Re-read the environment and re-evaluate support and resolution.
    pub fn on_environment_changed(&mut self) {
        let env = self.environment.snapshot();
        if env == self.env {
            return;
        }

        let reason = change_reason(&self.env, &env);
        self.env = env;
        tracing::info!(%reason, ?env, "environment changed");

        let supported = supported_states(&self.table, &self.env);
        if supported != self.supported {
            self.supported = supported;
            for listener in &self.listeners {
                listener.on_supported_states_changed(&self.supported, reason);
            }
        }

        let table = Arc::clone(&self.table);
        let dropped = self.overrides.drain_where(|r| {
            table
                .get(r.state)
                .map_or(true, |config| !is_supported(config, &env))
        });
        for record in &dropped {
            tracing::info!(state = record.state, token = %record.token, "override cancelled: state no longer supported");
        }

        self.update_base();
        self.publish();
    }

    fn base_flags(&self) -> StateFlags {
        self.table
            .get(self.base)
            .map(|c| c.flags())
            .unwrap_or_default()
    }

    fn update_base(&mut self) {
        let previous = self.base;
        let base = resolve(&self.table, &self.last_sample, previous, &self.env);
        if base == previous {
            return;
        }

        self.base = base;
        tracing::debug!(
            from = previous,
            to = base,
            angle = self.last_sample.hinge_angle_degrees,
            hall_closed = self.last_sample.hall_closed,
            "sensor-driven state changed"
        );

        if self.base_flags().contains(StateFlags::CANCEL_OVERRIDE_REQUESTS) {
            let cancelled = self.overrides.clear();
            if cancelled > 0 {
                tracing::info!(
                    state = base,
                    cancelled,
                    "entered state that cancels override requests"
                );
            }
        }
    }

    fn active_override(&self) -> Option<OverrideRecord> {
        self.overrides.active().copied()
    }

    /// Swap the current state if the effective id changed, notify listeners
    /// in registration order, and refresh the published snapshot.
    fn publish(&mut self) {
        let active = self.active_override();
        let effective = active.map_or(self.base, |r| r.state);

        let transition = if effective != self.current.id {
            let previous = self.current.id;
            self.current = ResolvedState::now(effective);
            Some(StateTransition {
                previous,
                state: effective,
                base: self.base,
                overridden: active.is_some(),
                timestamp_ms: self.current.timestamp_ms,
            })
        } else {
            None
        };

        {
            let mut published = self.published.lock().unwrap_or_else(|e| e.into_inner());
            *published = ProviderSnapshot {
                current: self.current,
                base: self.base,
                active_override: active,
                pending_overrides: self.overrides.len(),
                supported: self.supported.clone(),
            };
        }

        if let Some(transition) = transition {
            tracing::info!(
                from = transition.previous,
                to = transition.state,
                name = self.table.name_of(transition.state),
                overridden = transition.overridden,
                "device state changed"
            );
            for listener in &self.listeners {
                listener.on_transition(&transition);
            }
        }
    }
}

fn change_reason(old: &EnvironmentSnapshot, new: &EnvironmentSnapshot) -> SupportedStatesReason {
    if old.thermal_critical != new.thermal_critical {
        if new.thermal_critical {
            SupportedStatesReason::ThermalCritical
        } else {
            SupportedStatesReason::ThermalNormal
        }
    } else if old.power_save_mode != new.power_save_mode {
        if new.power_save_mode {
            SupportedStatesReason::PowerSaveEnabled
        } else {
            SupportedStatesReason::PowerSaveDisabled
        }
    } else {
        SupportedStatesReason::ExternalDisplayChanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foldstate_states::{AvailabilityPredicate, StateConfiguration};
    use std::sync::atomic::{AtomicBool, Ordering};

    const CLOSED: StateId = 0;
    const HALF_OPENED: StateId = 1;
    const OPENED: StateId = 2;
    const REAR: StateId = 3;
    const CONCURRENT: StateId = 4;

    #[derive(Default)]
    struct TestEnv {
        external_display: AtomicBool,
        thermal_critical: AtomicBool,
    }

    impl EnvironmentProvider for TestEnv {
        fn has_no_connected_external_display(&self) -> bool {
            !self.external_display.load(Ordering::SeqCst)
        }

        fn is_thermal_critical(&self) -> bool {
            self.thermal_critical.load(Ordering::SeqCst)
        }
    }

    struct TestForeground(AtomicBool);

    impl ForegroundProvider for TestForeground {
        fn is_requester_foreground(&self, _token: RequesterToken) -> bool {
            self.0.load(Ordering::SeqCst)
        }
    }

    struct Recorder(Mutex<Vec<StateTransition>>);

    impl crate::DeviceStateListener for Recorder {
        fn on_state_changed(&self, _state: StateId) {}

        fn on_transition(&self, transition: &StateTransition) {
            self.0.lock().unwrap().push(*transition);
        }
    }

    fn table() -> Arc<ConfigurationTable> {
        let emulated = StateFlags::EMULATED_ONLY
            | StateFlags::CANCEL_WHEN_REQUESTER_NOT_ON_TOP
            | StateFlags::UNSUPPORTED_WHEN_THERMAL_STATUS_CRITICAL;
        Arc::new(
            ConfigurationTable::new(vec![
                StateConfiguration::builder(CLOSED, "CLOSED")
                    .flags(StateFlags::CANCEL_OVERRIDE_REQUESTS)
                    .active_when(|s, _| s.valid_angle().is_some_and(|a| a <= 5.0))
                    .build(),
                StateConfiguration::builder(HALF_OPENED, "HALF_OPENED")
                    .active_when(|s, _| s.valid_angle().is_some_and(|a| a <= 130.0))
                    .build(),
                StateConfiguration::builder(OPENED, "OPENED")
                    .always_active()
                    .build(),
                StateConfiguration::builder(REAR, "REAR_DISPLAY")
                    .flags(emulated)
                    .build(),
                StateConfiguration::builder(CONCURRENT, "CONCURRENT_DISPLAY")
                    .flags(emulated)
                    .availability(AvailabilityPredicate::no_external_display())
                    .build(),
            ])
            .unwrap(),
        )
    }

    struct Fixture {
        core: ProviderCore,
        env: Arc<TestEnv>,
        foreground: Arc<TestForeground>,
        recorder: Arc<Recorder>,
    }

    fn fixture(angle: f32) -> Fixture {
        let env = Arc::new(TestEnv::default());
        let foreground = Arc::new(TestForeground(AtomicBool::new(true)));
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        let mut core = ProviderCore::new(
            table(),
            SensorSample::angle(angle),
            env.clone(),
            foreground.clone(),
        );
        core.add_listener(recorder.clone());
        Fixture {
            core,
            env,
            foreground,
            recorder,
        }
    }

    #[test]
    fn test_initial_state_from_first_sample() {
        assert_eq!(fixture(2.0).core.current().id, CLOSED);
        assert_eq!(fixture(90.0).core.current().id, HALF_OPENED);
        assert_eq!(fixture(f32::NAN).core.current().id, OPENED);
    }

    #[test]
    fn test_sample_transition_notifies() {
        let mut f = fixture(180.0);
        f.core.on_sensor_sample(SensorSample::angle(90.0));
        f.core.on_sensor_sample(SensorSample::angle(100.0));

        let transitions = f.recorder.0.lock().unwrap().clone();
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].previous, OPENED);
        assert_eq!(transitions[0].state, HALF_OPENED);
        assert!(!transitions[0].overridden);
    }

    #[test]
    fn test_override_rejections() {
        let mut f = fixture(180.0);
        let token = RequesterToken::new();

        assert!(matches!(
            f.core.request_override(99, token),
            Err(ProviderError::UnknownState(99))
        ));

        f.env.external_display.store(true, Ordering::SeqCst);
        f.core.on_environment_changed();
        assert!(matches!(
            f.core.request_override(CONCURRENT, token),
            Err(ProviderError::StateNotSupported(CONCURRENT))
        ));

        f.core.on_sensor_sample(SensorSample::angle(1.0));
        assert!(matches!(
            f.core.request_override(REAR, token),
            Err(ProviderError::OverrideBlocked { current: CLOSED })
        ));
        assert_eq!(f.core.current().id, CLOSED);
    }

    #[test]
    fn test_override_and_cancel() {
        let mut f = fixture(180.0);
        let token = RequesterToken::new();

        f.core.request_override(REAR, token).unwrap();
        assert_eq!(f.core.current().id, REAR);
        assert_eq!(f.core.base(), OPENED);

        assert!(f.core.cancel_override(token));
        assert!(!f.core.cancel_override(token));
        assert_eq!(f.core.current().id, OPENED);
    }

    #[test]
    fn test_closing_cancels_override() {
        let mut f = fixture(180.0);
        f.core.request_override(REAR, RequesterToken::new()).unwrap();

        f.core.on_sensor_sample(SensorSample::angle(3.0));

        assert_eq!(f.core.current().id, CLOSED);
        let snapshot = f.core.published().lock().unwrap().clone();
        assert!(!snapshot.is_overridden());
        assert_eq!(snapshot.pending_overrides, 0);
    }

    #[test]
    fn test_foreground_check_drops_stale_override() {
        let mut f = fixture(180.0);
        f.core.request_override(REAR, RequesterToken::new()).unwrap();

        f.core.check_foreground();
        assert_eq!(f.core.current().id, REAR);

        f.foreground.0.store(false, Ordering::SeqCst);
        f.core.check_foreground();
        assert_eq!(f.core.current().id, OPENED);
    }

    #[test]
    fn test_thermal_cancels_override() {
        let mut f = fixture(180.0);
        f.core.request_override(REAR, RequesterToken::new()).unwrap();

        f.env.thermal_critical.store(true, Ordering::SeqCst);
        f.core.on_environment_changed();

        assert_eq!(f.core.current().id, OPENED);
        let snapshot = f.core.published().lock().unwrap().clone();
        assert!(!snapshot.supported.contains(&REAR));
    }

    #[test]
    fn test_unchanged_environment_is_noop() {
        let mut f = fixture(180.0);
        f.core.on_environment_changed();
        assert!(f.recorder.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_change_reason() {
        let base = EnvironmentSnapshot::default();
        let hot = EnvironmentSnapshot {
            thermal_critical: true,
            ..base
        };
        let saver = EnvironmentSnapshot {
            power_save_mode: true,
            ..base
        };
        let docked = EnvironmentSnapshot {
            no_external_display: false,
            ..base
        };
        assert_eq!(change_reason(&base, &hot), SupportedStatesReason::ThermalCritical);
        assert_eq!(change_reason(&hot, &base), SupportedStatesReason::ThermalNormal);
        assert_eq!(change_reason(&base, &saver), SupportedStatesReason::PowerSaveEnabled);
        assert_eq!(change_reason(&saver, &base), SupportedStatesReason::PowerSaveDisabled);
        assert_eq!(
            change_reason(&base, &docked),
            SupportedStatesReason::ExternalDisplayChanged
        );
    }
}
