//! Thread-safe handle to the device-state provider.

use crate::error::{ProviderError, Result};
use crate::listener::ListenerRef;
use crate::machine::ProviderCore;
use crate::state::{ProviderSnapshot, ResolvedState};
use crate::worker::{self, Command};
use crossbeam_channel::Sender;
use foldstate_sensors::{
    EnvironmentProvider, ForegroundProvider, RequesterToken, SensorSample, SensorSampler,
};
use foldstate_states::{ConfigurationTable, StateId};
use std::sync::{Arc, Mutex};
use std::thread::{JoinHandle, ThreadId};
use std::time::Duration;

/// Default interval between foreground checks for overrides.
pub const DEFAULT_FOREGROUND_CHECK_INTERVAL: Duration = Duration::from_millis(1000);

/// External capabilities the provider depends on.
#[derive(Clone)]
pub struct Capabilities {
    pub sensors: Arc<dyn SensorSampler>,
    pub environment: Arc<dyn EnvironmentProvider>,
    pub foreground: Arc<dyn ForegroundProvider>,
}

/// Provider tuning.
#[derive(Debug, Clone)]
pub struct ProviderOptions {
    /// Interval of the foreground check. `None` disables the tick; checks
    /// then only run through [`StateProvider::check_foreground`].
    pub foreground_check_interval: Option<Duration>,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            foreground_check_interval: Some(DEFAULT_FOREGROUND_CHECK_INTERVAL),
        }
    }
}

struct Inner {
    commands: Sender<Command>,
    published: Arc<Mutex<ProviderSnapshot>>,
    table: Arc<ConfigurationTable>,
    worker: Mutex<Option<JoinHandle<()>>>,
    worker_id: ThreadId,
}

impl Inner {
    fn stop(&self) {
        let _ = self.commands.send(Command::Shutdown);

        let handle = self
            .worker
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            if std::thread::current().id() == self.worker_id {
                // Dropped from a listener; the loop exits on its own.
                return;
            }
            let _ = handle.join();
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Owns the current device state and serializes every mutation.
///
/// Cloning yields another handle to the same provider. The worker thread
/// stops when the last handle is dropped or [`StateProvider::shutdown`] is
/// called. Listeners should not hold a handle themselves, since that keeps
/// the worker alive until an explicit shutdown.
#[derive(Clone)]
pub struct StateProvider {
    inner: Arc<Inner>,
}

impl StateProvider {
    /// Resolve the initial state from the sensors and start the worker.
    pub fn start(
        table: Arc<ConfigurationTable>,
        capabilities: Capabilities,
        options: ProviderOptions,
    ) -> Result<Self> {
        let initial = capabilities.sensors.sample();
        let core = ProviderCore::new(
            Arc::clone(&table),
            initial,
            capabilities.environment,
            capabilities.foreground,
        );
        let published = core.published();

        let (tx, rx) = crossbeam_channel::unbounded::<Command>();
        let interval = options.foreground_check_interval;
        let handle = std::thread::Builder::new()
            .name("device-state".to_string())
            .spawn(move || worker::run(core, rx, interval))?;
        let worker_id = handle.thread().id();

        Ok(Self {
            inner: Arc::new(Inner {
                commands: tx,
                published,
                table,
                worker: Mutex::new(Some(handle)),
                worker_id,
            }),
        })
    }

    /// Feed a new sensor sample. Resolution happens on the provider thread.
    pub fn on_sensor_sample(&self, sample: SensorSample) {
        self.send(Command::Sample(sample));
    }

    /// Register a listener. It sees every transition after commands already
    /// enqueued.
    pub fn add_listener(&self, listener: ListenerRef) {
        self.send(Command::AddListener(listener));
    }

    /// Force `state` until cancelled or pre-empted.
    ///
    /// # Errors
    ///
    /// Fails without changing state if the id is unknown, the state is not
    /// supported in the current environment, or the sensor-driven state
    /// cancels override requests.
    pub fn request_override(&self, state: StateId, token: RequesterToken) -> Result<()> {
        if !self.inner.table.contains(state) {
            return Err(ProviderError::UnknownState(state));
        }
        self.call(|reply| Command::RequestOverride {
            state,
            token,
            reply,
        })?
    }

    /// Remove the override held by `token`. Returns whether one existed.
    pub fn cancel_override(&self, token: RequesterToken) -> Result<bool> {
        self.call(|reply| Command::CancelOverride { token, reply })
    }

    /// Effective state id. Never blocks on the worker.
    pub fn get_state(&self) -> StateId {
        self.current_state().id
    }

    pub fn current_state(&self) -> ResolvedState {
        self.lock_published().current
    }

    pub fn snapshot(&self) -> ProviderSnapshot {
        self.lock_published().clone()
    }

    pub fn table(&self) -> &ConfigurationTable {
        &self.inner.table
    }

    /// Re-read the environment (external displays, power save, thermal).
    pub fn notify_environment_changed(&self) {
        self.send(Command::EnvironmentChanged);
    }

    /// Run the override foreground check now.
    pub fn check_foreground(&self) {
        self.send(Command::CheckForeground);
    }

    /// Block until every command enqueued before this call has run.
    pub fn flush(&self) -> Result<()> {
        self.call(Command::Flush)
    }

    /// Stop the worker thread. Later requests fail with `Shutdown`.
    pub fn shutdown(&self) {
        self.inner.stop();
    }

    fn lock_published(&self) -> std::sync::MutexGuard<'_, ProviderSnapshot> {
        self.inner
            .published
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    fn send(&self, command: Command) {
        if self.inner.commands.send(command).is_err() {
            tracing::warn!("device state provider is shut down, dropping command");
        }
    }

    fn call<T, F>(&self, make: F) -> Result<T>
    where
        F: FnOnce(Sender<T>) -> Command,
    {
        if std::thread::current().id() == self.inner.worker_id {
            return Err(ProviderError::Reentrant);
        }

        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        self.inner
            .commands
            .send(make(reply_tx))
            .map_err(|_| ProviderError::Shutdown)?;
        reply_rx.recv().map_err(|_| ProviderError::Shutdown)
    }
}
