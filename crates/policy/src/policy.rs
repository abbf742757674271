use foldstate_provider::StateProvider;
use foldstate_states::StateId;

/// Completion callback for [`DeviceStatePolicy::configure_device_for_state`].
pub type ConfigureCallback = Box<dyn FnOnce() + Send + 'static>;

/// Composition root handed to the rest of the platform.
pub trait DeviceStatePolicy: Send + Sync {
    /// Read-only access to the provider owning the current state.
    fn get_device_state_provider(&self) -> &StateProvider;

    /// Apply hardware configuration for `state` (e.g. switch the active
    /// panel), then call `on_complete`.
    ///
    /// Invoked by the policy owner once per transition. Implementations must
    /// always eventually call `on_complete`. The default does nothing else.
    fn configure_device_for_state(&self, _state: StateId, on_complete: ConfigureCallback) {
        on_complete();
    }
}
