//! Error types for the state provider.

use foldstate_states::StateId;
use thiserror::Error;

/// Result type for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Requested state id is not in the configuration table.
    #[error("unknown device state {0}")]
    UnknownState(StateId),

    /// Requested state is unavailable in the current environment.
    #[error("device state {0} is not supported right now")]
    StateNotSupported(StateId),

    /// The current sensor-driven state cancels override requests.
    #[error("override requests are blocked while in device state {current}")]
    OverrideBlocked { current: StateId },

    /// A blocking request was made from the provider's own thread.
    #[error("provider request issued from within a listener callback")]
    Reentrant,

    /// The provider worker has stopped.
    #[error("device state provider is shut down")]
    Shutdown,

    #[error("failed to spawn provider worker: {0}")]
    Spawn(#[from] std::io::Error),
}
