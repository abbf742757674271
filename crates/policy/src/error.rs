//! Error types for policy construction.

use foldstate_provider::ProviderError;
use foldstate_states::ConfigError;
use thiserror::Error;

/// Result type for policy operations.
pub type Result<T> = std::result::Result<T, PolicyError>;

/// Errors that prevent a policy from starting.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Settings are inconsistent (e.g. overlapping angle thresholds).
    #[error("invalid policy settings: {0}")]
    InvalidSettings(String),

    /// Settings JSON could not be parsed.
    #[error("failed to parse policy settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}
