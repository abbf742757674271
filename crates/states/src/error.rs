//! Error types for configuration tables.

use crate::StateId;
use thiserror::Error;

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors detected while building a configuration table.
///
/// All of these are fatal: a policy must not start with a malformed table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Table has no configurations.
    #[error("configuration table is empty")]
    EmptyTable,

    /// Two configurations share an id.
    #[error("duplicate device state id {id} ('{first}' and '{second}')")]
    DuplicateId {
        id: StateId,
        first: String,
        second: String,
    },

    /// Id exceeds the supported range.
    #[error("device state id {id} exceeds maximum {max}")]
    InvalidId { id: StateId, max: StateId },

    /// No configuration is guaranteed to match.
    #[error("no always-active fallback configuration in table")]
    NoFallback,
}
