//! Device-state configurations and resolution.
//!
//! A device state is a discrete platform-wide posture (closed, half-opened,
//! opened, rear display, ...). Each state is described by a
//! [`StateConfiguration`] carrying flags plus an activation and an
//! availability predicate. An ordered [`ConfigurationTable`] defines priority,
//! and [`resolve`] picks the first eligible configuration for a sensor sample.
//!
//! Everything here is pure: no threads, no I/O, no clocks.

mod config;
mod error;
mod flags;
mod reason;
mod resolver;
mod table;

pub use config::{
    ActivePredicate, AvailabilityPredicate, StateConfiguration, StateConfigurationBuilder,
};
pub use error::{ConfigError, Result};
pub use flags::StateFlags;
pub use reason::SupportedStatesReason;
pub use resolver::{is_supported, resolve, supported_states};
pub use table::ConfigurationTable;

/// Identifier of a device state.
pub type StateId = u32;

/// Largest identifier accepted in a configuration table.
pub const MAX_STATE_ID: StateId = 10_000;
