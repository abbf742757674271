//! Foldable device-state policy.
//!
//! Composition root of the device-state engine: builds the concrete
//! configuration table from device thresholds, starts a
//! [`StateProvider`](foldstate_provider::StateProvider) on the supplied
//! capabilities, and wires sensor polling into it.
//!
//! # Example
//!
//! ```ignore
//! use foldstate_policy::{DeviceStatePolicy, PolicySettings, TentModePolicy};
//!
//! let policy = TentModePolicy::new(PolicySettings::default(), capabilities)?;
//! let provider = policy.get_device_state_provider();
//! println!("current state: {}", provider.get_state());
//! ```

mod bridge;
mod error;
mod policy;
mod settings;
mod tent_mode;

pub use bridge::EventBusListener;
pub use error::{PolicyError, Result};
pub use policy::{ConfigureCallback, DeviceStatePolicy};
pub use settings::{
    PolicySettings, DEFAULT_HALF_OPENED_MAX_ANGLE_DEGREES, DEFAULT_MAX_CLOSED_ANGLE_DEGREES,
    DEFAULT_TENT_MODE_SWITCH_ANGLE_DEGREES,
};
pub use tent_mode::{build_table, device_states, TentModePolicy};
