//! Device-state provider.
//!
//! Binds sensor samples to the resolver, holds the single current device
//! state, notifies listeners on change, and manages override requests.
//!
//! # Threading
//!
//! All mutation happens on one dedicated worker thread fed by a command
//! channel. Sensor callbacks, override requests from arbitrary threads and
//! the periodic foreground check are queued onto it in arrival order, and
//! listeners are notified synchronously on that thread in registration
//! order.
//!
//! ```text
//! sensor thread ──┐
//! ui thread ──────┼──> command channel ──> worker (ProviderCore) ──> listeners
//! fg tick ────────┘                                │
//!                                                  └──> published snapshot ──> get_state()
//! ```
//!
//! # Example
//!
//! ```ignore
//! use foldstate_provider::{Capabilities, ProviderOptions, StateProvider};
//! use foldstate_sensors::{NullProvider, RequesterToken, SensorSample};
//! use std::sync::Arc;
//!
//! let provider = StateProvider::start(table, Capabilities {
//!     sensors: Arc::new(NullProvider),
//!     environment: Arc::new(NullProvider),
//!     foreground: Arc::new(NullProvider),
//! }, ProviderOptions::default())?;
//!
//! provider.add_listener(Arc::new(|state| println!("state -> {state}")));
//! provider.on_sensor_sample(SensorSample::angle(3.0));
//! provider.request_override(REAR_DISPLAY, RequesterToken::new())?;
//! ```

mod error;
mod listener;
mod machine;
mod overrides;
mod provider;
mod state;
mod worker;

pub use error::{ProviderError, Result};
pub use listener::{DeviceStateListener, ListenerRef, StateTransition};
pub use overrides::OverrideRecord;
pub use provider::{Capabilities, ProviderOptions, StateProvider, DEFAULT_FOREGROUND_CHECK_INTERVAL};
pub use state::{ProviderSnapshot, ResolvedState};
