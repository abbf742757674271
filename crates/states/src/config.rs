//! Declarative descriptor for a single device state.

use crate::flags::StateFlags;
use crate::StateId;
use foldstate_sensors::{EnvironmentSnapshot, SensorSample};
use std::fmt;
use std::sync::Arc;

type ActiveFn = dyn Fn(&SensorSample, StateId) -> bool + Send + Sync;
type AvailabilityFn = dyn Fn(&EnvironmentSnapshot) -> bool + Send + Sync;

/// Decides whether a configuration is satisfied by a sensor sample.
///
/// Custom predicates receive the sample and the previous sensor-driven state
/// and must treat an unusable angle (see [`SensorSample::valid_angle`]) as
/// "not matched".
#[derive(Clone)]
pub enum ActivePredicate {
    /// Always matches. Used by fallback configurations.
    Always,
    /// Never matches. Used by emulated-only states.
    Never,
    Custom(Arc<ActiveFn>),
}

impl ActivePredicate {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&SensorSample, StateId) -> bool + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    pub fn evaluate(&self, sample: &SensorSample, previous: StateId) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Custom(f) => f(sample, previous),
        }
    }

    pub fn is_always(&self) -> bool {
        matches!(self, Self::Always)
    }
}

impl fmt::Debug for ActivePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => write!(f, "Always"),
            Self::Never => write!(f, "Never"),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Decides whether a configuration may be considered at all, given the
/// external environment.
#[derive(Clone)]
pub enum AvailabilityPredicate {
    Always,
    Custom(Arc<AvailabilityFn>),
}

impl AvailabilityPredicate {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&EnvironmentSnapshot) -> bool + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Available only while no external display is connected.
    pub fn no_external_display() -> Self {
        Self::custom(|env| env.no_external_display)
    }

    pub fn evaluate(&self, env: &EnvironmentSnapshot) -> bool {
        match self {
            Self::Always => true,
            Self::Custom(f) => f(env),
        }
    }

    pub fn is_always(&self) -> bool {
        matches!(self, Self::Always)
    }
}

impl fmt::Debug for AvailabilityPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => write!(f, "Always"),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Immutable description of one device state.
///
/// Equality is by id only; the name is a label.
#[derive(Debug, Clone)]
pub struct StateConfiguration {
    id: StateId,
    name: String,
    flags: StateFlags,
    active: ActivePredicate,
    availability: AvailabilityPredicate,
}

impl StateConfiguration {
    pub fn builder(id: StateId, name: impl Into<String>) -> StateConfigurationBuilder {
        StateConfigurationBuilder {
            id,
            name: name.into(),
            flags: StateFlags::empty(),
            active: ActivePredicate::Never,
            availability: AvailabilityPredicate::Always,
        }
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flags(&self) -> StateFlags {
        self.flags
    }

    pub fn has_flag(&self, flag: StateFlags) -> bool {
        self.flags.contains(flag)
    }

    pub fn is_active(&self, sample: &SensorSample, previous: StateId) -> bool {
        self.active.evaluate(sample, previous)
    }

    pub fn is_available(&self, env: &EnvironmentSnapshot) -> bool {
        self.availability.evaluate(env)
    }

    /// A configuration that matches every sample in every environment.
    pub fn is_fallback(&self) -> bool {
        self.active.is_always()
            && self.availability.is_always()
            && !self.flags.contains(StateFlags::EMULATED_ONLY)
            && !self.flags.environment_sensitive()
    }
}

impl PartialEq for StateConfiguration {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for StateConfiguration {}

impl fmt::Display for StateConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.id)
    }
}

/// Builder for [`StateConfiguration`].
pub struct StateConfigurationBuilder {
    id: StateId,
    name: String,
    flags: StateFlags,
    active: ActivePredicate,
    availability: AvailabilityPredicate,
}

impl StateConfigurationBuilder {
    pub fn flags(mut self, flags: StateFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn active(mut self, predicate: ActivePredicate) -> Self {
        self.active = predicate;
        self
    }

    pub fn active_when<F>(self, f: F) -> Self
    where
        F: Fn(&SensorSample, StateId) -> bool + Send + Sync + 'static,
    {
        self.active(ActivePredicate::custom(f))
    }

    pub fn always_active(self) -> Self {
        self.active(ActivePredicate::Always)
    }

    pub fn availability(mut self, predicate: AvailabilityPredicate) -> Self {
        self.availability = predicate;
        self
    }

    pub fn available_when<F>(self, f: F) -> Self
    where
        F: Fn(&EnvironmentSnapshot) -> bool + Send + Sync + 'static,
    {
        self.availability(AvailabilityPredicate::custom(f))
    }

    pub fn build(self) -> StateConfiguration {
        StateConfiguration {
            id: self.id,
            name: self.name,
            flags: self.flags,
            active: self.active,
            availability: self.availability,
        }
    }
}
