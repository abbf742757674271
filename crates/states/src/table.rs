//! Ordered, validated configuration table.

use crate::config::StateConfiguration;
use crate::error::{ConfigError, Result};
use crate::{StateId, MAX_STATE_ID};
use std::collections::HashMap;

/// Ordered set of device-state configurations.
///
/// Table order is priority: earlier entries win. A table always holds at
/// least one fallback configuration (see [`StateConfiguration::is_fallback`]),
/// so sensor-driven resolution is total.
#[derive(Debug, Clone)]
pub struct ConfigurationTable {
    configs: Vec<StateConfiguration>,
    fallback: usize,
}

impl ConfigurationTable {
    pub fn new(configs: Vec<StateConfiguration>) -> Result<Self> {
        if configs.is_empty() {
            return Err(ConfigError::EmptyTable);
        }

        let mut seen: HashMap<StateId, &str> = HashMap::with_capacity(configs.len());
        for config in &configs {
            if config.id() > MAX_STATE_ID {
                return Err(ConfigError::InvalidId {
                    id: config.id(),
                    max: MAX_STATE_ID,
                });
            }
            if let Some(first) = seen.insert(config.id(), config.name()) {
                return Err(ConfigError::DuplicateId {
                    id: config.id(),
                    first: first.to_string(),
                    second: config.name().to_string(),
                });
            }
        }

        let fallback = configs
            .iter()
            .position(StateConfiguration::is_fallback)
            .ok_or(ConfigError::NoFallback)?;

        tracing::debug!(
            states = configs.len(),
            fallback = configs[fallback].id(),
            "configuration table built"
        );

        Ok(Self { configs, fallback })
    }

    pub fn get(&self, id: StateId) -> Option<&StateConfiguration> {
        self.configs.iter().find(|c| c.id() == id)
    }

    pub fn contains(&self, id: StateId) -> bool {
        self.get(id).is_some()
    }

    /// Configurations in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &StateConfiguration> {
        self.configs.iter()
    }

    pub fn ids(&self) -> Vec<StateId> {
        self.configs.iter().map(StateConfiguration::id).collect()
    }

    /// The highest-priority always-matching configuration.
    pub fn fallback(&self) -> &StateConfiguration {
        &self.configs[self.fallback]
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Display label for an id, or `"UNKNOWN"`.
    pub fn name_of(&self, id: StateId) -> &str {
        self.get(id).map(StateConfiguration::name).unwrap_or("UNKNOWN")
    }
}
