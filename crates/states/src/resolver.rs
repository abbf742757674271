//! State resolution logic.
//!
//! Pure domain logic - no I/O, no threads.

use crate::config::StateConfiguration;
use crate::flags::StateFlags;
use crate::table::ConfigurationTable;
use crate::StateId;
use foldstate_sensors::{EnvironmentSnapshot, SensorSample};

/// Whether a configuration may be entered in the given environment.
///
/// Combines the availability predicate with the power-save and thermal
/// unsupported flags.
pub fn is_supported(config: &StateConfiguration, env: &EnvironmentSnapshot) -> bool {
    if config.has_flag(StateFlags::UNSUPPORTED_WHEN_THERMAL_STATUS_CRITICAL) && env.thermal_critical
    {
        return false;
    }
    if config.has_flag(StateFlags::UNSUPPORTED_WHEN_POWER_SAVE_MODE) && env.power_save_mode {
        return false;
    }
    config.is_available(env)
}

/// Ids of all configurations supported in `env`, in table order.
pub fn supported_states(table: &ConfigurationTable, env: &EnvironmentSnapshot) -> Vec<StateId> {
    table
        .iter()
        .filter(|c| is_supported(c, env))
        .map(StateConfiguration::id)
        .collect()
}

/// Resolve the sensor-driven device state.
///
/// Priority:
/// 1. Table order, earliest first
/// 2. Emulated-only and unsupported configurations are skipped
/// 3. First configuration whose active predicate holds wins
/// 4. No match keeps `previous` (or the fallback if `previous` is unknown)
///
/// When two predicates overlap the earlier entry always wins. The result is
/// always an id present in `table`.
pub fn resolve(
    table: &ConfigurationTable,
    sample: &SensorSample,
    previous: StateId,
    env: &EnvironmentSnapshot,
) -> StateId {
    for config in table.iter() {
        if config.has_flag(StateFlags::EMULATED_ONLY) || !is_supported(config, env) {
            continue;
        }
        if config.is_active(sample, previous) {
            return config.id();
        }
    }

    // Only reachable if the fallback's own predicates fail, which a validated
    // table rules out.
    if table.contains(previous) {
        previous
    } else {
        table.fallback().id()
    }
}
