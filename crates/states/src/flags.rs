use bitflags::bitflags;

bitflags! {
    /// Independent modifiers on a device state.
    ///
    /// Flags alter eligibility and override behaviour, never identity.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StateFlags: u32 {
        /// Entering this state cancels all pending override requests.
        const CANCEL_OVERRIDE_REQUESTS = 1 << 0;
        /// Apps cannot be shown while in this state (e.g. inner display off).
        const APP_INACCESSIBLE = 1 << 1;
        /// Never resolved from sensors, reachable only by override.
        const EMULATED_ONLY = 1 << 2;
        /// Override is dropped once the requester leaves the foreground.
        const CANCEL_WHEN_REQUESTER_NOT_ON_TOP = 1 << 3;
        /// Unsupported while thermal status is critical.
        const UNSUPPORTED_WHEN_THERMAL_STATUS_CRITICAL = 1 << 4;
        /// Unsupported while battery saver is on.
        const UNSUPPORTED_WHEN_POWER_SAVE_MODE = 1 << 5;
    }
}

impl StateFlags {
    /// Flags that make a state depend on the environment beyond its
    /// availability predicate.
    pub fn environment_sensitive(&self) -> bool {
        self.intersects(
            Self::UNSUPPORTED_WHEN_THERMAL_STATUS_CRITICAL | Self::UNSUPPORTED_WHEN_POWER_SAVE_MODE,
        )
    }
}
