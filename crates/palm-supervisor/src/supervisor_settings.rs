use std::time::Duration;

use palm_config::{DEFAULT_IDLE_WAKE_SECS, DEFAULT_POLL_INTERVAL_MS, SupervisorConfig};

/// Timing of one task tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorSettings {
    /// Sleep between two status poll cycles
    pub poll_interval: Duration,
    /// Wake-up period of the idle scope
    pub idle_wake: Duration,
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            idle_wake: Duration::from_secs(DEFAULT_IDLE_WAKE_SECS),
        }
    }
}

impl From<&SupervisorConfig> for SupervisorSettings {
    fn from(config: &SupervisorConfig) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            idle_wake: Duration::from_secs(config.idle_wake_secs),
        }
    }
}
