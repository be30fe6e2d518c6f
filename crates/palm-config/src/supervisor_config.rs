use crate::{ConfigError, ConfigErrorResult};

use serde::Deserialize;

pub const MIN_POLL_INTERVAL_MS: u64 = 10;
pub const MAX_POLL_INTERVAL_MS: u64 = 60_000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;

pub const MIN_IDLE_WAKE_SECS: u64 = 1;
pub const MAX_IDLE_WAKE_SECS: u64 = 3_600;
pub const DEFAULT_IDLE_WAKE_SECS: u64 = 10;

pub const MIN_PROBE_TIMEOUT_MS: u64 = 10;
pub const MAX_PROBE_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 500;

/// Timing of the supervisor's task tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
    /// Delay between two status poll cycles
    pub poll_interval_ms: u64,
    /// How often the idle scope wakes up while waiting for cancellation
    pub idle_wake_secs: u64,
    /// Upper bound for a single liveness probe of an upstream port
    pub probe_timeout_ms: u64,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            idle_wake_secs: DEFAULT_IDLE_WAKE_SECS,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
        }
    }
}

impl SupervisorConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if !(MIN_POLL_INTERVAL_MS..=MAX_POLL_INTERVAL_MS).contains(&self.poll_interval_ms) {
            return Err(ConfigError::supervisor(format!(
                "supervisor.poll_interval_ms must be {}-{}, got {}",
                MIN_POLL_INTERVAL_MS, MAX_POLL_INTERVAL_MS, self.poll_interval_ms
            )));
        }

        if !(MIN_IDLE_WAKE_SECS..=MAX_IDLE_WAKE_SECS).contains(&self.idle_wake_secs) {
            return Err(ConfigError::supervisor(format!(
                "supervisor.idle_wake_secs must be {}-{}, got {}",
                MIN_IDLE_WAKE_SECS, MAX_IDLE_WAKE_SECS, self.idle_wake_secs
            )));
        }

        if !(MIN_PROBE_TIMEOUT_MS..=MAX_PROBE_TIMEOUT_MS).contains(&self.probe_timeout_ms) {
            return Err(ConfigError::supervisor(format!(
                "supervisor.probe_timeout_ms must be {}-{}, got {}",
                MIN_PROBE_TIMEOUT_MS, MAX_PROBE_TIMEOUT_MS, self.probe_timeout_ms
            )));
        }

        // A probe that outlives the cycle would stretch every interval.
        if self.probe_timeout_ms > self.poll_interval_ms {
            return Err(ConfigError::supervisor(format!(
                "supervisor.probe_timeout_ms ({}) must not exceed poll_interval_ms ({})",
                self.probe_timeout_ms, self.poll_interval_ms
            )));
        }

        Ok(())
    }
}
