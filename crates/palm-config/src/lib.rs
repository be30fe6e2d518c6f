mod config;
mod error;
mod log_level;
mod logging_config;
mod supervisor_config;
mod upstream_config;

#[cfg(test)]
mod tests;

pub use config::Config;
pub use error::{ConfigError, ConfigErrorResult};
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use supervisor_config::{
    DEFAULT_IDLE_WAKE_SECS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_PROBE_TIMEOUT_MS,
    MAX_IDLE_WAKE_SECS, MAX_POLL_INTERVAL_MS, MAX_PROBE_TIMEOUT_MS, MIN_IDLE_WAKE_SECS,
    MIN_POLL_INTERVAL_MS, MIN_PROBE_TIMEOUT_MS, SupervisorConfig,
};
pub use upstream_config::{DEFAULT_LM_STUDIO_PORT, DEFAULT_OLLAMA_PORT, UpstreamConfig};

const CONFIG_DIR_ENV: &str = "PALM_CONFIG_DIR";
const CONFIG_DIR_NAME: &str = ".palm";
const CONFIG_FILENAME: &str = "config.toml";
const DEFAULT_LOG_LEVEL_STRING: &str = "info";
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const MIN_PORT: u16 = 1;
