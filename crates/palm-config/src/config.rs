use crate::{
    CONFIG_DIR_ENV, CONFIG_DIR_NAME, CONFIG_FILENAME, ConfigError, ConfigErrorResult,
    DEFAULT_LM_STUDIO_PORT, DEFAULT_OLLAMA_PORT, LoggingConfig, SupervisorConfig, UpstreamConfig,
};

use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub lm_studio: UpstreamConfig,
    pub ollama: UpstreamConfig,
    pub supervisor: SupervisorConfig,
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lm_studio: UpstreamConfig::lm_studio(),
            ollama: UpstreamConfig::ollama(),
            supervisor: SupervisorConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load config.
    ///
    /// Loading order:
    /// 1. PALM_CONFIG_DIR env var, else ./.palm/
    /// 2. config.toml if it exists, else defaults
    /// 3. PALM_* environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        let config_dir = Self::config_dir()?;
        Self::load_from(&config_dir)
    }

    /// Same as [`Config::load`] with an explicit config directory.
    pub fn load_from(config_dir: &Path) -> ConfigErrorResult<Self> {
        let config_path = config_dir.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();
        config.fill_default_ports();

        Ok(config)
    }

    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the config directory.
    /// Priority: PALM_CONFIG_DIR env var > ./.palm/ (relative to cwd)
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let cwd = std::env::current_dir()
            .map_err(|_| ConfigError::config("Cannot determine current working directory"))?;
        Ok(cwd.join(CONFIG_DIR_NAME))
    }

    /// Validate all configuration.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.lm_studio.validate("lm_studio")?;
        self.ollama.validate("ollama")?;
        self.supervisor.validate()?;

        if self.lm_studio.enabled && self.ollama.enabled && self.lm_studio.port == self.ollama.port
        {
            return Err(ConfigError::upstream(format!(
                "lm_studio.port and ollama.port must differ, both are {}",
                self.lm_studio.port
            )));
        }

        Ok(())
    }

    /// Log configuration summary.
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!(
            "  lm_studio: {} (port {})",
            Self::enabled_label(self.lm_studio.enabled),
            self.lm_studio.port
        );
        info!(
            "  ollama: {} (port {})",
            Self::enabled_label(self.ollama.enabled),
            self.ollama.port
        );
        info!(
            "  supervisor: poll every {}ms, idle wake every {}s, probe timeout {}ms",
            self.supervisor.poll_interval_ms,
            self.supervisor.idle_wake_secs,
            self.supervisor.probe_timeout_ms
        );
        info!(
            "  logging: {} (colored: {})",
            *self.logging.level, self.logging.colored
        );
    }

    fn enabled_label(enabled: bool) -> &'static str {
        if enabled { "enabled" } else { "disabled" }
    }

    fn fill_default_ports(&mut self) {
        self.lm_studio.fill_default_port(DEFAULT_LM_STUDIO_PORT);
        self.ollama.fill_default_port(DEFAULT_OLLAMA_PORT);
    }

    fn apply_env_overrides(&mut self) {
        // Upstreams
        Self::apply_env_bool("PALM_LM_STUDIO_ENABLED", &mut self.lm_studio.enabled);
        Self::apply_env_parse("PALM_LM_STUDIO_PORT", &mut self.lm_studio.port);
        Self::apply_env_bool("PALM_OLLAMA_ENABLED", &mut self.ollama.enabled);
        Self::apply_env_parse("PALM_OLLAMA_PORT", &mut self.ollama.port);

        // Supervisor
        Self::apply_env_parse(
            "PALM_POLL_INTERVAL_MS",
            &mut self.supervisor.poll_interval_ms,
        );
        Self::apply_env_parse("PALM_IDLE_WAKE_SECS", &mut self.supervisor.idle_wake_secs);
        Self::apply_env_parse(
            "PALM_PROBE_TIMEOUT_MS",
            &mut self.supervisor.probe_timeout_ms,
        );

        // Logging
        Self::apply_env_parse("PALM_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_bool("PALM_LOG_COLORED", &mut self.logging.colored);
    }

    /// Helper: Apply environment variable override for bool values (accepts "true"/"1")
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    /// Helper: Apply environment variable override for parseable values
    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }
}
