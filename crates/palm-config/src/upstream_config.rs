use crate::{ConfigError, ConfigErrorResult, MIN_PORT};

use serde::Deserialize;

pub const DEFAULT_LM_STUDIO_PORT: u16 = 1234;
pub const DEFAULT_OLLAMA_PORT: u16 = 11434;

/// One backend model server fronted by the proxy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub enabled: bool,
    /// 0 until [`crate::Config`] fills in the upstream's well-known port
    pub port: u16,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 0,
        }
    }
}

impl UpstreamConfig {
    pub fn lm_studio() -> Self {
        Self {
            enabled: true,
            port: DEFAULT_LM_STUDIO_PORT,
        }
    }

    pub fn ollama() -> Self {
        Self {
            enabled: true,
            port: DEFAULT_OLLAMA_PORT,
        }
    }

    pub(crate) fn fill_default_port(&mut self, port: u16) {
        if self.port == 0 {
            self.port = port;
        }
    }

    /// `section` is the TOML table name, used in error messages.
    pub fn validate(&self, section: &str) -> ConfigErrorResult<()> {
        // A disabled upstream is never probed, so its port is irrelevant.
        if self.enabled && self.port < MIN_PORT {
            return Err(ConfigError::upstream(format!(
                "{section}.port must be >= {MIN_PORT} when enabled, got {}",
                self.port
            )));
        }

        Ok(())
    }
}
