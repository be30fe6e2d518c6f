use std::panic::Location;
use std::path::PathBuf;
use std::result::Result as StdResult;

use error_location::ErrorLocation;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum ConfigError {
    #[error("{category} error: {message} {location}")]
    Generic {
        category: &'static str,
        message: String,
        location: ErrorLocation,
    },

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    /// Create a config error
    #[track_caller]
    pub fn config<S: Into<String>>(message: S) -> Self {
        ConfigError::Generic {
            category: "Config",
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Create an upstream error
    #[track_caller]
    pub fn upstream<S: Into<String>>(message: S) -> Self {
        ConfigError::Generic {
            category: "Upstream",
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Create a supervisor error
    #[track_caller]
    pub fn supervisor<S: Into<String>>(message: S) -> Self {
        ConfigError::Generic {
            category: "Supervisor",
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl serde::de::Error for ConfigError {
    #[track_caller]
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        ConfigError::Generic {
            category: "Serde",
            message: msg.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type ConfigErrorResult<T> = StdResult<T, ConfigError>;
