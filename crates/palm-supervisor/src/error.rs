use crate::Upstream;

use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("Registry query for {upstream} failed: {message} {location}")]
    RegistryQuery {
        upstream: Upstream,
        message: String,
        location: ErrorLocation,
    },

    #[error("Log sink closed, no consumer is attached {location}")]
    SinkClosed { location: ErrorLocation },

    #[error("Task '{task}' panicked: {message} {location}")]
    TaskPanicked {
        task: &'static str,
        message: String,
        location: ErrorLocation,
    },

    #[error("Output redirection failed while {action}: {source} {location}")]
    Redirection {
        action: &'static str,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Output redirection is not supported on this platform {location}")]
    RedirectionUnsupported { location: ErrorLocation },

    #[error("No async runtime available: {message} {location}")]
    NoRuntime {
        message: String,
        location: ErrorLocation,
    },

    #[error("Failed to register signal handlers: {source} {location}")]
    SignalHandler {
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },
}

impl SupervisorError {
    #[track_caller]
    pub fn registry_query<S: Into<String>>(upstream: Upstream, message: S) -> Self {
        Self::RegistryQuery {
            upstream,
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn sink_closed() -> Self {
        Self::SinkClosed {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn task_panicked<S: Into<String>>(task: &'static str, message: S) -> Self {
        Self::TaskPanicked {
            task,
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn redirection(action: &'static str, source: std::io::Error) -> Self {
        Self::Redirection {
            action,
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn signal_handler(source: std::io::Error) -> Self {
        Self::SignalHandler {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, SupervisorError>;
