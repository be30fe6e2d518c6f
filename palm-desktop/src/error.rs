use thiserror::Error;

#[derive(Error, Debug)]
pub enum DesktopError {
    #[error("Config error: {0}")]
    Config(#[from] palm_config::ConfigError),

    #[error("Supervisor error: {0}")]
    Supervisor(#[from] palm_supervisor::SupervisorError),

    #[error("Failed to initialize logging: {message}")]
    Logging { message: String },

    #[error("Unknown command '{input}', expected one of: start, stop, toggle, status, quit")]
    UnknownCommand { input: String },

    #[error("Failed to read {what}: {source}")]
    Io {
        what: &'static str,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, DesktopError>;
