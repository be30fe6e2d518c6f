//! Console logging for the desktop host.

use crate::error::{DesktopError, Result as DesktopResult};

use palm_config::LoggingConfig;
use tracing_subscriber::{
    EnvFilter, fmt, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
};

/// Install the global subscriber.
///
/// Events go to stdout. While output capture is active that is the log
/// pipe, so they show up in the log pane next to the service lines.
/// `RUST_LOG` overrides the configured level.
pub fn initialize(config: &LoggingConfig) -> DesktopResult<()> {
    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_ansi(config.colored)
        .with_writer(std::io::stdout);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_directive()));

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .try_init()
        .map_err(|e| DesktopError::Logging {
            message: e.to_string(),
        })
}
