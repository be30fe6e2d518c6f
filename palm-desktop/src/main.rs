mod cli;
mod commands;
mod error;
mod logging;
mod registry;

#[cfg(test)]
mod tests;

use crate::cli::Args;
use crate::registry::PortProbeRegistry;

use palm_supervisor::{
    ExitHook, LogPump, LogSink, ServiceSupervisor, SupervisorSettings, WriterConsumer,
    install_or_report,
};

use std::error::Error;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::BufReader;
use tracing::{error, info};

/// The signal thread keeps a sink clone alive, so the pump never sees the
/// channel close; it only gets this long to write out the last lines.
const PUMP_DRAIN_GRACE: Duration = Duration::from_millis(250);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    // Load and validate configuration
    let config = args.load_config()?;

    // Redirect output before anything else writes to it
    let (sink, receiver) = LogSink::channel();
    let capture = if args.no_capture {
        None
    } else {
        install_or_report(&sink).map(Arc::new)
    };

    let pane: Box<dyn Write + Send> = match capture.as_ref().map(|c| c.original_stdout()) {
        Some(Ok(original)) => Box::new(original),
        Some(Err(e)) => {
            if let Some(capture) = &capture {
                capture.report(&format!("Log pane falls back to stdout: {e}"));
            }
            Box::new(std::io::stdout())
        }
        None => Box::new(std::io::stdout()),
    };
    let pump = LogPump::spawn(receiver, WriterConsumer::new(pane));

    // Initialize logging (before any other logging)
    logging::initialize(&config.logging)?;

    info!("Starting palm-desktop v{}", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    let registry = Arc::new(PortProbeRegistry::new(&config));
    let settings = SupervisorSettings::from(&config.supervisor);
    let supervisor = Arc::new(ServiceSupervisor::new(registry, sink, settings)?);

    // The service comes up with the application
    supervisor.start();

    let hook = Arc::new(ExitHook::new(Arc::clone(&supervisor), capture));
    if let Err(e) = hook.install_signal_handler() {
        error!("{e}");
    }

    let result = commands::run(BufReader::new(tokio::io::stdin()), &supervisor).await;
    if let Err(e) = &result {
        error!("Command loop failed: {e}");
    }

    hook.run();
    if tokio::time::timeout(PUMP_DRAIN_GRACE, pump).await.is_err() {
        info!("Log pump still attached at exit");
    }

    result.map_err(Into::into)
}
