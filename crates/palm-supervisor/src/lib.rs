mod display_classification;
mod error;
mod exit_hook;
mod log_consumer;
mod log_line;
mod log_receiver;
mod log_sink;
mod output_capture;
mod scope_outcome;
mod service_state;
mod service_supervisor;
mod shared_registry;
mod status_poller;
mod status_report;
mod supervisor_settings;
mod task_tree;
mod upstream;
mod upstream_handle;
mod upstream_probe;
mod upstream_registry;
mod upstream_status;

#[cfg(test)]
mod tests;

pub use display_classification::DisplayClassification;
pub use error::{Result as SupervisorResult, SupervisorError};
pub use exit_hook::ExitHook;
pub use log_consumer::{LogConsumer, LogPump, WriterConsumer};
pub use log_line::LogLine;
pub use log_receiver::LogReceiver;
pub use log_sink::{LogSink, LogWriter};
pub use output_capture::{OutputCapture, install_or_report};
pub use scope_outcome::ScopeOutcome;
pub use service_state::ServiceState;
pub use service_supervisor::ServiceSupervisor;
pub use shared_registry::SharedRegistry;
pub use status_poller::StatusPoller;
pub use status_report::StatusReport;
pub use supervisor_settings::SupervisorSettings;
pub use upstream::Upstream;
pub use upstream_handle::UpstreamHandle;
pub use upstream_probe::UpstreamProbe;
pub use upstream_registry::UpstreamRegistry;
pub use upstream_status::UpstreamStatus;

/// Written when a run begins, before any status line of that run.
pub const STARTED_MESSAGE: &str = "✅ Service started successfully";
/// Written by every `stop()`, and when the exit hook cancels a live run.
pub const STOPPED_MESSAGE: &str = "🛑 Service stopped";
/// Written when `start()` replaces a tree that was still running.
pub const RESTARTING_MESSAGE: &str = "🔄 Restarting service";
/// Prefix of the line reporting a failed run.
pub const ERROR_PREFIX: &str = "❌ ERROR: ";
