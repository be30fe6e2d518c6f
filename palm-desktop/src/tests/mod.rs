
use crate::registry::PortProbeRegistry;

use palm_config::Config;
use palm_supervisor::{LogReceiver, LogSink, ServiceSupervisor, SupervisorSettings};

use std::sync::Arc;
use std::time::Duration;

pub(crate) fn fast_settings() -> SupervisorSettings {
    SupervisorSettings {
        poll_interval: Duration::from_millis(20),
        idle_wake: Duration::from_millis(50),
    }
}

/// Supervisor over a port-probing registry with both upstreams disabled.
pub(crate) fn quiet_supervisor() -> (ServiceSupervisor, LogReceiver) {
    let mut config = Config::default();
    config.lm_studio.enabled = false;
    config.ollama.enabled = false;

    let (sink, receiver) = LogSink::channel();
    let registry = Arc::new(PortProbeRegistry::new(&config));
    let supervisor = ServiceSupervisor::new(registry, sink, fast_settings()).unwrap();
    (supervisor, receiver)
}
