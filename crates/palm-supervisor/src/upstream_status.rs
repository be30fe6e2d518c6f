use crate::{DisplayClassification, Upstream, UpstreamProbe};

/// Per-cycle snapshot of one upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamStatus {
    pub upstream: Upstream,
    pub enabled: bool,
    pub port_if_enabled: Option<u16>,
    pub handle_present: bool,
}

impl UpstreamStatus {
    pub fn from_probe(upstream: Upstream, probe: UpstreamProbe) -> Self {
        Self {
            upstream,
            enabled: probe.enabled,
            port_if_enabled: probe.enabled.then_some(probe.port),
            handle_present: probe.handle_present,
        }
    }

    /// Snapshot used when the registry could not answer this cycle.
    pub fn query_failed(upstream: Upstream) -> Self {
        Self {
            upstream,
            enabled: true,
            port_if_enabled: None,
            handle_present: false,
        }
    }

    pub fn classification(&self) -> DisplayClassification {
        DisplayClassification::classify(self.enabled, self.handle_present)
    }

    /// e.g. `LM Studio: Running on port 1234`, `Ollama: Failed`
    pub fn status_line(&self) -> String {
        let name = self.upstream.display_name();
        match (self.classification(), self.port_if_enabled) {
            (DisplayClassification::Running, Some(port)) => {
                format!("{name}: Running on port {port}")
            }
            (classification, _) => format!("{name}: {}", classification.as_str()),
        }
    }
}
