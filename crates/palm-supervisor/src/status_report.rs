use crate::{Upstream, UpstreamStatus};

/// Both upstream snapshots of one poll cycle, in delivery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReport {
    statuses: [UpstreamStatus; 2],
}

impl StatusReport {
    pub fn new(lm_studio: UpstreamStatus, ollama: UpstreamStatus) -> Self {
        Self {
            statuses: [lm_studio, ollama],
        }
    }

    pub fn get(&self, upstream: Upstream) -> &UpstreamStatus {
        &self.statuses[upstream.index()]
    }

    pub fn statuses(&self) -> &[UpstreamStatus; 2] {
        &self.statuses
    }

    /// Newline-terminated lines, ready to be appended verbatim by a consumer.
    pub fn lines(&self) -> Vec<String> {
        self.statuses
            .iter()
            .map(|status| format!("{}\n", status.status_line()))
            .collect()
    }
}
