//! Periodic liveness poll of both upstreams.

use crate::{
    LogSink, StatusReport, SupervisorResult, Upstream, UpstreamRegistry, UpstreamStatus,
};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Child task of a service scope.
///
/// Each cycle queries the registry for both upstreams, delivers the two
/// status lines as one batch and sleeps for the interval. Missed cycles are
/// not caught up.
pub struct StatusPoller {
    registry: Arc<dyn UpstreamRegistry>,
    sink: LogSink,
    interval: Duration,
    status_tx: watch::Sender<Option<StatusReport>>,
}

impl StatusPoller {
    pub fn new(
        registry: Arc<dyn UpstreamRegistry>,
        sink: LogSink,
        interval: Duration,
        status_tx: watch::Sender<Option<StatusReport>>,
    ) -> Self {
        Self {
            registry,
            sink,
            interval,
            status_tx,
        }
    }

    /// Poll until `token` is cancelled.
    ///
    /// Only returns `Err` for failures that must end the run, such as the
    /// log consumer going away. Registry errors stay within their cycle.
    pub async fn run(self, token: CancellationToken) -> SupervisorResult<()> {
        let mut cycles = 0u64;

        loop {
            let report = tokio::select! {
                biased;
                _ = token.cancelled() => break,
                report = self.poll_once() => report,
            };

            if !self
                .sink
                .write_batch_unless_cancelled(&token, report.lines())?
            {
                break;
            }
            self.status_tx.send_replace(Some(report));
            cycles += 1;

            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        debug!("Status poller cancelled after {cycles} cycles");
        Ok(())
    }

    /// Query both upstreams once.
    pub async fn poll_once(&self) -> StatusReport {
        let (lm_studio, ollama) = tokio::join!(
            self.snapshot(Upstream::LmStudio),
            self.snapshot(Upstream::Ollama)
        );
        StatusReport::new(lm_studio, ollama)
    }

    async fn snapshot(&self, upstream: Upstream) -> UpstreamStatus {
        match self.registry.query(upstream).await {
            Ok(probe) => UpstreamStatus::from_probe(upstream, probe),
            Err(e) => {
                warn!("Treating {upstream} as failed for this cycle: {e}");
                UpstreamStatus::query_failed(upstream)
            }
        }
    }
}
