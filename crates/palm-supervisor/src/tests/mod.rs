mod exit_hook;

use crate::{
    LogLine, LogReceiver, SupervisorError, SupervisorResult, SupervisorSettings, Upstream,
    UpstreamProbe, UpstreamRegistry,
};

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

pub(crate) const TEST_POLL_INTERVAL: Duration = Duration::from_millis(20);
pub(crate) const TEST_IDLE_WAKE: Duration = Duration::from_millis(50);
pub(crate) const WAIT_TIMEOUT: Duration = Duration::from_secs(5);
pub(crate) const QUIET_PERIOD: Duration = Duration::from_millis(150);

pub(crate) fn fast_settings() -> SupervisorSettings {
    SupervisorSettings {
        poll_interval: TEST_POLL_INTERVAL,
        idle_wake: TEST_IDLE_WAKE,
    }
}

pub(crate) fn running(port: u16) -> UpstreamProbe {
    UpstreamProbe {
        enabled: true,
        port,
        handle_present: true,
    }
}

pub(crate) fn failed(port: u16) -> UpstreamProbe {
    UpstreamProbe {
        enabled: true,
        port,
        handle_present: false,
    }
}

pub(crate) fn disabled(port: u16) -> UpstreamProbe {
    UpstreamProbe {
        enabled: false,
        port,
        handle_present: false,
    }
}

/// Registry whose answers are set by the test.
pub(crate) struct ScriptedRegistry {
    probes: Mutex<[UpstreamProbe; 2]>,
    failing: Mutex<Option<Upstream>>,
    panicking: AtomicBool,
    queries: AtomicUsize,
}

impl ScriptedRegistry {
    pub(crate) fn new(lm_studio: UpstreamProbe, ollama: UpstreamProbe) -> Self {
        Self {
            probes: Mutex::new([lm_studio, ollama]),
            failing: Mutex::new(None),
            panicking: AtomicBool::new(false),
            queries: AtomicUsize::new(0),
        }
    }

    pub(crate) fn both_running() -> Self {
        Self::new(running(1234), running(11434))
    }

    pub(crate) fn set_probe(&self, upstream: Upstream, probe: UpstreamProbe) {
        self.probes.lock().unwrap_or_else(PoisonError::into_inner)[upstream.index()] = probe;
    }

    pub(crate) fn fail(&self, upstream: Upstream) {
        *self.failing.lock().unwrap_or_else(PoisonError::into_inner) = Some(upstream);
    }

    pub(crate) fn panic_on_query(&self) {
        self.panicking.store(true, Ordering::SeqCst);
    }

    pub(crate) fn recover(&self) {
        self.panicking.store(false, Ordering::SeqCst);
        *self.failing.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub(crate) fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpstreamRegistry for ScriptedRegistry {
    async fn query(&self, upstream: Upstream) -> SupervisorResult<UpstreamProbe> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        if self.panicking.load(Ordering::SeqCst) {
            panic!("registry exploded");
        }

        if *self.failing.lock().unwrap_or_else(PoisonError::into_inner) == Some(upstream) {
            return Err(SupervisorError::registry_query(upstream, "scripted failure"));
        }

        Ok(self.probes.lock().unwrap_or_else(PoisonError::into_inner)[upstream.index()])
    }
}

/// Receive until `done` holds for the lines seen so far, or panic after `WAIT_TIMEOUT`.
pub(crate) async fn recv_until<F>(receiver: &mut LogReceiver, mut done: F) -> Vec<LogLine>
where
    F: FnMut(&[LogLine]) -> bool,
{
    let mut lines = Vec::new();
    let deadline = tokio::time::Instant::now() + WAIT_TIMEOUT;

    while !done(&lines) {
        match tokio::time::timeout_at(deadline, receiver.recv()).await {
            Ok(Some(line)) => lines.push(line),
            Ok(None) => panic!("log channel closed after {} lines", lines.len()),
            Err(_) => panic!("timed out, lines so far: {lines:?}"),
        }
    }

    lines
}

/// Receive until nothing arrives for `QUIET_PERIOD` or the channel closes.
pub(crate) async fn recv_until_quiet(receiver: &mut LogReceiver) -> Vec<LogLine> {
    let mut lines = Vec::new();
    while let Ok(Some(line)) = tokio::time::timeout(QUIET_PERIOD, receiver.recv()).await {
        lines.push(line);
    }
    lines
}

pub(crate) fn texts(lines: &[LogLine]) -> Vec<&str> {
    lines.iter().map(|line| line.text.as_str()).collect()
}

pub(crate) fn count_matching(lines: &[LogLine], needle: &str) -> usize {
    lines.iter().filter(|line| line.text.contains(needle)).count()
}
