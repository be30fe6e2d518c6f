//! Lifecycle of the service's task tree.

use crate::task_tree::TaskTree;
use crate::{
    ERROR_PREFIX, LogSink, RESTARTING_MESSAGE, STARTED_MESSAGE, STOPPED_MESSAGE, ScopeOutcome,
    ServiceState, StatusPoller, StatusReport, SupervisorError, SupervisorResult,
    SupervisorSettings, UpstreamRegistry,
};

use std::any::Any;
use std::panic::Location;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use error_location::ErrorLocation;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

/// Owns the service's task tree and exposes start/stop.
///
/// `start()` and `stop()` may be called from any thread; they are
/// serialized by one mutex around the active tree. The state is derived
/// from that tree: a run that ends on its own (a failure) reads as
/// `Stopped` without anyone calling `stop()`.
pub struct ServiceSupervisor {
    runtime: Handle,
    registry: Arc<dyn UpstreamRegistry>,
    sink: LogSink,
    settings: SupervisorSettings,
    active: Mutex<Option<TaskTree>>,
    next_generation: Mutex<u64>,
    status_tx: watch::Sender<Option<StatusReport>>,
}

impl ServiceSupervisor {
    /// Create a supervisor bound to the current tokio runtime.
    #[track_caller]
    pub fn new(
        registry: Arc<dyn UpstreamRegistry>,
        sink: LogSink,
        settings: SupervisorSettings,
    ) -> SupervisorResult<Self> {
        let runtime = Handle::try_current().map_err(|e| SupervisorError::NoRuntime {
            message: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;
        Ok(Self::with_runtime(runtime, registry, sink, settings))
    }

    /// Create a supervisor spawning its tasks on `runtime`.
    pub fn with_runtime(
        runtime: Handle,
        registry: Arc<dyn UpstreamRegistry>,
        sink: LogSink,
        settings: SupervisorSettings,
    ) -> Self {
        let (status_tx, _) = watch::channel(None);
        Self {
            runtime,
            registry,
            sink,
            settings,
            active: Mutex::new(None),
            next_generation: Mutex::new(0),
            status_tx,
        }
    }

    /// Start a fresh task tree.
    ///
    /// A tree that is still live is cancelled first, so two pollers never
    /// overlap. The started line is enqueued before the scope is spawned
    /// and therefore precedes every status line of this run.
    pub fn start(&self) {
        let mut active = self.lock_active();

        if let Some(previous) = active.take()
            && previous.is_live()
        {
            previous.cancel();
            info!("Cancelled run #{} before restarting", previous.generation);
            self.announce(RESTARTING_MESSAGE);
        }

        let generation = self.bump_generation();
        let token = CancellationToken::new();
        let (outcome_tx, outcome_rx) = watch::channel(None);

        self.announce(STARTED_MESSAGE);

        let poller = StatusPoller::new(
            Arc::clone(&self.registry),
            self.sink.clone(),
            self.settings.poll_interval,
            self.status_tx.clone(),
        );
        let scope = self.runtime.spawn(run_scope(
            generation,
            token.clone(),
            poller,
            self.settings.idle_wake,
            self.sink.clone(),
            outcome_tx,
        ));

        *active = Some(TaskTree::new(generation, token, scope, outcome_rx));
        info!("Service run #{generation} started");
    }

    /// Cancel the active tree, if any, and log the stopped line.
    /// Never waits for the tasks to exit.
    pub fn stop(&self) {
        if !self.cancel_active() {
            debug!("stop() with no active run");
        }
        self.announce(STOPPED_MESSAGE);
    }

    /// Exit-hook flavour of `stop()`: only announces when a live run was cancelled.
    pub fn shutdown(&self) -> bool {
        let mut active = self.lock_active();
        match active.take() {
            Some(tree) if tree.is_live() => {
                tree.cancel();
                info!("Service run #{} cancelled on shutdown", tree.generation);
                self.announce(STOPPED_MESSAGE);
                true
            }
            Some(tree) => {
                debug!("Run #{} had already ended before shutdown", tree.generation);
                false
            }
            None => false,
        }
    }

    /// Start when stopped, stop when running. Returns the new state.
    pub fn toggle(&self) -> ServiceState {
        if self.is_running() {
            self.stop();
            ServiceState::Stopped
        } else {
            self.start();
            ServiceState::Running
        }
    }

    pub fn state(&self) -> ServiceState {
        match self.lock_active().as_ref() {
            Some(tree) if tree.is_live() => ServiceState::Running,
            _ => ServiceState::Stopped,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state().is_running()
    }

    /// Latest status report; `None` until the first cycle completes.
    pub fn subscribe_status(&self) -> watch::Receiver<Option<StatusReport>> {
        self.status_tx.subscribe()
    }

    pub fn sink(&self) -> &LogSink {
        &self.sink
    }

    pub fn settings(&self) -> &SupervisorSettings {
        &self.settings
    }

    /// Wait for the current run to end and return how it ended.
    ///
    /// `None` when no run exists. A run cancelled by `stop()` is no longer
    /// current, so this is mainly for observing failures.
    pub async fn join_current(&self) -> Option<ScopeOutcome> {
        let mut outcome = self.lock_active().as_ref().map(TaskTree::outcome)?;
        let ended = outcome.wait_for(Option::is_some).await.ok()?;
        ended.clone()
    }

    fn cancel_active(&self) -> bool {
        let mut active = self.lock_active();
        match active.take() {
            Some(tree) => {
                tree.cancel();
                info!("Service run #{} cancelled", tree.generation);
                true
            }
            None => false,
        }
    }

    /// Lifecycle lines must not make start/stop fail.
    fn announce(&self, message: &str) {
        if let Err(e) = self.sink.log(message) {
            debug!("Lifecycle line '{message}' dropped: {e}");
        }
    }

    fn bump_generation(&self) -> u64 {
        let mut next = self
            .next_generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *next += 1;
        *next
    }

    fn lock_active(&self) -> MutexGuard<'_, Option<TaskTree>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for ServiceSupervisor {
    fn drop(&mut self) {
        if let Some(tree) = self.lock_active().take() {
            tree.cancel();
        }
    }
}

/// Body of the scope task: spawn the poller, idle until cancelled.
///
/// A poller that ends by itself has failed. The failure is logged, the
/// scope token is cancelled so nothing else in the tree survives, and the
/// run is over.
async fn run_scope(
    generation: u64,
    token: CancellationToken,
    poller: StatusPoller,
    idle_wake: Duration,
    sink: LogSink,
    outcome_tx: watch::Sender<Option<ScopeOutcome>>,
) {
    let mut poller_task = tokio::spawn(poller.run(token.child_token()));

    let outcome = loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break ScopeOutcome::Cancelled,
            joined = &mut poller_task => break poller_outcome(joined),
            _ = tokio::time::sleep(idle_wake) => {
                trace!("Run #{generation} idle wake");
            }
        }
    };

    token.cancel();

    match &outcome {
        ScopeOutcome::Cancelled => {
            // The poller leaves at its next checkpoint; keep the tree until it has.
            if !poller_task.is_finished() {
                let _ = poller_task.await;
            }
            debug!("Run #{generation} torn down");
        }
        ScopeOutcome::Failed { message } => {
            error!("Run #{generation} failed: {message}");
            if let Err(e) = sink.log(format!("{ERROR_PREFIX}{message}")) {
                error!("Could not report failure of run #{generation}: {e}");
            }
        }
    }

    outcome_tx.send_replace(Some(outcome));
}

fn poller_outcome(joined: Result<SupervisorResult<()>, JoinError>) -> ScopeOutcome {
    match joined {
        Ok(Ok(())) => ScopeOutcome::Cancelled,
        Ok(Err(e)) => ScopeOutcome::Failed {
            message: e.to_string(),
        },
        Err(e) if e.is_panic() => ScopeOutcome::Failed {
            message: SupervisorError::task_panicked("status poller", panic_message(e.into_panic()))
                .to_string(),
        },
        Err(e) => ScopeOutcome::Failed {
            message: e.to_string(),
        },
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("task panicked")
    }
}
