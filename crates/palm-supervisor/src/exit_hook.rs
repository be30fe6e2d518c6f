//! Process-exit teardown: stop the service, then give the terminal back.

use crate::{OutputCapture, ServiceSupervisor, SupervisorResult};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

/// Runs the shutdown sequence exactly once, whichever of an explicit
/// `run()`, a signal or `Drop` gets there first.
pub struct ExitHook {
    supervisor: Arc<ServiceSupervisor>,
    capture: Option<Arc<OutputCapture>>,
    fired: AtomicBool,
}

impl ExitHook {
    pub fn new(supervisor: Arc<ServiceSupervisor>, capture: Option<Arc<OutputCapture>>) -> Self {
        Self {
            supervisor,
            capture,
            fired: AtomicBool::new(false),
        }
    }

    /// Cancel the running tree and restore stdout/stderr.
    ///
    /// Returns `false` when the hook had already run.
    pub fn run(&self) -> bool {
        if self.fired.swap(true, Ordering::SeqCst) {
            debug!("Exit hook already ran");
            return false;
        }

        if self.supervisor.shutdown() {
            info!("Service stopped by exit hook");
        }

        if let Some(capture) = &self.capture
            && let Err(e) = capture.restore()
        {
            capture.report(&format!("Exit hook could not restore output: {e}"));
        }

        true
    }

    pub fn has_run(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Run the hook on SIGINT/SIGTERM, then exit the process.
    #[cfg(unix)]
    #[track_caller]
    pub fn install_signal_handler(self: &Arc<Self>) -> SupervisorResult<()> {
        use crate::SupervisorError;

        use signal_hook::consts::{SIGINT, SIGTERM};
        use signal_hook::iterator::Signals;

        let mut signals = match Signals::new([SIGINT, SIGTERM]) {
            Ok(signals) => signals,
            Err(e) => return Err(SupervisorError::signal_handler(e)),
        };

        let hook = Arc::clone(self);
        let spawned = std::thread::Builder::new()
            .name("palm-signals".into())
            .spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    info!("Received signal {sig}, shutting down...");
                    hook.run();
                    std::process::exit(0);
                }
            });
        if let Err(e) = spawned {
            return Err(SupervisorError::signal_handler(e));
        }

        Ok(())
    }

    #[cfg(not(unix))]
    pub fn install_signal_handler(self: &Arc<Self>) -> SupervisorResult<()> {
        debug!("Signal handling not available, relying on Drop");
        Ok(())
    }
}

impl Drop for ExitHook {
    fn drop(&mut self) {
        self.run();
    }
}
