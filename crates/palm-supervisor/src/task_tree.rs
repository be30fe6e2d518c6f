use crate::ScopeOutcome;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Handle on one run: the scope task, its token and its eventual outcome.
///
/// The poller runs on a child token of `token`, so cancelling the tree
/// cancels the poller before `cancel()` returns.
pub(crate) struct TaskTree {
    pub(crate) generation: u64,
    token: CancellationToken,
    scope: JoinHandle<()>,
    outcome: watch::Receiver<Option<ScopeOutcome>>,
}

impl TaskTree {
    pub(crate) fn new(
        generation: u64,
        token: CancellationToken,
        scope: JoinHandle<()>,
        outcome: watch::Receiver<Option<ScopeOutcome>>,
    ) -> Self {
        Self {
            generation,
            token,
            scope,
            outcome,
        }
    }

    pub(crate) fn cancel(&self) {
        self.token.cancel();
    }

    /// A tree is live until its scope has published an outcome or returned.
    pub(crate) fn is_live(&self) -> bool {
        !self.scope.is_finished() && self.outcome.borrow().is_none()
    }

    pub(crate) fn outcome(&self) -> watch::Receiver<Option<ScopeOutcome>> {
        self.outcome.clone()
    }
}
